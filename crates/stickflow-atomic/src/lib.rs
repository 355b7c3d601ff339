//! # stickflow-atomic
//!
//! Lock-free counters the tick thread bumps and any other thread may read.
//!
//! ## Safety Guarantees
//!
//! - **No heap allocations** after initialization
//! - **No blocking operations**, every method is a single atomic instruction
//!
//! ## Usage
//!
//! ```rust
//! use stickflow_atomic::LoopCounters;
//!
//! let counters = LoopCounters::new();
//! counters.inc_tick();
//! counters.inc_chain_swap();
//!
//! let snapshot = counters.snapshot();
//! assert_eq!(snapshot.total_ticks, 1);
//! assert_eq!(snapshot.chain_swaps, 1);
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]

pub mod counters;

pub use counters::{CounterSnapshot, LoopCounters};
