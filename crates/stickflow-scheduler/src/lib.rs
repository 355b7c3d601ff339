//! Fixed-period tick scheduling for the stickflow loop.
//!
//! - **TickScheduler**: absolute deadlines advanced by exactly one period,
//!   with resynchronisation after falling more than a bounded number of
//!   periods behind
//! - **Clock / WaitStrategy**: injectable time source and waiting policy, so
//!   timing behaviour is testable without wall-clock sleeps
//! - **LatenessMetrics**: bounded ring of per-tick lateness with percentiles
//!
//! # RT-Safety Guarantees
//!
//! - **No heap allocations** in [`TickScheduler::wait_for_tick`] after construction
//! - **Bounded waits**: every wait strategy call returns within roughly one
//!   sleep quantum, and the deadline is re-checked after each
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use stickflow_scheduler::TickScheduler;
//!
//! let mut scheduler = TickScheduler::new(Duration::from_millis(5));
//! loop {
//!     let tick = scheduler.wait_for_tick();
//!     // Process one tick of input here
//!     if tick.index >= 1000 {
//!         break;
//!     }
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod clock;
pub mod lateness;
pub mod prelude;
pub mod scheduler;
pub mod wait;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use lateness::LatenessMetrics;
pub use scheduler::{Tick, TickScheduler};
pub use wait::{HybridWait, SimulatedWait, WaitStrategy};

/// Default tick period (5 ms, 200 Hz).
pub const DEFAULT_PERIOD: std::time::Duration = std::time::Duration::from_millis(5);

/// Periods the loop may fall behind before it abandons the backlog.
pub const DEFAULT_MAX_LAG_PERIODS: u32 = 5;
