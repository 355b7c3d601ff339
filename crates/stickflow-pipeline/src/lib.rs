//! Rule pipeline for the stickflow tick loop.
//!
//! # Overview
//!
//! - **Frames** ([`frame`]): raw [`InputSnapshot`] in, conditioned [`OutputFrame`] out
//! - **Conditions** ([`condition`]): `"L1+R1|R2"` style trigger expressions
//! - **Rules** ([`rule`]): the per-tick [`Rule`] contract and its [`TickContext`]
//! - **Chain** ([`chain`]): ordered rules with per-step output validation
//! - **Hot swap** ([`swap`]): replace the whole chain from another thread,
//!   adopted only at a tick boundary
//! - **Conditioning** ([`conditioning`]): trigger noise gate, hip/ADS profile
//!   selection and stick shaping that build the initial frame
//!
//! # RT Safety Guarantees
//!
//! - **No heap allocations** in [`RuleChain::apply`] or [`Conditioner::condition`]
//! - **O(n) time** in the number of rules
//! - **Tick-boundary swaps**: a tick runs entirely on one chain
//!
//! # Architecture
//!
//! ```text
//! InputSnapshot → Conditioner → OutputFrame → RuleChain::apply → sink
//!                                                   ↑
//!                       ChainSlot::publish (other thread, adopted next tick)
//! ```
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use stickflow_pipeline::prelude::*;
//!
//! let mut conditioner = Conditioner::new(&GameProfile::default(), 200.0);
//! let mut chain = RuleChain::new();
//!
//! let input = InputSnapshot::default();
//! let mut frame = conditioner.condition(&input);
//! let ctx = TickContext::new(0, Duration::from_millis(5), 0.005);
//! assert!(chain.apply(&ctx, &input, &mut frame).is_ok());
//! assert_eq!(frame.stick(Stick::Right), (0.0, 0.0));
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod chain;
pub mod condition;
pub mod conditioning;
pub mod frame;
pub mod prelude;
pub mod rule;
pub mod swap;

pub use chain::{ChainSnapshot, RuleChain};
pub use condition::{ANALOG_PRESS_THRESHOLD, Condition, ConditionError};
pub use conditioning::{ActivationConfig, ActivationMode, Conditioner, GameProfile, ResponseSet};
pub use frame::{Button, ButtonView, Buttons, InputSnapshot, OutputFrame, Stick, Trigger};
pub use rule::{Rule, TickContext};
pub use swap::{ActiveChain, ChainSlot};
