//! Rules for the stickflow chain.
//!
//! # Overview
//!
//! - [`AdaptiveCompensationRule`]: measures stick drift while firing and
//!   pushes against it, locking onto a learned baseline after enough shots
//! - [`RampCompensationRule`]: fixed-direction pull with a ramp envelope
//! - [`PulseRule`]: one timed button press per activation
//! - [`RapidFireRule`]: toggles a button at a fixed rate while held
//! - [`ButtonAliasRule`]: holds one button while a condition holds
//! - [`ProximityAssistRule`]: slowdown and gentle pull near a target point
//!
//! Every rule takes its time from the [`TickContext`](stickflow_pipeline::TickContext)
//! it is given, clamps its parameters at construction and never allocates in
//! `apply`.
//!
//! # Example
//!
//! ```
//! use stickflow_pipeline::prelude::*;
//! use stickflow_rules::prelude::*;
//!
//! let chain = RuleChain::new()
//!     .with_rule(RapidFireRule::new(Condition::trigger(Trigger::R2), RapidFireParams::default()))
//!     .with_rule(AdaptiveCompensationRule::new(
//!         Condition::trigger(Trigger::R2),
//!         AdaptiveParams::default(),
//!     ));
//! assert_eq!(chain.names().collect::<Vec<_>>(), vec!["rapid_fire", "adaptive_compensation"]);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod adaptive;
pub mod alias;
pub mod calibration;
pub mod edge;
pub mod pattern;
pub mod prelude;
pub mod proximity;
pub mod pulse;
pub mod ramp;
pub mod rapid_fire;

pub use adaptive::{AdaptiveCompensationRule, AdaptiveParams, CompensationMode, RecoilSample};
pub use alias::ButtonAliasRule;
pub use calibration::CalibrationConstants;
pub use edge::{Edge, EdgeDetector};
pub use pattern::PatternKind;
pub use proximity::{AssistTarget, ProximityAssistRule, ProximityParams, SharedTarget};
pub use pulse::{PulseParams, PulseRule};
pub use ramp::{RampCompensationRule, RampParams};
pub use rapid_fire::{RapidFireParams, RapidFireRule};
