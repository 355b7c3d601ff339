//! Signal conditioning primitives for the stickflow tick loop.
//!
//! # Overview
//!
//! - **Axis math** ([`axis`]): byte-to-float normalisation, radial deadzone,
//!   expo curve and the inverse scalers used by output sinks
//! - **Smoothing** ([`ewma`], [`smoothing`]): cutoff-based EWMA filter,
//!   tau-based blending factor and the smoothed-envelope helper rules use
//! - **History** ([`history`]): fixed-capacity ring of recent samples
//! - **Stick processing** ([`stick`]): deadzone, expo and optional smoothing
//!   composed per stick
//!
//! # RT Safety Guarantees
//!
//! - No heap allocations in any per-tick method ([`BoundedHistory`] allocates
//!   once at construction)
//! - O(1) time for every filter step
//! - Non-finite or degenerate parameters are clamped at construction so the
//!   per-tick path never divides by zero
//!
//! # Example
//!
//! ```
//! use stickflow_filters::prelude::*;
//!
//! let profile = AxisProfile {
//!     deadzone: 0.1,
//!     expo: 0.5,
//!     ..AxisProfile::default()
//! };
//! let mut stick = AxisProcessor::new(profile, 200.0);
//!
//! let x = normalize_axis(200);
//! let y = -normalize_axis(128);
//! let (sx, sy) = stick.process(x, y);
//! assert!(sx > 0.0 && sx < x);
//! assert!(sy.abs() < 1e-12);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod axis;
pub mod ewma;
pub mod history;
pub mod prelude;
pub mod smoothing;
pub mod state;
pub mod stick;

pub use axis::{
    expo, normalize_axis, normalize_trigger, radial_deadzone,
    to_trigger_byte, to_xinput_axis,
};
pub use ewma::EwmaFilter;
pub use history::BoundedHistory;
pub use smoothing::{TauSmoother, alpha_from_tau, lerp};
pub use state::FilterState;
pub use stick::{AxisProcessor, AxisProfile, SmoothingConfig, SmoothingKind};
