//! Commonly used filter types and functions.

pub use crate::axis::{
    expo, normalize_axis, normalize_trigger, radial_deadzone,
    to_trigger_byte, to_xinput_axis,
};
pub use crate::ewma::EwmaFilter;
pub use crate::history::BoundedHistory;
pub use crate::smoothing::{TauSmoother, alpha_from_tau, lerp};
pub use crate::state::FilterState;
pub use crate::stick::{AxisProcessor, AxisProfile, SmoothingConfig, SmoothingKind};
