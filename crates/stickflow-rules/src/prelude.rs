//! Commonly used rule types.

pub use crate::adaptive::{AdaptiveCompensationRule, AdaptiveParams, CompensationMode};
pub use crate::alias::ButtonAliasRule;
pub use crate::calibration::CalibrationConstants;
pub use crate::pattern::PatternKind;
pub use crate::proximity::{AssistTarget, ProximityAssistRule, ProximityParams, SharedTarget};
pub use crate::pulse::{PulseParams, PulseRule};
pub use crate::ramp::{RampCompensationRule, RampParams};
pub use crate::rapid_fire::{RapidFireParams, RapidFireRule};
