//! Per-stick shaping: radial deadzone, expo, optional smoothing.

use serde::{Deserialize, Serialize};

use crate::axis::{expo, radial_deadzone};
use crate::ewma::EwmaFilter;

/// Smoothing applied after shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingKind {
    /// Pass shaped values through unchanged
    #[default]
    None,
    /// Per-axis [`EwmaFilter`]
    Ewma,
}

/// Smoothing settings for one stick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Filter type
    pub kind: SmoothingKind,
    /// EWMA cutoff in hertz
    pub cutoff_hz: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            kind: SmoothingKind::None,
            cutoff_hz: 30.0,
        }
    }
}

/// Response settings for one stick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisProfile {
    /// Radial deadzone, clamped to `[0, 0.95]` when applied
    pub deadzone: f64,
    /// Expo exponent offset, clamped to `[-0.9, 2.0]` when applied
    pub expo: f64,
    /// Flip the vertical axis after normalisation
    pub invert_y: bool,
    /// Post-shaping smoothing
    pub smoothing: SmoothingConfig,
}

impl Default for AxisProfile {
    fn default() -> Self {
        Self {
            deadzone: 0.05,
            expo: 0.0,
            invert_y: false,
            smoothing: SmoothingConfig::default(),
        }
    }
}

/// Shapes one stick every tick.
///
/// Order: radial deadzone, expo per axis, then the configured smoothing per
/// axis. Smoothing state is owned here and cleared by [`AxisProcessor::reset`].
#[derive(Debug, Clone)]
pub struct AxisProcessor {
    profile: AxisProfile,
    filters: Option<(EwmaFilter, EwmaFilter)>,
}

impl AxisProcessor {
    /// Build a processor for a loop running at `sample_rate_hz`.
    pub fn new(profile: AxisProfile, sample_rate_hz: f64) -> Self {
        let filters = match profile.smoothing.kind {
            SmoothingKind::None => None,
            SmoothingKind::Ewma => {
                let f = EwmaFilter::new(profile.smoothing.cutoff_hz, sample_rate_hz);
                Some((f, f))
            }
        };
        Self { profile, filters }
    }

    /// Shape one `(x, y)` sample.
    #[inline]
    pub fn process(&mut self, x: f64, y: f64) -> (f64, f64) {
        let (dx, dy) = radial_deadzone(x, y, self.profile.deadzone);
        let sx = expo(dx, self.profile.expo);
        let sy = expo(dy, self.profile.expo);
        match &mut self.filters {
            Some((fx, fy)) => (fx.step(sx), fy.step(sy)),
            None => (sx, sy),
        }
    }

    /// Clear smoothing state.
    pub fn reset(&mut self) {
        if let Some((fx, fy)) = &mut self.filters {
            fx.reset();
            fy.reset();
        }
    }

    /// The profile this processor was built from.
    pub fn profile(&self) -> &AxisProfile {
        &self.profile
    }
}
