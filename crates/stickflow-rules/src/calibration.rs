//! Tuning constants for adaptive compensation.
//!
//! These were tuned by feel against real weapons, not derived. Tests assert
//! behaviour relative to them rather than treating them as physics.

use serde::{Deserialize, Serialize};

/// Empirical scale factors and thresholds used by
/// [`AdaptiveCompensationRule`](crate::AdaptiveCompensationRule).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConstants {
    /// Velocity to compensation scale in reactive mode and for the locked base
    pub reactive_scale: f64,
    /// Weight of the second-half minus first-half velocity difference
    pub trend_weight: f64,
    /// Velocity to nudge scale in predictive mode
    pub predictive_scale: f64,
    /// Samples considered by reactive mode
    pub reactive_window: usize,
    /// Samples considered by predictive mode
    pub predictive_window: usize,
    /// Firing samples needed before reactive mode compensates
    pub min_reactive_samples: usize,
    /// Firing samples needed before a trend term is added
    pub min_trend_samples: usize,
    /// Samples needed in the predictive window before nudging
    pub min_predictive_window: usize,
    /// Firing samples in the predictive window needed before nudging
    pub min_predictive_samples: usize,
    /// Firing samples in the whole history needed to lock a pattern
    pub min_lock_samples: usize,
    /// Fire interval that maps to a rate factor of 1
    pub fire_rate_reference_ms: f64,
    /// Rate scaling applies only below this average interval
    pub fire_rate_window_ms: f64,
    /// Lower clamp for the rate factor
    pub fire_rate_factor_min: f64,
    /// Upper clamp for the rate factor
    pub fire_rate_factor_max: f64,
    /// Time constant of the output smoothing
    pub output_tau_ms: f64,
    /// Linear patterns have a vertical velocity spread below this
    pub linear_max_std_dev: f64,
    /// Linear patterns have a half-to-half change below this
    pub linear_max_trend: f64,
    /// Exponential patterns have a half-to-half change above this
    pub exponential_min_trend: f64,
    /// Random patterns have a vertical velocity spread above this
    pub random_min_std_dev: f64,
}

impl Default for CalibrationConstants {
    fn default() -> Self {
        Self {
            reactive_scale: 0.1,
            trend_weight: 0.5,
            predictive_scale: 0.05,
            reactive_window: 50,
            predictive_window: 20,
            min_reactive_samples: 5,
            min_trend_samples: 10,
            min_predictive_window: 5,
            min_predictive_samples: 3,
            min_lock_samples: 20,
            fire_rate_reference_ms: 100.0,
            fire_rate_window_ms: 200.0,
            fire_rate_factor_min: 0.5,
            fire_rate_factor_max: 1.5,
            output_tau_ms: 15.0,
            linear_max_std_dev: 0.5,
            linear_max_trend: 0.3,
            exponential_min_trend: 1.0,
            random_min_std_dev: 2.0,
        }
    }
}

impl CalibrationConstants {
    /// Rate factor for an average shot interval, or 1 outside the window.
    #[inline]
    pub fn fire_rate_factor(&self, average_interval_ms: f64) -> f64 {
        if average_interval_ms > 0.0 && average_interval_ms < self.fire_rate_window_ms {
            (self.fire_rate_reference_ms / average_interval_ms)
                .clamp(self.fire_rate_factor_min, self.fire_rate_factor_max)
        } else {
            1.0
        }
    }
}
