//! Recoil pattern statistics and classification.

use serde::{Deserialize, Serialize};
use stickflow_filters::BoundedHistory;

use crate::adaptive::RecoilSample;
use crate::calibration::CalibrationConstants;

/// Shape of a learned recoil pattern, judged on vertical velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Not yet classified or too few samples
    #[default]
    Unknown,
    /// Steady drift with little spread
    Linear,
    /// Drift that accelerates through the burst
    Exponential,
    /// Neither steady nor strongly accelerating
    Stepped,
    /// Wide spread around the mean
    Random,
}

/// Velocity statistics over the firing samples of a history window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct FiringSummary {
    /// Number of firing samples
    pub count: usize,
    /// Mean `(x, y)` velocity
    pub mean: (f64, f64),
    /// Mean over the older `count / 2` samples
    pub first_half: (f64, f64),
    /// Mean over the remaining newer samples
    pub second_half: (f64, f64),
    /// Population standard deviation of vertical velocity
    pub std_dev_y: f64,
}

impl FiringSummary {
    /// Summarise the firing samples among the newest `window` entries.
    ///
    /// Two passes over the ring; no allocation.
    pub fn of(history: &BoundedHistory<RecoilSample>, window: usize) -> Self {
        let firing = || history.last_n(window).filter(|s| s.firing);

        let mut count = 0usize;
        let mut sum = (0.0, 0.0);
        for s in firing() {
            count += 1;
            sum.0 += s.velocity_x;
            sum.1 += s.velocity_y;
        }
        if count == 0 {
            return Self::default();
        }
        let mean = (sum.0 / count as f64, sum.1 / count as f64);

        let split = count / 2;
        let mut first = (0.0, 0.0);
        let mut second = (0.0, 0.0);
        let mut sq = 0.0;
        for (i, s) in firing().enumerate() {
            let half = if i < split { &mut first } else { &mut second };
            half.0 += s.velocity_x;
            half.1 += s.velocity_y;
            let d = s.velocity_y - mean.1;
            sq += d * d;
        }

        Self {
            count,
            mean,
            first_half: mean_of(first, split),
            second_half: mean_of(second, count - split),
            std_dev_y: (sq / count as f64).sqrt(),
        }
    }

    /// Second-half minus first-half mean velocity.
    #[inline]
    pub fn trend(&self) -> (f64, f64) {
        (
            self.second_half.0 - self.first_half.0,
            self.second_half.1 - self.first_half.1,
        )
    }

    /// Classify the vertical velocity profile.
    pub fn classify(&self, cal: &CalibrationConstants) -> PatternKind {
        if self.count < cal.min_trend_samples {
            return PatternKind::Unknown;
        }
        let trend = self.trend().1.abs();
        if self.std_dev_y < cal.linear_max_std_dev && trend < cal.linear_max_trend {
            PatternKind::Linear
        } else if trend > cal.exponential_min_trend {
            PatternKind::Exponential
        } else if self.std_dev_y > cal.random_min_std_dev {
            PatternKind::Random
        } else {
            PatternKind::Stepped
        }
    }
}

#[inline]
fn mean_of(sum: (f64, f64), n: usize) -> (f64, f64) {
    if n == 0 {
        (0.0, 0.0)
    } else {
        (sum.0 / n as f64, sum.1 / n as f64)
    }
}
