//! Single-pole low-pass filter parameterised by cutoff frequency.

use std::f64::consts::TAU;

const MIN_CUTOFF_HZ: f64 = 0.001;
const MIN_SAMPLE_RATE_HZ: f64 = 1.0;

/// Exponentially weighted moving average.
///
/// `alpha = 1 - exp(-2π · cutoff / sample_rate)`, clamped to `[0, 1]`. The
/// first sample after construction or [`EwmaFilter::reset`] passes through
/// unchanged and seeds the state.
///
/// # RT Safety
///
/// - No heap allocations
/// - O(1) per step
///
/// # Example
///
/// ```
/// use stickflow_filters::EwmaFilter;
///
/// let mut filter = EwmaFilter::new(30.0, 200.0);
/// assert_eq!(filter.step(0.8), 0.8);
/// assert!(filter.step(0.0) < 0.8);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct EwmaFilter {
    alpha: f64,
    state: Option<f64>,
}

impl EwmaFilter {
    /// Create a filter for the given cutoff and sample rate.
    ///
    /// The cutoff is floored at 0.001 Hz and the sample rate at 1 Hz.
    pub fn new(cutoff_hz: f64, sample_rate_hz: f64) -> Self {
        let cutoff = floor_finite(cutoff_hz, MIN_CUTOFF_HZ);
        let rate = floor_finite(sample_rate_hz, MIN_SAMPLE_RATE_HZ);
        let alpha = (1.0 - (-TAU * cutoff / rate).exp()).clamp(0.0, 1.0);
        Self { alpha, state: None }
    }

    /// Feed one sample and return the filtered value.
    #[inline]
    pub fn step(&mut self, input: f64) -> f64 {
        let next = match self.state {
            None => input,
            Some(prev) => prev + self.alpha * (input - prev),
        };
        self.state = Some(next);
        next
    }

    /// Forget the accumulated state.
    #[inline]
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// The blending factor in use.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Last filtered value, if any sample has been seen since the last reset.
    pub fn value(&self) -> Option<f64> {
        self.state
    }
}

fn floor_finite(value: f64, floor: f64) -> f64 {
    if value.is_finite() { value.max(floor) } else { floor }
}
