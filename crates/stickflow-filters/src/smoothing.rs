//! Time-constant smoothing helpers.
//!
//! Rules express their smoothing as a time constant in milliseconds rather
//! than a cutoff, because their tick period is not fixed at construction.

const MIN_TAU_SECONDS: f64 = 1e-6;

/// Blending factor for a first-order lag with time constant `tau_ms` over a
/// step of `dt_seconds`: `1 - exp(-dt / tau)`.
///
/// A non-positive time constant yields 1 (no smoothing). A non-positive or
/// non-finite step yields 0 (hold).
///
/// ```
/// use stickflow_filters::alpha_from_tau;
///
/// assert_eq!(alpha_from_tau(0.0, 0.005), 1.0);
/// assert_eq!(alpha_from_tau(15.0, 0.0), 0.0);
/// let a = alpha_from_tau(15.0, 0.005);
/// assert!(a > 0.28 && a < 0.29);
/// ```
#[inline]
pub fn alpha_from_tau(tau_ms: f64, dt_seconds: f64) -> f64 {
    let tau = tau_ms / 1000.0;
    if !tau.is_finite() || tau <= MIN_TAU_SECONDS {
        return 1.0;
    }
    if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
        return 0.0;
    }
    (1.0 - (-dt_seconds / tau).exp()).clamp(0.0, 1.0)
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    a + (b - a) * t
}

/// A value that chases a target with a fixed time constant.
///
/// This is the smoothed-envelope pattern shared by the compensation and assist
/// rules: every tick the current value moves toward the target by
/// [`alpha_from_tau`].
///
/// # Example
///
/// ```
/// use stickflow_filters::TauSmoother;
///
/// let mut env = TauSmoother::new(15.0);
/// let first = env.update(1.0, 0.005);
/// assert!(first > 0.0 && first < 1.0);
/// env.reset_to(0.0);
/// assert_eq!(env.value(), 0.0);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct TauSmoother {
    tau_ms: f64,
    value: f64,
}

impl TauSmoother {
    /// Create a smoother at rest at zero.
    pub fn new(tau_ms: f64) -> Self {
        Self { tau_ms, value: 0.0 }
    }

    /// Move toward `target` for one step of `dt_seconds` and return the new value.
    #[inline]
    pub fn update(&mut self, target: f64, dt_seconds: f64) -> f64 {
        if target.is_finite() {
            self.value = lerp(self.value, target, alpha_from_tau(self.tau_ms, dt_seconds));
        }
        self.value
    }

    /// Jump directly to `value`.
    #[inline]
    pub fn reset_to(&mut self, value: f64) {
        self.value = value;
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Time constant in milliseconds.
    pub fn tau_ms(&self) -> f64 {
        self.tau_ms
    }
}
