//! Stateless axis math.
//!
//! Raw sticks arrive as bytes with 128 at centre. Everything downstream works
//! on `f64` in `[-1, 1]`.

/// Largest accepted radial deadzone.
pub const MAX_DEADZONE: f64 = 0.95;
/// Smallest accepted expo exponent offset.
pub const MIN_EXPO: f64 = -0.9;
/// Largest accepted expo exponent offset.
pub const MAX_EXPO: f64 = 2.0;

const EXPO_IDENTITY_BAND: f64 = 0.001;
const MAGNITUDE_EPSILON: f64 = 1e-9;

/// Map a raw stick byte to `[-1, 1]`.
///
/// 128 maps to exactly 0. Values below centre divide by 128, values above by
/// 127, so both ends reach exactly ±1.
///
/// ```
/// use stickflow_filters::normalize_axis;
///
/// assert_eq!(normalize_axis(0), -1.0);
/// assert_eq!(normalize_axis(128), 0.0);
/// assert_eq!(normalize_axis(255), 1.0);
/// ```
#[inline]
pub fn normalize_axis(raw: u8) -> f64 {
    let centered = f64::from(raw) - 128.0;
    let span = if centered < 0.0 { 128.0 } else { 127.0 };
    (centered / span).clamp(-1.0, 1.0)
}

/// Circular deadzone with rescaling.
///
/// Inside the deadzone the stick reads `(0, 0)`. Outside, magnitude is
/// remapped from `[deadzone, 1]` onto `[0, 1]` while the direction is kept.
/// The deadzone is clamped to `[0, 0.95]`.
///
/// # RT Safety
///
/// Guards the zero-magnitude case, so a zero deadzone never divides by zero.
#[inline]
pub fn radial_deadzone(x: f64, y: f64, deadzone: f64) -> (f64, f64) {
    let deadzone = sanitize(deadzone, 0.0).clamp(0.0, MAX_DEADZONE);
    let magnitude = x.hypot(y);
    if !magnitude.is_finite() || magnitude <= MAGNITUDE_EPSILON || magnitude < deadzone {
        return (0.0, 0.0);
    }

    let scaled = ((magnitude - deadzone) / (1.0 - deadzone)).clamp(0.0, 1.0);
    let factor = scaled / magnitude;
    (x * factor, y * factor)
}

/// Sign-preserving power curve: `sign(v) * |v|^(1 + e)`.
///
/// `e` is clamped to `[-0.9, 2.0]`; within 0.001 of zero the input is
/// returned unchanged. Positive `e` softens the centre, negative sharpens it.
#[inline]
pub fn expo(value: f64, e: f64) -> f64 {
    if !e.is_finite() {
        return value;
    }
    let e = e.clamp(MIN_EXPO, MAX_EXPO);
    if e.abs() < EXPO_IDENTITY_BAND {
        return value;
    }
    let shaped = value.abs().powf(1.0 + e);
    if value < 0.0 { -shaped } else { shaped }
}

/// Map a trigger byte to `[0, 1]`.
#[inline]
pub fn normalize_trigger(raw: u8) -> f64 {
    f64::from(raw) / 255.0
}

/// Map `[0, 1]` back to a trigger byte, clamping out-of-range input.
#[inline]
pub fn to_trigger_byte(value: f64) -> u8 {
    let v = sanitize(value, 0.0).clamp(0.0, 1.0);
    (v * 255.0).round() as u8
}

/// Map `[-1, 1]` to a signed 16-bit axis as used by XInput-style devices.
///
/// ```
/// use stickflow_filters::to_xinput_axis;
///
/// assert_eq!(to_xinput_axis(1.0), 32767);
/// assert_eq!(to_xinput_axis(-1.0), -32767);
/// assert_eq!(to_xinput_axis(7.5), 32767);
/// assert_eq!(to_xinput_axis(0.0), 0);
/// ```
#[inline]
pub fn to_xinput_axis(value: f64) -> i16 {
    let v = sanitize(value, 0.0).clamp(-1.0, 1.0);
    (v * 32767.0).round() as i16
}

#[inline]
fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
