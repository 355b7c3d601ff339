//! Slowdown and pull near a target point.
//!
//! Per active tick, on the right stick:
//!
//! 1. optional centre boost for small deflections
//! 2. shake dampening when the stick moves faster than a threshold
//! 3. bubble slowdown scaled by closeness to the target
//! 4. micro-correction pull toward the target when very close
//!
//! Slowdown and pull are each smoothed with their own time constant.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use stickflow_filters::TauSmoother;
use stickflow_pipeline::{Condition, InputSnapshot, OutputFrame, Rule, Stick, TickContext};

const MIN_DT: f64 = 0.001;
const MIN_MAGNITUDE: f64 = 0.001;
const CENTER_BOOST_BELOW: f64 = 0.3;

/// Tunables for [`ProximityAssistRule`]. Out-of-range values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityParams {
    /// Slowdown zone radius, `[0.05, 0.5]`
    pub bubble_radius: f64,
    /// Slowdown at the target itself, `[0, 0.95]`
    pub bubble_strength: f64,
    /// Slowdown smoothing, at least 5 ms
    pub bubble_smooth_ms: f64,
    /// Pull zone radius, `[0.02, 0.3]`
    pub micro_radius: f64,
    /// Pull strength, `[0, 0.5]`
    pub micro_strength: f64,
    /// Pull smoothing, at least 5 ms
    pub micro_smooth_ms: f64,
    /// Stick speed (units per second) treated as shake, `[0.5, 10]`
    pub shake_threshold: f64,
    /// Fraction of a shake step removed, `[0, 0.95]`
    pub shake_dampening: f64,
    /// Strength multiplier while aiming down sights, `[1, 3]`
    pub ads_multiplier: f64,
    /// Whether small deflections are boosted
    pub response_override: bool,
    /// Boost for deflections under 0.3, `[1, 2]`
    pub response_center_boost: f64,
}

impl Default for ProximityParams {
    fn default() -> Self {
        Self {
            bubble_radius: 0.20,
            bubble_strength: 0.85,
            bubble_smooth_ms: 25.0,
            micro_radius: 0.10,
            micro_strength: 0.20,
            micro_smooth_ms: 20.0,
            shake_threshold: 3.5,
            shake_dampening: 0.70,
            ads_multiplier: 1.5,
            response_override: true,
            response_center_boost: 1.3,
        }
    }
}

impl ProximityParams {
    /// Copy with every field clamped to its range.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        let or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            bubble_radius: or(self.bubble_radius, d.bubble_radius).clamp(0.05, 0.5),
            bubble_strength: or(self.bubble_strength, d.bubble_strength).clamp(0.0, 0.95),
            bubble_smooth_ms: or(self.bubble_smooth_ms, d.bubble_smooth_ms).max(5.0),
            micro_radius: or(self.micro_radius, d.micro_radius).clamp(0.02, 0.3),
            micro_strength: or(self.micro_strength, d.micro_strength).clamp(0.0, 0.5),
            micro_smooth_ms: or(self.micro_smooth_ms, d.micro_smooth_ms).max(5.0),
            shake_threshold: or(self.shake_threshold, d.shake_threshold).clamp(0.5, 10.0),
            shake_dampening: or(self.shake_dampening, d.shake_dampening).clamp(0.0, 0.95),
            ads_multiplier: or(self.ads_multiplier, d.ads_multiplier).clamp(1.0, 3.0),
            response_override: self.response_override,
            response_center_boost: or(self.response_center_boost, d.response_center_boost)
                .clamp(1.0, 2.0),
        }
    }
}

/// A target point written by another thread.
///
/// Cloning shares the same point. An unset target reads as the centre.
#[derive(Debug, Clone, Default)]
pub struct SharedTarget {
    point: Arc<Mutex<Option<(f64, f64)>>>,
}

impl SharedTarget {
    /// An unset target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the target. Coordinates are clamped to `[-1, 1]`; non-finite
    /// values clear it.
    pub fn set(&self, x: f64, y: f64) {
        let point = (x.is_finite() && y.is_finite()).then(|| (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0)));
        *self.point.lock() = point;
    }

    /// Forget the target.
    pub fn clear(&self) {
        *self.point.lock() = None;
    }

    /// Current target, if any.
    pub fn get(&self) -> Option<(f64, f64)> {
        *self.point.lock()
    }
}

/// Where the assist pulls toward.
#[derive(Debug, Clone, Default)]
pub enum AssistTarget {
    /// Stick centre
    #[default]
    Center,
    /// A point supplied from outside the tick thread
    Shared(SharedTarget),
}

impl AssistTarget {
    #[inline]
    fn point(&self) -> (f64, f64) {
        match self {
            AssistTarget::Center => (0.0, 0.0),
            AssistTarget::Shared(t) => t.get().unwrap_or((0.0, 0.0)),
        }
    }
}

/// Slows and nudges the right stick near a target point.
///
/// The first active tick only records the stick position. Deactivation
/// clears all smoothing.
#[derive(Debug)]
pub struct ProximityAssistRule {
    condition: Condition,
    ads: Condition,
    params: ProximityParams,
    target: AssistTarget,
    primed: bool,
    previous: (f64, f64),
    slowdown: TauSmoother,
    pull_x: TauSmoother,
    pull_y: TauSmoother,
}

impl ProximityAssistRule {
    /// Assist toward the centre, boosted while `ads` holds.
    pub fn new(condition: Condition, ads: Condition, params: ProximityParams) -> Self {
        let params = params.clamped();
        let mut slowdown = TauSmoother::new(params.bubble_smooth_ms);
        slowdown.reset_to(1.0);
        Self {
            condition,
            ads,
            params,
            target: AssistTarget::Center,
            primed: false,
            previous: (0.0, 0.0),
            slowdown,
            pull_x: TauSmoother::new(params.micro_smooth_ms),
            pull_y: TauSmoother::new(params.micro_smooth_ms),
        }
    }

    /// Pull toward `target` instead of the centre.
    #[must_use]
    pub fn with_target(mut self, target: AssistTarget) -> Self {
        self.target = target;
        self
    }

    /// Parameters after clamping.
    pub fn params(&self) -> &ProximityParams {
        &self.params
    }

    /// Current smoothed sensitivity multiplier, 1 when no slowdown applies.
    pub fn slowdown(&self) -> f64 {
        self.slowdown.value()
    }

    fn boost(&self, x: f64, y: f64) -> (f64, f64) {
        let magnitude = x.hypot(y);
        if self.params.response_override && magnitude >= MIN_MAGNITUDE && magnitude < CENTER_BOOST_BELOW {
            let b = self.params.response_center_boost;
            (x * b, y * b)
        } else {
            (x, y)
        }
    }
}

impl Rule for ProximityAssistRule {
    fn name(&self) -> &'static str {
        "proximity_assist"
    }

    fn apply(&mut self, ctx: &TickContext, input: &InputSnapshot, output: &mut OutputFrame) {
        if !self.condition.evaluate(input) {
            self.reset();
            return;
        }

        let (raw_x, raw_y) = output.stick(Stick::Right);
        if !self.primed {
            self.primed = true;
            self.previous = (raw_x, raw_y);
            return;
        }

        let p = self.params;
        let ads = self.ads.evaluate(input);
        let dt = ctx.dt;

        let (mut x, mut y) = self.boost(raw_x, raw_y);

        let (dx, dy) = (x - self.previous.0, y - self.previous.1);
        let speed = dx.hypot(dy) / dt.max(MIN_DT);
        if speed > p.shake_threshold {
            let keep = 1.0 - p.shake_dampening;
            x = self.previous.0 + dx * keep;
            y = self.previous.1 + dy * keep;
        }

        let (tx, ty) = self.target.point();
        let (off_x, off_y) = (x - tx, y - ty);
        let distance = off_x.hypot(off_y);

        let mut target_slowdown = 1.0;
        if distance < p.bubble_radius {
            let closeness = 1.0 - distance / p.bubble_radius;
            let mut strength = p.bubble_strength;
            if ads {
                strength = (strength * p.ads_multiplier).min(0.95);
            }
            target_slowdown = 1.0 - strength * closeness;
        }
        let slowdown = self.slowdown.update(target_slowdown, dt);

        let (mut pull_x, mut pull_y) = (0.0, 0.0);
        if distance < p.micro_radius && distance > MIN_MAGNITUDE {
            let closeness = 1.0 - distance / p.micro_radius;
            let mut strength = p.micro_strength;
            if ads {
                strength = (strength * p.ads_multiplier).min(0.5);
            }
            pull_x = -off_x * strength * closeness;
            pull_y = -off_y * strength * closeness;
        }
        let pull_x = self.pull_x.update(pull_x, dt);
        let pull_y = self.pull_y.update(pull_y, dt);

        output.set_stick(Stick::Right, (x + pull_x) * slowdown, (y + pull_y) * slowdown);
        self.previous = (x, y);
    }

    fn reset(&mut self) {
        self.primed = false;
        self.slowdown.reset_to(1.0);
        self.pull_x.reset_to(0.0);
        self.pull_y.reset_to(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::time::Duration;
    use stickflow_pipeline::{Button, Trigger};
    use stickflow_test_helpers::fixtures::{holding, ticks};

    fn plain() -> ProximityParams {
        ProximityParams {
            response_override: false,
            ..ProximityParams::default()
        }
    }

    fn steady(rule: &mut ProximityAssistRule, input: &InputSnapshot, x: f64, y: f64, n: usize) -> OutputFrame {
        ticks(Duration::from_millis(5))
            .take(n)
            .map(|ctx| {
                let mut frame = OutputFrame::default();
                frame.set_stick(Stick::Right, x, y);
                rule.apply(&ctx, input, &mut frame);
                frame
            })
            .last()
            .unwrap_or_default()
    }

    #[test]
    fn slows_near_centre() {
        let mut rule = ProximityAssistRule::new(Condition::button(Button::L1), Condition::never(), plain());
        let frame = steady(&mut rule, &holding(Button::L1), 0.15, 0.0, 100);
        assert!(frame.right_x < 0.15 && frame.right_x > 0.0, "x {}", frame.right_x);
        assert!(rule.slowdown() < 1.0);
    }

    #[test]
    fn untouched_outside_bubble() {
        let mut rule = ProximityAssistRule::new(Condition::button(Button::L1), Condition::never(), plain());
        let frame = steady(&mut rule, &holding(Button::L1), 0.6, 0.0, 100);
        assert_abs_diff_eq!(frame.right_x, 0.6, epsilon = 1e-9);
    }

    #[test]
    fn ads_slows_more() {
        let input = holding(Button::L1).with_trigger(Trigger::L2, 255);
        let mut hip = ProximityAssistRule::new(Condition::button(Button::L1), Condition::never(), plain());
        let mut ads = ProximityAssistRule::new(
            Condition::button(Button::L1),
            Condition::trigger(Trigger::L2),
            plain(),
        );
        let a = steady(&mut hip, &input, 0.15, 0.0, 100);
        let b = steady(&mut ads, &input, 0.15, 0.0, 100);
        assert!(b.right_x < a.right_x);
    }

    #[test]
    fn shared_target_moves_bubble() {
        let target = SharedTarget::new();
        target.set(0.6, 0.0);
        let mut rule = ProximityAssistRule::new(Condition::button(Button::L1), Condition::never(), plain())
            .with_target(AssistTarget::Shared(target.clone()));
        let near_target = steady(&mut rule, &holding(Button::L1), 0.55, 0.0, 100);
        assert!(near_target.right_x < 0.55);

        target.clear();
        assert_eq!(target.get(), None);
    }

    #[test]
    fn release_clears_state() {
        let mut rule = ProximityAssistRule::new(Condition::button(Button::L1), Condition::never(), plain());
        steady(&mut rule, &holding(Button::L1), 0.1, 0.0, 50);
        let mut frame = OutputFrame::default();
        frame.set_stick(Stick::Right, 0.1, 0.0);
        rule.apply(&TickContext::new(50, Duration::from_millis(250), 0.005), &InputSnapshot::default(), &mut frame);
        assert_abs_diff_eq!(frame.right_x, 0.1);
        assert_abs_diff_eq!(rule.slowdown(), 1.0);
    }

    #[test]
    fn shake_is_dampened() {
        let mut rule = ProximityAssistRule::new(Condition::button(Button::L1), Condition::never(), plain());
        let input = holding(Button::L1);
        steady(&mut rule, &input, 0.8, 0.0, 10);
        let mut frame = OutputFrame::default();
        frame.set_stick(Stick::Right, -0.8, 0.0);
        rule.apply(&TickContext::new(10, Duration::from_millis(50), 0.005), &input, &mut frame);
        // 1.6 units in 5 ms is far above the threshold: only 30% of the step lands.
        assert_abs_diff_eq!(frame.right_x, 0.8 - 1.6 * 0.3, epsilon = 1e-9);
    }

    #[test]
    fn params_clamp() {
        let p = ProximityParams {
            bubble_radius: 2.0,
            micro_strength: 1.0,
            ads_multiplier: 0.0,
            shake_threshold: f64::INFINITY,
            ..ProximityParams::default()
        }
        .clamped();
        assert_abs_diff_eq!(p.bubble_radius, 0.5);
        assert_abs_diff_eq!(p.micro_strength, 0.5);
        assert_abs_diff_eq!(p.ads_multiplier, 1.0);
        assert_abs_diff_eq!(p.shake_threshold, 3.5);
    }
}
