//! Fixed-direction compensation with a ramp envelope.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stickflow_filters::TauSmoother;
use stickflow_pipeline::{Condition, InputSnapshot, OutputFrame, Rule, Stick, TickContext};

use crate::edge::{Edge, EdgeDetector};

/// Tunables for [`RampCompensationRule`]. Out-of-range values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampParams {
    /// Peak pull, `[0, 1.5]`
    pub strength: f64,
    /// Vertical direction, `[-1, 1]`; negative pulls down
    pub vertical_bias: f64,
    /// Horizontal direction, `[-1, 1]`
    pub horizontal_bias: f64,
    /// Output smoothing, at least 5 ms
    pub smoothing_tau_ms: f64,
    /// Time to full strength, at least 10 ms
    pub ramp_up_ms: f64,
    /// Time from full strength to zero after release, at least 10 ms
    pub ramp_down_ms: f64,
}

impl Default for RampParams {
    fn default() -> Self {
        Self {
            strength: 0.24,
            vertical_bias: -1.0,
            horizontal_bias: 0.0,
            smoothing_tau_ms: 25.0,
            ramp_up_ms: 120.0,
            ramp_down_ms: 80.0,
        }
    }
}

impl RampParams {
    /// Copy with every field clamped to its range.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        let or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            strength: or(self.strength, d.strength).clamp(0.0, 1.5),
            vertical_bias: or(self.vertical_bias, d.vertical_bias).clamp(-1.0, 1.0),
            horizontal_bias: or(self.horizontal_bias, d.horizontal_bias).clamp(-1.0, 1.0),
            smoothing_tau_ms: or(self.smoothing_tau_ms, d.smoothing_tau_ms).max(5.0),
            ramp_up_ms: or(self.ramp_up_ms, d.ramp_up_ms).max(10.0),
            ramp_down_ms: or(self.ramp_down_ms, d.ramp_down_ms).max(10.0),
        }
    }
}

/// Pulls the right stick in a fixed direction while active.
///
/// The pull ramps linearly to full strength over `ramp_up_ms` from the
/// moment of activation and decays linearly over `ramp_down_ms` after
/// release, then passes through a smoother.
#[derive(Debug)]
pub struct RampCompensationRule {
    condition: Condition,
    params: RampParams,
    edge: EdgeDetector,
    started: Duration,
    ramp: f64,
    smooth_x: TauSmoother,
    smooth_y: TauSmoother,
}

impl RampCompensationRule {
    /// Rule active while `condition` holds.
    pub fn new(condition: Condition, params: RampParams) -> Self {
        let params = params.clamped();
        Self {
            condition,
            params,
            edge: EdgeDetector::new(),
            started: Duration::ZERO,
            ramp: 0.0,
            smooth_x: TauSmoother::new(params.smoothing_tau_ms),
            smooth_y: TauSmoother::new(params.smoothing_tau_ms),
        }
    }

    /// Parameters after clamping.
    pub fn params(&self) -> &RampParams {
        &self.params
    }

    /// Envelope level in `[0, 1]`.
    pub fn ramp(&self) -> f64 {
        self.ramp
    }
}

impl Rule for RampCompensationRule {
    fn name(&self) -> &'static str {
        "ramp_compensation"
    }

    fn apply(&mut self, ctx: &TickContext, input: &InputSnapshot, output: &mut OutputFrame) {
        let edge = self.edge.update(self.condition.evaluate(input));
        if edge == Edge::Rising {
            self.started = ctx.now;
        }

        if edge.is_high() {
            let held_ms = ctx.now.saturating_sub(self.started).as_secs_f64() * 1000.0;
            self.ramp = (held_ms / self.params.ramp_up_ms).clamp(0.0, 1.0);
        } else {
            let decay = ctx.dt * 1000.0 / self.params.ramp_down_ms;
            self.ramp = (self.ramp - decay).max(0.0);
        }

        let pull = self.params.strength * self.ramp;
        let x = self.smooth_x.update(pull * self.params.horizontal_bias, ctx.dt);
        let y = self.smooth_y.update(pull * self.params.vertical_bias, ctx.dt);
        output.offset_stick(Stick::Right, x, y);
    }

    fn reset(&mut self) {
        self.edge.reset();
        self.started = Duration::ZERO;
        self.ramp = 0.0;
        self.smooth_x.reset_to(0.0);
        self.smooth_y.reset_to(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use stickflow_pipeline::Button;
    use stickflow_test_helpers::fixtures::{holding, ticks};

    #[test]
    fn ramps_up_then_down() {
        let mut rule = RampCompensationRule::new(Condition::button(Button::R1), RampParams::default());
        let held = holding(Button::R1);
        let mut clock = ticks(Duration::from_millis(5));

        let mut offsets = Vec::new();
        for ctx in clock.by_ref().take(60) {
            let mut frame = OutputFrame::default();
            rule.apply(&ctx, &held, &mut frame);
            offsets.push(frame.right_y);
        }
        assert_abs_diff_eq!(rule.ramp(), 1.0);
        stickflow_test_helpers::assert_non_increasing!(&offsets);
        assert_abs_diff_eq!(offsets.last().copied().unwrap_or_default(), -0.24, epsilon = 1e-3);

        for ctx in clock.take(60) {
            let mut frame = OutputFrame::default();
            rule.apply(&ctx, &InputSnapshot::default(), &mut frame);
        }
        assert_abs_diff_eq!(rule.ramp(), 0.0);
    }

    #[test]
    fn horizontal_bias_moves_x() {
        let params = RampParams {
            vertical_bias: 0.0,
            horizontal_bias: 1.0,
            ..RampParams::default()
        };
        let mut rule = RampCompensationRule::new(Condition::button(Button::R1), params);
        let held = holding(Button::R1);
        let frame = ticks(Duration::from_millis(5))
            .take(100)
            .map(|ctx| {
                let mut frame = OutputFrame::default();
                rule.apply(&ctx, &held, &mut frame);
                frame
            })
            .last()
            .unwrap_or_default();
        assert!(frame.right_x > 0.2);
        assert_abs_diff_eq!(frame.right_y, 0.0);
    }

    #[test]
    fn params_clamp() {
        let p = RampParams {
            strength: 4.0,
            vertical_bias: -3.0,
            smoothing_tau_ms: 0.0,
            ramp_up_ms: 1.0,
            ramp_down_ms: f64::NAN,
            ..RampParams::default()
        }
        .clamped();
        assert_abs_diff_eq!(p.strength, 1.5);
        assert_abs_diff_eq!(p.vertical_bias, -1.0);
        assert_abs_diff_eq!(p.smoothing_tau_ms, 5.0);
        assert_abs_diff_eq!(p.ramp_up_ms, 10.0);
        assert_abs_diff_eq!(p.ramp_down_ms, 80.0);
    }
}
