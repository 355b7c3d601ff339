//! Button toggling at a fixed rate.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stickflow_pipeline::{Button, Condition, InputSnapshot, OutputFrame, Rule, TickContext};

/// Tunables for [`RapidFireRule`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RapidFireParams {
    /// Button to toggle
    pub button: Button,
    /// Toggles per second, `[5, 30]`
    pub rate_hz: f64,
}

impl Default for RapidFireParams {
    fn default() -> Self {
        Self {
            button: Button::R1,
            rate_hz: 15.0,
        }
    }
}

/// While active, alternates a button between pressed and released.
///
/// The first active tick presses. When inactive the rule forgets its phase
/// and leaves the frame alone.
#[derive(Debug)]
pub struct RapidFireRule {
    condition: Condition,
    button: Button,
    interval: Duration,
    last_toggle: Option<Duration>,
    pressed: bool,
}

impl RapidFireRule {
    /// Rapid fire rule; the rate is clamped to `[5, 30]` Hz.
    pub fn new(condition: Condition, params: RapidFireParams) -> Self {
        let rate = if params.rate_hz.is_finite() {
            params.rate_hz.clamp(5.0, 30.0)
        } else {
            RapidFireParams::default().rate_hz
        };
        Self {
            condition,
            button: params.button,
            interval: Duration::from_secs_f64(1.0 / rate),
            last_toggle: None,
            pressed: false,
        }
    }

    /// Time between toggles.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Rule for RapidFireRule {
    fn name(&self) -> &'static str {
        "rapid_fire"
    }

    fn apply(&mut self, ctx: &TickContext, input: &InputSnapshot, output: &mut OutputFrame) {
        if !self.condition.evaluate(input) {
            self.reset();
            return;
        }

        match self.last_toggle {
            None => {
                self.last_toggle = Some(ctx.now);
                self.pressed = true;
            }
            Some(last) if ctx.now.saturating_sub(last) >= self.interval => {
                self.last_toggle = Some(ctx.now);
                self.pressed = !self.pressed;
            }
            Some(_) => {}
        }

        output.set_button(self.button, self.pressed);
    }

    fn reset(&mut self) {
        self.last_toggle = None;
        self.pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stickflow_pipeline::Trigger;
    use stickflow_test_helpers::fixtures::{pulling, ticks};

    #[test]
    fn toggles_at_rate() {
        let params = RapidFireParams {
            rate_hz: 20.0,
            ..RapidFireParams::default()
        };
        let mut rule = RapidFireRule::new(Condition::trigger(Trigger::R2), params);
        let input = pulling(Trigger::R2);
        let states: Vec<bool> = ticks(Duration::from_millis(10))
            .take(21)
            .map(|ctx| {
                let mut frame = OutputFrame::default();
                rule.apply(&ctx, &input, &mut frame);
                frame.buttons.get(Button::R1)
            })
            .collect();

        // 50 ms interval on a 10 ms tick: five ticks per phase.
        let expected: Vec<bool> = (0..21).map(|t| (t / 5) % 2 == 0).collect();
        assert_eq!(states, expected);
    }

    #[test]
    fn inactive_leaves_frame_untouched() {
        let mut rule = RapidFireRule::new(Condition::trigger(Trigger::R2), RapidFireParams::default());
        let mut frame = OutputFrame::default();
        frame.set_button(Button::R1, true);
        let ctx = TickContext::new(0, Duration::ZERO, 0.005);
        rule.apply(&ctx, &InputSnapshot::default(), &mut frame);
        assert!(frame.buttons.get(Button::R1));
    }

    #[test]
    fn restarts_pressed_after_release() {
        let mut rule = RapidFireRule::new(Condition::trigger(Trigger::R2), RapidFireParams::default());
        let input = pulling(Trigger::R2);
        for ctx in ticks(Duration::from_millis(5)).take(20) {
            rule.apply(&ctx, &input, &mut OutputFrame::default());
        }
        rule.apply(
            &TickContext::new(20, Duration::from_millis(100), 0.005),
            &InputSnapshot::default(),
            &mut OutputFrame::default(),
        );
        let mut frame = OutputFrame::default();
        rule.apply(&TickContext::new(21, Duration::from_millis(105), 0.005), &input, &mut frame);
        assert!(frame.buttons.get(Button::R1));
    }

    #[test]
    fn rate_is_clamped() {
        let fast = RapidFireRule::new(
            Condition::never(),
            RapidFireParams {
                rate_hz: 1000.0,
                ..RapidFireParams::default()
            },
        );
        let expected = Duration::from_secs_f64(1.0 / 30.0);
        assert_eq!(fast.interval(), expected);
    }
}
