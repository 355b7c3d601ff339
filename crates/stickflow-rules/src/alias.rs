//! Hold one button while a condition holds.

use stickflow_pipeline::{Button, Condition, InputSnapshot, OutputFrame, Rule, TickContext};

/// Forces `button` pressed whenever the condition holds on the input.
/// Stateless.
#[derive(Debug)]
pub struct ButtonAliasRule {
    condition: Condition,
    button: Button,
}

impl ButtonAliasRule {
    /// Alias `button` to `condition`.
    pub fn new(condition: Condition, button: Button) -> Self {
        Self { condition, button }
    }
}

impl Rule for ButtonAliasRule {
    fn name(&self) -> &'static str {
        "button_alias"
    }

    fn apply(&mut self, _: &TickContext, input: &InputSnapshot, output: &mut OutputFrame) {
        if self.condition.evaluate(input) {
            output.set_button(self.button, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stickflow_pipeline::Trigger;

    #[test]
    fn presses_only_while_held() {
        let mut rule = ButtonAliasRule::new(Condition::trigger(Trigger::L2), Button::L3);
        let ctx = TickContext::new(0, Duration::ZERO, 0.005);

        let mut frame = OutputFrame::default();
        rule.apply(&ctx, &InputSnapshot::default().with_trigger(Trigger::L2, 200), &mut frame);
        assert!(frame.buttons.get(Button::L3));

        let mut frame = OutputFrame::default();
        rule.apply(&ctx, &InputSnapshot::default(), &mut frame);
        assert!(!frame.buttons.get(Button::L3));
    }

    #[test]
    fn never_releases_an_upstream_press() {
        let mut rule = ButtonAliasRule::new(Condition::never(), Button::L3);
        let mut frame = OutputFrame::default();
        frame.set_button(Button::L3, true);
        rule.apply(&TickContext::new(0, Duration::ZERO, 0.0), &InputSnapshot::default(), &mut frame);
        assert!(frame.buttons.get(Button::L3));
    }
}
