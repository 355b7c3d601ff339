//! One timed button press per activation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stickflow_pipeline::{Button, Condition, InputSnapshot, OutputFrame, Rule, TickContext};

use crate::edge::{Edge, EdgeDetector};

/// Tunables for [`PulseRule`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseParams {
    /// Button to press
    pub button: Button,
    /// How long to hold it, at least 50 ms
    pub duration_ms: u64,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            button: Button::DpadUp,
            duration_ms: 100,
        }
    }
}

/// On the rising edge of its condition, holds a button for a fixed time.
///
/// Holding the condition does not repeat the pulse; it must be released
/// first.
#[derive(Debug)]
pub struct PulseRule {
    condition: Condition,
    button: Button,
    duration: Duration,
    edge: EdgeDetector,
    until: Option<Duration>,
}

impl PulseRule {
    /// Pulse rule; `duration_ms` is raised to 50 if lower.
    pub fn new(condition: Condition, params: PulseParams) -> Self {
        Self {
            condition,
            button: params.button,
            duration: Duration::from_millis(params.duration_ms.max(50)),
            edge: EdgeDetector::new(),
            until: None,
        }
    }

    /// Pulse length after clamping.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether a pulse is in progress.
    pub fn is_pulsing(&self) -> bool {
        self.until.is_some()
    }
}

impl Rule for PulseRule {
    fn name(&self) -> &'static str {
        "pulse"
    }

    fn apply(&mut self, ctx: &TickContext, input: &InputSnapshot, output: &mut OutputFrame) {
        if self.edge.update(self.condition.evaluate(input)) == Edge::Rising {
            self.until = Some(ctx.now.saturating_add(self.duration));
        }
        if let Some(end) = self.until {
            if ctx.now < end {
                output.set_button(self.button, true);
            } else {
                self.until = None;
            }
        }
    }

    fn reset(&mut self) {
        self.edge.reset();
        self.until = None;
    }
}
