//! Scripted timelines for driving rules without a real clock.

use std::time::Duration;

use stickflow_pipeline::{Button, InputSnapshot, OutputFrame, TickContext, Trigger};

/// Tick contexts at a fixed period, starting at tick 0 and time 0.
///
/// ```
/// use std::time::Duration;
/// use stickflow_test_helpers::fixtures::ticks;
///
/// let ctx: Vec<_> = ticks(Duration::from_millis(5)).take(3).collect();
/// assert_eq!(ctx[2].now, Duration::from_millis(10));
/// ```
pub fn ticks(period: Duration) -> impl Iterator<Item = TickContext> {
    let dt = period.as_secs_f64();
    (0u64..).map(move |i| {
        let now = period.saturating_mul(u32::try_from(i).unwrap_or(u32::MAX));
        TickContext::new(i, now, dt)
    })
}

/// A stick axis moving by a constant amount every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drift {
    /// Value at tick 0
    pub start: f64,
    /// Change per tick
    pub per_tick: f64,
}

impl Drift {
    /// Drift starting at `start`, moving `per_tick` each tick.
    pub fn new(start: f64, per_tick: f64) -> Self {
        Self { start, per_tick }
    }

    /// Axis value on `tick`, clamped to `[-1, 1]`.
    pub fn at(&self, tick: u64) -> f64 {
        (self.start + self.per_tick * tick as f64).clamp(-1.0, 1.0)
    }

    /// An output frame whose right Y follows this drift.
    pub fn frame(&self, tick: u64) -> OutputFrame {
        OutputFrame {
            right_y: self.at(tick),
            ..OutputFrame::default()
        }
    }

    /// Like [`Drift::frame`] with buttons and triggers copied from `input`,
    /// as conditioning would.
    pub fn frame_with(&self, tick: u64, input: &InputSnapshot) -> OutputFrame {
        OutputFrame {
            l2: input.l2,
            r2: input.r2,
            buttons: input.buttons,
            ..self.frame(tick)
        }
    }
}

/// A periodic on/off signal: high for `width` ticks out of every `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTrain {
    /// Ticks per cycle
    pub period: u64,
    /// High ticks at the start of each cycle
    pub width: u64,
}

impl PulseTrain {
    /// Pulse train; `period` is at least 1 and `width` at most `period`.
    pub fn new(period: u64, width: u64) -> Self {
        let period = period.max(1);
        Self {
            period,
            width: width.min(period),
        }
    }

    /// Whether the signal is high on `tick`.
    pub fn is_high(&self, tick: u64) -> bool {
        tick % self.period < self.width
    }

    /// Rising edges in ticks `0..n`.
    pub fn rising_edges(&self, n: u64) -> u64 {
        (0..n)
            .filter(|&t| self.is_high(t) && (t == 0 || !self.is_high(t - 1)))
            .count() as u64
    }
}

/// Input snapshot with only `button` held.
pub fn holding(button: Button) -> InputSnapshot {
    InputSnapshot::default().with_button(button)
}

/// Input snapshot with `trigger` fully pressed.
pub fn pulling(trigger: Trigger) -> InputSnapshot {
    InputSnapshot::default().with_trigger(trigger, u8::MAX)
}
