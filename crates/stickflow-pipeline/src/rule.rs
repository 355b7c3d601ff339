//! The per-tick rule contract.

use std::fmt;
use std::time::Duration;

use crate::frame::{InputSnapshot, OutputFrame};

/// Timing information handed to every rule on every tick.
///
/// Rules take time from here rather than from a wall clock, so a test can
/// drive them with any timeline it likes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Zero-based tick index
    pub tick: u64,
    /// Monotonic time since the loop started
    pub now: Duration,
    /// Seconds since the previous tick; never negative or non-finite
    pub dt: f64,
}

impl TickContext {
    /// Build a context. A negative or non-finite `dt_seconds` becomes 0.
    pub fn new(tick: u64, now: Duration, dt_seconds: f64) -> Self {
        let dt = if dt_seconds.is_finite() && dt_seconds > 0.0 {
            dt_seconds
        } else {
            0.0
        };
        Self { tick, now, dt }
    }

    /// `now` in seconds.
    #[inline]
    pub fn now_secs(&self) -> f64 {
        self.now.as_secs_f64()
    }

    /// `now` in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.now.as_secs_f64() * 1000.0
    }
}

/// A stage of the rule chain.
///
/// Each rule reads the raw input snapshot and edits the in-progress output
/// frame. Rules run in chain order, so a later rule sees every earlier
/// rule's edits in `output`.
///
/// # Contract
///
/// - `apply` must not block, allocate or perform I/O
/// - stick values written must stay finite; the chain clamps them to
///   `[-1, 1]` after each rule and faults on non-finite values
/// - any internal smoothing state is the rule's own and is cleared when the
///   rule's activation ends
pub trait Rule: Send + fmt::Debug {
    /// Short stable identifier used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Process one tick.
    fn apply(&mut self, ctx: &TickContext, input: &InputSnapshot, output: &mut OutputFrame);

    /// Return to the just-constructed state.
    fn reset(&mut self) {}
}
