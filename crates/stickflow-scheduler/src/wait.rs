//! Policies for waiting out the remainder of a tick.

use std::fmt;
use std::time::Duration;

use crate::clock::ManualClock;

/// Waits part or all of `remaining`, then returns so the caller can re-check
/// its deadline.
pub trait WaitStrategy: Send + fmt::Debug {
    /// Wait for at most roughly `remaining`.
    fn wait(&mut self, remaining: Duration);
}

/// Coarse sleep far from the deadline, busy-spin near it.
///
/// - above `sleep_above`: sleep one `sleep_quantum`
/// - above `yield_above`: yield the time slice
/// - otherwise: spin
///
/// Each call returns within about one quantum.
#[derive(Debug, Clone, Copy)]
pub struct HybridWait {
    /// Remaining time above which the thread sleeps
    pub sleep_above: Duration,
    /// Length of each sleep
    pub sleep_quantum: Duration,
    /// Remaining time above which the thread yields instead of spinning
    pub yield_above: Duration,
}

impl Default for HybridWait {
    fn default() -> Self {
        Self {
            sleep_above: Duration::from_millis(3),
            sleep_quantum: Duration::from_millis(1),
            yield_above: Duration::from_micros(250),
        }
    }
}

impl WaitStrategy for HybridWait {
    #[inline]
    fn wait(&mut self, remaining: Duration) {
        if remaining > self.sleep_above {
            std::thread::sleep(self.sleep_quantum);
        } else if remaining > self.yield_above {
            std::thread::yield_now();
        } else {
            std::hint::spin_loop();
        }
    }
}

/// Waiting against a [`ManualClock`]: advances the clock past the deadline by
/// a configurable overshoot instead of blocking.
///
/// ```
/// use std::time::Duration;
/// use stickflow_scheduler::{Clock, ManualClock, SimulatedWait, WaitStrategy};
///
/// let clock = ManualClock::new();
/// let mut wait = SimulatedWait::new(clock.clone()).with_overshoot(Duration::from_micros(50));
/// wait.wait(Duration::from_millis(2));
/// assert_eq!(clock.now(), Duration::from_micros(2050));
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedWait {
    clock: ManualClock,
    overshoot: Duration,
}

impl SimulatedWait {
    /// Wait against `clock` with no overshoot.
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            overshoot: Duration::ZERO,
        }
    }

    /// Land `overshoot` after each deadline instead of exactly on it.
    pub fn with_overshoot(mut self, overshoot: Duration) -> Self {
        self.overshoot = overshoot;
        self
    }

    /// Change the overshoot between waits.
    pub fn set_overshoot(&mut self, overshoot: Duration) {
        self.overshoot = overshoot;
    }
}

impl WaitStrategy for SimulatedWait {
    fn wait(&mut self, remaining: Duration) {
        self.clock.advance(remaining.saturating_add(self.overshoot));
    }
}
