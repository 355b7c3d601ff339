//! Absolute-deadline tick scheduler.
//!
//! Deadlines advance by exactly one period from the previous deadline, never
//! from the time a tick actually fired, so lateness on one tick does not
//! shift every later tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::clock::{Clock, MonotonicClock};
use crate::lateness::LatenessMetrics;
use crate::wait::{HybridWait, WaitStrategy};

const MIN_PERIOD: Duration = Duration::from_micros(100);

/// One fired tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Zero-based tick index
    pub index: u64,
    /// When this tick was due, on the scheduler clock
    pub deadline: Duration,
    /// When this tick actually fired
    pub fired_at: Duration,
    /// `fired_at - deadline`
    pub lateness: Duration,
    /// Time since the previous tick fired (one period for the first tick)
    pub dt: Duration,
    /// Whether the scheduler abandoned its backlog on this tick
    pub resynced: bool,
    /// Deadlines skipped by that resynchronisation
    pub dropped: u64,
}

impl Tick {
    /// `dt` in seconds.
    #[inline]
    pub fn dt_secs(&self) -> f64 {
        self.dt.as_secs_f64()
    }
}

/// Fixed-period scheduler with bounded lag.
///
/// Each call to [`TickScheduler::wait_for_tick`] blocks until the next
/// deadline and then advances the deadline by one period. If the loop falls
/// more than `max_lag_periods` behind, the backlog is dropped and the next
/// deadline is set one period after the current time. Skipped ticks are never
/// replayed.
///
/// # RT-Safety
///
/// - `wait_for_tick` is O(1) plus the wait itself
/// - no allocations after construction
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use stickflow_scheduler::{ManualClock, SimulatedWait, TickScheduler};
///
/// let clock = ManualClock::new();
/// let wait = SimulatedWait::new(clock.clone());
/// let mut scheduler = TickScheduler::with_clock(Duration::from_millis(5), clock, wait);
///
/// let first = scheduler.wait_for_tick();
/// let second = scheduler.wait_for_tick();
/// assert_eq!(first.fired_at, Duration::from_millis(5));
/// assert_eq!(second.fired_at, Duration::from_millis(10));
/// ```
#[derive(Debug)]
pub struct TickScheduler<C = MonotonicClock, W = HybridWait> {
    period: Duration,
    clock: C,
    wait: W,
    next_deadline: Duration,
    last_fired: Option<Duration>,
    tick_count: u64,
    max_lag_periods: u32,
    resyncs: u64,
    dropped_ticks: u64,
    metrics: LatenessMetrics,
}

impl TickScheduler {
    /// Scheduler on the wall clock with the default wait strategy.
    pub fn new(period: Duration) -> Self {
        Self::with_clock(period, MonotonicClock::new(), HybridWait::default())
    }
}

impl<C: Clock, W: WaitStrategy> TickScheduler<C, W> {
    /// Scheduler on an arbitrary clock and wait strategy.
    ///
    /// The period is floored at 100 µs. The first deadline is one period
    /// after the clock's current time.
    pub fn with_clock(period: Duration, clock: C, wait: W) -> Self {
        let period = period.max(MIN_PERIOD);
        let next_deadline = clock.now().saturating_add(period);
        Self {
            period,
            clock,
            wait,
            next_deadline,
            last_fired: None,
            tick_count: 0,
            max_lag_periods: crate::DEFAULT_MAX_LAG_PERIODS,
            resyncs: 0,
            dropped_ticks: 0,
            metrics: LatenessMetrics::new(),
        }
    }

    /// Set how many periods the loop may fall behind before resynchronising
    /// (at least 1).
    pub fn with_max_lag_periods(mut self, periods: u32) -> Self {
        self.max_lag_periods = periods.max(1);
        self
    }

    /// Block until the next deadline and return the fired tick.
    pub fn wait_for_tick(&mut self) -> Tick {
        let deadline = self.next_deadline;
        let mut now = self.clock.now();
        while now < deadline {
            self.wait.wait(deadline.saturating_sub(now));
            now = self.clock.now();
        }

        let lateness = now.saturating_sub(deadline);
        self.metrics.record(duration_ns(lateness), lateness > self.period);

        let dt = match self.last_fired {
            Some(prev) => now.saturating_sub(prev),
            None => self.period,
        };
        self.last_fired = Some(now);

        self.next_deadline = deadline.saturating_add(self.period);

        let mut dropped = 0;
        let lag_limit = self.period.saturating_mul(self.max_lag_periods);
        let behind = now.saturating_sub(self.next_deadline);
        if behind > lag_limit {
            let period_ns = duration_ns(self.period).max(1);
            dropped = duration_ns(behind) / period_ns + 1;
            self.next_deadline = now.saturating_add(self.period);
            self.resyncs = self.resyncs.saturating_add(1);
            self.dropped_ticks = self.dropped_ticks.saturating_add(dropped);
        }

        let index = self.tick_count;
        self.tick_count = self.tick_count.saturating_add(1);

        Tick {
            index,
            deadline,
            fired_at: now,
            lateness,
            dt,
            resynced: dropped > 0,
            dropped,
        }
    }

    /// Run `body` once per tick until `stop` is set or `body` fails.
    ///
    /// `stop` is checked once per tick boundary, before waiting. Returns the
    /// number of ticks processed.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `body`; no further ticks run.
    pub fn run_until<E, F>(&mut self, stop: &AtomicBool, mut body: F) -> Result<u64, E>
    where
        F: FnMut(&Tick) -> Result<(), E>,
    {
        let mut processed = 0u64;
        while !stop.load(Ordering::Acquire) {
            let tick = self.wait_for_tick();
            body(&tick)?;
            processed = processed.saturating_add(1);
        }
        Ok(processed)
    }

    /// Configured period.
    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks fired so far.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Deadline of the next tick.
    #[inline]
    pub fn next_deadline(&self) -> Duration {
        self.next_deadline
    }

    /// Times the backlog was abandoned.
    #[inline]
    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }

    /// Deadlines skipped by resynchronisation.
    #[inline]
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }

    /// Lateness statistics.
    #[inline]
    pub fn metrics(&self) -> &LatenessMetrics {
        &self.metrics
    }

    /// Lateness statistics, mutable for percentile queries.
    #[inline]
    pub fn metrics_mut(&mut self) -> &mut LatenessMetrics {
        &mut self.metrics
    }

    /// The scheduler's clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Restart the schedule one period from now and clear statistics.
    pub fn reset(&mut self) {
        self.next_deadline = self.clock.now().saturating_add(self.period);
        self.last_fired = None;
        self.tick_count = 0;
        self.resyncs = 0;
        self.dropped_ticks = 0;
        self.metrics.reset();
    }
}

#[inline]
fn duration_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
