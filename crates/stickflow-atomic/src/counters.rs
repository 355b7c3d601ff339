//! Atomic counters for the tick loop.
//!
//! # RT Safety
//!
//! All `inc_*` and `record_*` methods use `Ordering::Relaxed`. Counter values
//! are eventually consistent; no counter orders any other memory access.

use core::sync::atomic::{AtomicU64, Ordering};

/// Counter snapshot returned by [`LoopCounters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Ticks processed end to end
    pub total_ticks: u64,
    /// Ticks that fired later than one full period after their deadline
    pub late_ticks: u64,
    /// Times the scheduler abandoned its backlog and resynchronised
    pub resyncs: u64,
    /// Deadlines skipped by resynchronisation
    pub dropped_ticks: u64,
    /// Rule chains adopted at a tick boundary
    pub chain_swaps: u64,
    /// Input batches applied to the shared input state
    pub input_batches: u64,
}

impl CounterSnapshot {
    /// Share of deadlines dropped relative to all deadlines, in percent.
    #[must_use]
    pub fn dropped_percent(&self) -> f64 {
        let scheduled = self.total_ticks.saturating_add(self.dropped_ticks);
        if scheduled == 0 {
            return 0.0;
        }
        self.dropped_ticks as f64 / scheduled as f64 * 100.0
    }
}

/// Counters shared between the tick thread and observers.
///
/// # Example
///
/// ```rust
/// use stickflow_atomic::LoopCounters;
///
/// let counters = LoopCounters::new();
/// counters.record_resync(4);
/// assert_eq!(counters.snapshot().dropped_ticks, 4);
/// ```
#[derive(Debug)]
pub struct LoopCounters {
    total_ticks: AtomicU64,
    late_ticks: AtomicU64,
    resyncs: AtomicU64,
    dropped_ticks: AtomicU64,
    chain_swaps: AtomicU64,
    input_batches: AtomicU64,
}

impl Default for LoopCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopCounters {
    /// Create counters with every value at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_ticks: AtomicU64::new(0),
            late_ticks: AtomicU64::new(0),
            resyncs: AtomicU64::new(0),
            dropped_ticks: AtomicU64::new(0),
            chain_swaps: AtomicU64::new(0),
            input_batches: AtomicU64::new(0),
        }
    }

    /// Increment the tick counter.
    ///
    /// # RT Safety
    ///
    /// Single atomic fetch-add with `Ordering::Relaxed`.
    #[inline]
    pub fn inc_tick(&self) {
        self.total_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the late tick counter.
    #[inline]
    pub fn inc_late_tick(&self) {
        self.late_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one resynchronisation that skipped `dropped` deadlines.
    #[inline]
    pub fn record_resync(&self, dropped: u64) {
        self.resyncs.fetch_add(1, Ordering::Relaxed);
        self.dropped_ticks.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Increment the chain swap counter.
    #[inline]
    pub fn inc_chain_swap(&self) {
        self.chain_swaps.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the input batch counter.
    ///
    /// Called from the transport thread, never from the tick thread.
    #[inline]
    pub fn inc_input_batch(&self) {
        self.input_batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Total ticks processed so far.
    #[inline]
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks.load(Ordering::Relaxed)
    }

    /// Read every counter.
    ///
    /// Values are read one at a time, so a snapshot taken while the tick
    /// thread runs may mix adjacent ticks.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_ticks: self.total_ticks.load(Ordering::Relaxed),
            late_ticks: self.late_ticks.load(Ordering::Relaxed),
            resyncs: self.resyncs.load(Ordering::Relaxed),
            dropped_ticks: self.dropped_ticks.load(Ordering::Relaxed),
            chain_swaps: self.chain_swaps.load(Ordering::Relaxed),
            input_batches: self.input_batches.load(Ordering::Relaxed),
        }
    }

    /// Read every counter and reset it to zero.
    pub fn snapshot_and_reset(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_ticks: self.total_ticks.swap(0, Ordering::Relaxed),
            late_ticks: self.late_ticks.swap(0, Ordering::Relaxed),
            resyncs: self.resyncs.swap(0, Ordering::Relaxed),
            dropped_ticks: self.dropped_ticks.swap(0, Ordering::Relaxed),
            chain_swaps: self.chain_swaps.swap(0, Ordering::Relaxed),
            input_batches: self.input_batches.swap(0, Ordering::Relaxed),
        }
    }
}
