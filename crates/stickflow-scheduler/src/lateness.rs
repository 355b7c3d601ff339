//! Per-tick lateness tracking.
//!
//! Lateness is how far past its deadline a tick actually fired. A healthy
//! loop shows small, non-accumulating lateness; growth over time means drift.

/// Lateness statistics over a bounded window of recent ticks.
///
/// # RT-Safety
///
/// - `record` is O(1) and never allocates after construction
/// - percentile queries reuse a scratch buffer and are meant for observers,
///   not the tick path
#[derive(Debug, Clone)]
pub struct LatenessMetrics {
    /// Ticks recorded
    pub total_ticks: u64,
    /// Ticks that fired more than one period late
    pub late_ticks: u64,
    /// Largest lateness observed, in nanoseconds
    pub max_lateness_ns: u64,
    /// Most recent lateness, in nanoseconds
    pub last_lateness_ns: u64,
    lateness_sum_ns: u128,
    window: Vec<u64>,
    window_capacity: usize,
    next_slot: usize,
    scratch: Vec<u64>,
}

impl Default for LatenessMetrics {
    fn default() -> Self {
        Self::with_capacity(4_096)
    }
}

impl LatenessMetrics {
    /// Create metrics with the default window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create metrics keeping the last `window` samples for percentiles.
    pub fn with_capacity(window: usize) -> Self {
        Self {
            total_ticks: 0,
            late_ticks: 0,
            max_lateness_ns: 0,
            last_lateness_ns: 0,
            lateness_sum_ns: 0,
            window: Vec::with_capacity(window),
            window_capacity: window,
            next_slot: 0,
            scratch: Vec::with_capacity(window),
        }
    }

    /// Record one tick.
    #[inline]
    pub fn record(&mut self, lateness_ns: u64, late: bool) {
        self.total_ticks = self.total_ticks.saturating_add(1);
        if late {
            self.late_ticks = self.late_ticks.saturating_add(1);
        }
        self.max_lateness_ns = self.max_lateness_ns.max(lateness_ns);
        self.last_lateness_ns = lateness_ns;
        self.lateness_sum_ns = self.lateness_sum_ns.saturating_add(u128::from(lateness_ns));

        if self.window_capacity == 0 {
            return;
        }
        if self.window.len() < self.window_capacity {
            self.window.push(lateness_ns);
        } else {
            if let Some(slot) = self.window.get_mut(self.next_slot) {
                *slot = lateness_ns;
            }
            self.next_slot = (self.next_slot + 1) % self.window_capacity;
        }
    }

    /// Mean lateness over every recorded tick, in nanoseconds.
    pub fn mean_lateness_ns(&self) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        self.lateness_sum_ns as f64 / self.total_ticks as f64
    }

    /// Lateness percentile over the window, `percentile` in `[0, 1]`.
    pub fn percentile_ns(&mut self, percentile: f64) -> u64 {
        if self.window.is_empty() {
            return 0;
        }
        let percentile = if percentile.is_finite() {
            percentile.clamp(0.0, 1.0)
        } else {
            1.0
        };

        self.scratch.clear();
        self.scratch.extend_from_slice(&self.window);
        let len = self.scratch.len();
        let index = ((len as f64 * percentile) as usize).min(len.saturating_sub(1));
        let (_, value, _) = self.scratch.select_nth_unstable(index);
        *value
    }

    /// Median lateness over the window.
    pub fn p50_ns(&mut self) -> u64 {
        self.percentile_ns(0.50)
    }

    /// 99th-percentile lateness over the window.
    pub fn p99_ns(&mut self) -> u64 {
        self.percentile_ns(0.99)
    }

    /// Fraction of ticks that were late, `[0, 1]`.
    pub fn late_rate(&self) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        self.late_ticks as f64 / self.total_ticks as f64
    }

    /// Clear everything, keeping allocations.
    pub fn reset(&mut self) {
        self.total_ticks = 0;
        self.late_ticks = 0;
        self.max_lateness_ns = 0;
        self.last_lateness_ns = 0;
        self.lateness_sum_ns = 0;
        self.window.clear();
        self.next_slot = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metrics_report_zero() {
        let mut metrics = LatenessMetrics::new();
        assert_eq!(metrics.p99_ns(), 0);
        assert!(metrics.mean_lateness_ns().abs() < f64::EPSILON);
        assert!(metrics.late_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn percentiles_over_window() {
        let mut metrics = LatenessMetrics::with_capacity(100);
        for n in 1..=100 {
            metrics.record(n, false);
        }
        assert_eq!(metrics.p50_ns(), 51);
        assert_eq!(metrics.p99_ns(), 100);
        assert_eq!(metrics.max_lateness_ns, 100);
    }

    #[test]
    fn window_keeps_recent_samples() {
        let mut metrics = LatenessMetrics::with_capacity(4);
        for n in [1_000, 1_000, 1_000, 1_000, 1, 1, 1, 1] {
            metrics.record(n, false);
        }
        assert_eq!(metrics.percentile_ns(1.0), 1);
        assert_eq!(metrics.max_lateness_ns, 1_000);
    }

    #[test]
    fn late_rate_counts_flagged_ticks() {
        let mut metrics = LatenessMetrics::new();
        metrics.record(0, false);
        metrics.record(10_000_000, true);
        assert!((metrics.late_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_window_still_tracks_totals() {
        let mut metrics = LatenessMetrics::with_capacity(0);
        metrics.record(5, false);
        assert_eq!(metrics.total_ticks, 1);
        assert_eq!(metrics.p99_ns(), 0);
    }

    #[test]
    fn reset_clears() {
        let mut metrics = LatenessMetrics::new();
        metrics.record(42, true);
        metrics.reset();
        assert_eq!(metrics.total_ticks, 0);
        assert_eq!(metrics.max_lateness_ns, 0);
        assert_eq!(metrics.p50_ns(), 0);
    }
}
