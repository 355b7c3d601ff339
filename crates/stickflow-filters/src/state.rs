//! Common trait for stateful filters.

use crate::ewma::EwmaFilter;
use crate::smoothing::TauSmoother;
use crate::stick::AxisProcessor;

/// Filters that carry memory between ticks.
///
/// Owners call [`FilterState::reset`] whenever the signal they feed is
/// discontinuous (activation edge, profile switch), so no filter carries stale
/// state across the gap.
pub trait FilterState: std::fmt::Debug {
    /// Drop all accumulated state; the next sample seeds the filter again.
    fn reset(&mut self);
}

impl FilterState for EwmaFilter {
    fn reset(&mut self) {
        EwmaFilter::reset(self);
    }
}

impl FilterState for TauSmoother {
    fn reset(&mut self) {
        self.reset_to(0.0);
    }
}

impl FilterState for AxisProcessor {
    fn reset(&mut self) {
        AxisProcessor::reset(self);
    }
}
