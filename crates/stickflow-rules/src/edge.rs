//! Rising and falling edge detection on a boolean signal.

/// What a signal did between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Went from low to high
    Rising,
    /// Went from high to low
    Falling,
    /// Stayed high
    High,
    /// Stayed low
    Low,
}

impl Edge {
    /// Whether the signal is high after this edge.
    #[inline]
    pub fn is_high(self) -> bool {
        matches!(self, Edge::Rising | Edge::High)
    }
}

/// Remembers the previous level of a signal. Starts low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    /// A detector whose previous level is low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current level and classify the transition.
    #[inline]
    pub fn update(&mut self, level: bool) -> Edge {
        let edge = match (self.previous, level) {
            (false, true) => Edge::Rising,
            (true, false) => Edge::Falling,
            (true, true) => Edge::High,
            (false, false) => Edge::Low,
        };
        self.previous = level;
        edge
    }

    /// Level seen on the last update.
    pub fn level(&self) -> bool {
        self.previous
    }

    /// Overwrite the remembered level without reporting an edge.
    pub fn prime(&mut self, level: bool) {
        self.previous = level;
    }

    /// Back to low.
    pub fn reset(&mut self) {
        self.previous = false;
    }
}
