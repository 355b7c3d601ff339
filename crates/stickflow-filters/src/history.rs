//! Fixed-capacity ring of recent samples.

/// Bounded FIFO history that overwrites its oldest entry when full.
///
/// Storage is allocated once at construction; [`BoundedHistory::push`] never
/// allocates afterwards. Iteration always runs oldest to newest.
///
/// # Example
///
/// ```
/// use stickflow_filters::BoundedHistory;
///
/// let mut history = BoundedHistory::new(3);
/// for v in 1..=5 {
///     history.push(v);
/// }
/// assert_eq!(history.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
/// assert_eq!(history.last_n(2).collect::<Vec<_>>(), vec![4, 5]);
/// assert_eq!(history.latest(), Some(5));
/// ```
#[derive(Clone, Debug)]
pub struct BoundedHistory<T> {
    buf: Vec<T>,
    capacity: usize,
    /// Index of the oldest entry once the buffer is full.
    head: usize,
}

impl<T: Copy> BoundedHistory<T> {
    /// Create an empty history holding at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Append a sample, evicting the oldest when full.
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.buf.len() < self.capacity {
            self.buf.push(value);
            return;
        }
        if let Some(slot) = self.buf.get_mut(self.head) {
            *slot = value;
        }
        self.head = (self.head + 1) % self.capacity;
    }

    /// Number of samples held.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether no samples are held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether the next push evicts a sample.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    /// Maximum number of samples held.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every sample, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.head = 0;
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = T> + '_ {
        let (newer, older) = self.buf.split_at(self.head.min(self.buf.len()));
        older.iter().chain(newer.iter()).copied()
    }

    /// The most recent `n` samples (fewer if not yet recorded), oldest first.
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = T> + '_ {
        self.iter().skip(self.len().saturating_sub(n))
    }

    /// The most recent sample.
    pub fn latest(&self) -> Option<T> {
        if self.is_full() {
            let idx = (self.head + self.capacity - 1) % self.capacity;
            self.buf.get(idx).copied()
        } else {
            self.buf.last().copied()
        }
    }

    /// Copy the contents into a `Vec`, oldest first.
    ///
    /// Allocates; intended for diagnostics, not the tick path.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}
