//! Bounded ring buffer for chart history.
//!
//! Once full, each push discards the oldest value, so a buffer never holds
//! more than its capacity and never reallocates after warmup.
//!
//! # Example
//!
//! ```rust
//! use hostpulse::monitor::RingBuffer;
//!
//! let mut history = RingBuffer::new(3);
//! for v in [40, 45, 50, 55] {
//!     history.push(v);
//! }
//! assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![45, 50, 55]);
//! assert_eq!(history.latest(), Some(&55));
//! ```

use std::collections::VecDeque;

/// Fixed-capacity buffer that keeps the most recent `capacity` values.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer.
    ///
    /// # Panics
    ///
    /// Panics if capacity is 0. Configured capacities are rejected by
    /// `Config::validate` before any buffer is built.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be greater than 0");
        Self { data: VecDeque::with_capacity(capacity), capacity }
    }

    /// Appends a value, discarding the oldest one when full.
    pub fn push(&mut self, value: T) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(value);
    }

    /// Most recent value.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.data.back()
    }

    /// Number of values held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true when nothing has been pushed since creation or the last
    /// clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maximum number of values held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.data.iter()
    }

    /// Drops every value. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}
