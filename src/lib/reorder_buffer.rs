//! Reordering buffer for batches that complete out of order.
//!
//! Items are inserted with their sequence number and released strictly in
//! sequence order. The Writer uses it to restore input order after parallel
//! workers finish batches in arbitrary order.
//!
//! # Example
//!
//! ```
//! use ovlpipe_lib::reorder_buffer::ReorderBuffer;
//!
//! let mut buffer: ReorderBuffer<&str> = ReorderBuffer::new();
//! buffer.insert(2, "third").unwrap();
//! buffer.insert(0, "first").unwrap();
//! assert_eq!(buffer.try_pop_next(), Some("first"));
//! assert_eq!(buffer.try_pop_next(), None); // 1 is missing
//! buffer.insert(1, "second").unwrap();
//! assert_eq!(buffer.drain_ready().collect::<Vec<_>>(), vec!["second", "third"]);
//! ```

use std::collections::VecDeque;

use thiserror::Error;

/// A sequence number the buffer cannot accept.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderError {
    /// The sequence number is already buffered
    #[error("duplicate sequence number {0}")]
    Duplicate(u64),
    /// The sequence number was already released
    #[error("sequence number {seq} was already released (next is {next})")]
    Stale {
        /// The rejected sequence number
        seq: u64,
        /// The next sequence number the buffer will release
        next: u64,
    },
}

/// Releases items in sequence-number order with no gaps.
///
/// Slot `i` of the sparse deque holds sequence number `next_seq + i`, so both
/// insert and pop are O(1) amortized.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    slots: VecDeque<Option<T>>,
    next_seq: u64,
    count: usize,
    peak: usize,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReorderBuffer<T> {
    /// An empty buffer expecting sequence number 0.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: VecDeque::new(), next_seq: 0, count: 0, peak: 0 }
    }

    /// Buffer `item` under `seq`.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError`] if `seq` was already released or is already buffered.
    pub fn insert(&mut self, seq: u64, item: T) -> Result<(), ReorderError> {
        if seq < self.next_seq {
            return Err(ReorderError::Stale { seq, next: self.next_seq });
        }
        let index = usize::try_from(seq - self.next_seq).map_err(|_| ReorderError::Stale { seq, next: self.next_seq })?;
        if self.slots.len() <= index {
            self.slots.resize_with(index + 1, || None);
        }
        let slot = &mut self.slots[index];
        if slot.is_some() {
            return Err(ReorderError::Duplicate(seq));
        }
        *slot = Some(item);
        self.count += 1;
        self.peak = self.peak.max(self.count);
        Ok(())
    }

    /// Release the item with the next sequence number, if it has arrived.
    #[must_use]
    pub fn try_pop_next(&mut self) -> Option<T> {
        if !self.can_pop() {
            return None;
        }
        let item = self.slots.pop_front().flatten()?;
        self.next_seq += 1;
        self.count -= 1;
        Some(item)
    }

    /// Release every consecutive ready item.
    pub fn drain_ready(&mut self) -> DrainReady<'_, T> {
        DrainReady { buffer: self }
    }

    /// Whether the next sequence number has arrived.
    #[must_use]
    pub fn can_pop(&self) -> bool {
        self.slots.front().is_some_and(Option::is_some)
    }

    /// Number of buffered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no items are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Largest number of items buffered at once.
    #[must_use]
    pub fn peak_len(&self) -> usize {
        self.peak
    }

    /// The next sequence number to be released.
    #[must_use]
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }
}

/// Iterator returned by [`ReorderBuffer::drain_ready`].
pub struct DrainReady<'a, T> {
    buffer: &'a mut ReorderBuffer<T>,
}

impl<T> Iterator for DrainReady<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.buffer.try_pop_next()
    }
}
