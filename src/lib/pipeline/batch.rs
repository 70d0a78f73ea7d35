//! The unit of transfer between pipeline stages.

/// An ordered group of items tagged with the sequence number the Loader assigned.
///
/// Sequence numbers start at 0 and increase by one per batch with no gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T> {
    serial: u64,
    items: Vec<T>,
}

impl<T> Batch<T> {
    /// Wrap `items` under `serial`.
    #[must_use]
    pub fn new(serial: u64, items: Vec<T>) -> Self {
        Self { serial, items }
    }

    /// The batch's sequence number.
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// The items, in load order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Split into sequence number and items.
    #[must_use]
    pub fn into_parts(self) -> (u64, Vec<T>) {
        (self.serial, self.items)
    }
}
