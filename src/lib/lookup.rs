//! Read-length lookup used by coordinate, score and filter derivations.
//!
//! The lookup is read-only for the lifetime of a run and shared by every
//! worker without locking.

use ahash::AHashMap;

use crate::errors::{PipelineError, Result};

/// Maps a read id to its length in bases.
pub trait ReadLengthLookup: Sync {
    /// Length of `read_id`, or `None` if the id is unknown.
    fn read_length(&self, read_id: u32) -> Option<u32>;
}

/// Look up a length, turning a miss into [`PipelineError::Lookup`].
///
/// # Errors
///
/// Returns [`PipelineError::Lookup`] if `read_id` is unknown.
pub fn require_read_length<R: ReadLengthLookup + ?Sized>(lookup: &R, read_id: u32) -> Result<u32> {
    lookup.read_length(read_id).ok_or(PipelineError::Lookup { read_id })
}

/// Dense lengths indexed by read id.
impl ReadLengthLookup for [u32] {
    fn read_length(&self, read_id: u32) -> Option<u32> {
        self.get(read_id as usize).copied()
    }
}

impl ReadLengthLookup for Vec<u32> {
    fn read_length(&self, read_id: u32) -> Option<u32> {
        self.as_slice().read_length(read_id)
    }
}

impl<R: ReadLengthLookup + ?Sized> ReadLengthLookup for &R {
    fn read_length(&self, read_id: u32) -> Option<u32> {
        (**self).read_length(read_id)
    }
}

/// Sparse lengths keyed by read id.
#[derive(Debug, Clone, Default)]
pub struct ReadLengths {
    lengths: AHashMap<u32, u32>,
}

impl ReadLengths {
    /// An empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the length of `read_id`, returning the previous length if any.
    pub fn insert(&mut self, read_id: u32, length: u32) -> Option<u32> {
        self.lengths.insert(read_id, length)
    }

    /// Number of reads with a known length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Whether no lengths are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

impl ReadLengthLookup for ReadLengths {
    fn read_length(&self, read_id: u32) -> Option<u32> {
        self.lengths.get(&read_id).copied()
    }
}

impl FromIterator<(u32, u32)> for ReadLengths {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self { lengths: iter.into_iter().collect() }
    }
}

impl Extend<(u32, u32)> for ReadLengths {
    fn extend<I: IntoIterator<Item = (u32, u32)>>(&mut self, iter: I) {
        self.lengths.extend(iter);
    }
}
