//! Per-record transforms applied by the workers.
//!
//! A transform is pure: it sees one record plus the read-only length lookup and
//! returns the replacement record. Errors are fatal to the run.

use ovlpipe_record::{OverlapLayout, OverlapRecord};

use crate::errors::Result;
use crate::lookup::{ReadLengthLookup, require_read_length};

/// Maps one record to its replacement.
pub trait OverlapTransform<L: OverlapLayout>: Sync {
    /// Transform `record`.
    ///
    /// # Errors
    ///
    /// Any error aborts the run.
    fn apply(&self, record: OverlapRecord<L>, lookup: &dyn ReadLengthLookup) -> Result<OverlapRecord<L>>;
}

impl<L, F> OverlapTransform<L> for F
where
    L: OverlapLayout,
    F: Fn(OverlapRecord<L>, &dyn ReadLengthLookup) -> Result<OverlapRecord<L>> + Sync,
{
    fn apply(&self, record: OverlapRecord<L>, lookup: &dyn ReadLengthLookup) -> Result<OverlapRecord<L>> {
        self(record, lookup)
    }
}

/// Returns every record unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl<L: OverlapLayout> OverlapTransform<L> for Passthrough {
    fn apply(&self, record: OverlapRecord<L>, _lookup: &dyn ReadLengthLookup) -> Result<OverlapRecord<L>> {
        Ok(record)
    }
}

/// Re-expresses every overlap from read B's point of view.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapIds;

impl<L: OverlapLayout> OverlapTransform<L> for SwapIds {
    fn apply(&self, record: OverlapRecord<L>, _lookup: &dyn ReadLengthLookup) -> Result<OverlapRecord<L>> {
        Ok(record.swapped())
    }
}

/// Sets the trim, dedup and graph usage tags on overlaps that are accurate and
/// long enough, and clears them on the rest.
///
/// An overlap passes when its error fraction is at most `max_erate` and it
/// covers at least `min_overlap_len` bases of read A.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageFilter {
    /// Largest accepted error fraction.
    pub max_erate: f64,
    /// Smallest accepted aligned length on read A.
    pub min_overlap_len: u32,
}

impl UsageFilter {
    /// A filter with the given thresholds.
    #[must_use]
    pub fn new(max_erate: f64, min_overlap_len: u32) -> Self {
        Self { max_erate, min_overlap_len }
    }

    /// Whether `record` passes, given the length of its A read.
    #[must_use]
    pub fn accepts<L: OverlapLayout>(&self, record: &OverlapRecord<L>, a_len: u32) -> bool {
        record.erate() <= self.max_erate && record.a_aligned_len(a_len) >= self.min_overlap_len
    }
}

impl Default for UsageFilter {
    /// 4.5% error and 500 bases.
    fn default() -> Self {
        Self::new(0.045, 500)
    }
}

impl<L: OverlapLayout> OverlapTransform<L> for UsageFilter {
    fn apply(&self, mut record: OverlapRecord<L>, lookup: &dyn ReadLengthLookup) -> Result<OverlapRecord<L>> {
        let a_len = require_read_length(lookup, record.a_id())?;
        let keep = self.accepts(&record, a_len);
        record.set_for_trim(keep);
        record.set_for_dedup(keep);
        record.set_for_graph(keep);
        Ok(record)
    }
}

/// Applies `first`, then `second`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    /// Compose two transforms.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<L, A, B> OverlapTransform<L> for Chain<A, B>
where
    L: OverlapLayout,
    A: OverlapTransform<L>,
    B: OverlapTransform<L>,
{
    fn apply(&self, record: OverlapRecord<L>, lookup: &dyn ReadLengthLookup) -> Result<OverlapRecord<L>> {
        let record = self.first.apply(record, lookup)?;
        self.second.apply(record, lookup)
    }
}
