//! The raw overlap source feeding the Loader.

use std::io;

use ovlpipe_record::OverlapFields;

/// One overlap as produced by an aligner, before packing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawOverlap {
    /// Id of read A.
    pub a_id: u32,
    /// Id of read B.
    pub b_id: u32,
    /// Bases of A before the alignment.
    pub ahg5: u32,
    /// Bases of A after the alignment.
    pub ahg3: u32,
    /// Bases of B before the alignment.
    pub bhg5: u32,
    /// Bases of B after the alignment.
    pub bhg3: u32,
    /// Alignment length, zero when unknown.
    pub span: u32,
    /// Error fraction.
    pub erate: f64,
    /// B is reverse-complemented relative to A.
    pub flipped: bool,
}

impl RawOverlap {
    /// The logical record fields, with every usage tag cleared.
    #[must_use]
    pub fn to_fields(&self) -> OverlapFields {
        OverlapFields {
            a_id: self.a_id,
            b_id: self.b_id,
            ahg5: self.ahg5,
            ahg3: self.ahg3,
            bhg5: self.bhg5,
            bhg3: self.bhg3,
            span: self.span,
            erate: self.erate,
            flipped: self.flipped,
            ..OverlapFields::default()
        }
    }
}

/// A finite, non-restartable stream of raw overlaps.
pub trait OverlapSource: Send {
    /// The next overlap, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Any I/O error is fatal to the run.
    fn next_overlap(&mut self) -> io::Result<Option<RawOverlap>>;
}

/// Adapts an iterator of fallible overlaps into an [`OverlapSource`].
#[derive(Debug)]
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = io::Result<RawOverlap>> + Send,
{
    /// Wrap `iter`.
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I> OverlapSource for IterSource<I>
where
    I: Iterator<Item = io::Result<RawOverlap>> + Send,
{
    fn next_overlap(&mut self) -> io::Result<Option<RawOverlap>> {
        self.iter.next().transpose()
    }
}

/// A source over overlaps already in memory.
pub fn from_overlaps(
    overlaps: impl IntoIterator<Item = RawOverlap, IntoIter: Send>,
) -> IterSource<impl Iterator<Item = io::Result<RawOverlap>> + Send> {
    IterSource::new(overlaps.into_iter().map(Ok))
}

impl<S: OverlapSource + ?Sized> OverlapSource for Box<S> {
    fn next_overlap(&mut self) -> io::Result<Option<RawOverlap>> {
        (**self).next_overlap()
    }
}
