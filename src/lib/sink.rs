//! Sinks receiving ordered batches of transformed overlaps.

use std::io::{self, Write};

use ovlpipe_record::{DisplayOverlap, OverlapDisplay, OverlapLayout, OverlapRecord};

use crate::lookup::ReadLengthLookup;

/// Receives whole batches in sequence order from the Writer.
pub trait OverlapSink<L: OverlapLayout>: Send {
    /// Accept one batch.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the run.
    fn write_batch(&mut self, records: &[OverlapRecord<L>]) -> io::Result<()>;

    /// Called once after the last batch of a successful run.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the run.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<L: OverlapLayout> OverlapSink<L> for Vec<OverlapRecord<L>> {
    fn write_batch(&mut self, records: &[OverlapRecord<L>]) -> io::Result<()> {
        self.extend_from_slice(records);
        Ok(())
    }
}

impl<L: OverlapLayout, K: OverlapSink<L> + ?Sized> OverlapSink<L> for Box<K> {
    fn write_batch(&mut self, records: &[OverlapRecord<L>]) -> io::Result<()> {
        (**self).write_batch(records)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Writes one text line per overlap in an [`OverlapDisplay`] style.
///
/// Styles that print coordinates need a read-length lookup, supplied with
/// [`DisplaySink::with_lengths`].
pub struct DisplaySink<'a, W: Write> {
    writer: W,
    style: OverlapDisplay,
    lengths: Option<&'a dyn ReadLengthLookup>,
}

impl<'a, W: Write + Send> DisplaySink<'a, W> {
    /// A sink writing `style` lines to `writer`.
    pub fn new(writer: W, style: OverlapDisplay) -> Self {
        Self { writer, style, lengths: None }
    }

    /// Use `lengths` for styles that print coordinates.
    #[must_use]
    pub fn with_lengths(mut self, lengths: &'a dyn ReadLengthLookup) -> Self {
        self.lengths = Some(lengths);
        self
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn lengths_for<L: OverlapLayout>(&self, record: &OverlapRecord<L>) -> io::Result<Option<(u32, u32)>> {
        let Some(lookup) = self.lengths else {
            return if self.style.needs_lengths() {
                Err(io::Error::new(io::ErrorKind::InvalidInput, format!("{:?} output needs read lengths", self.style)))
            } else {
                Ok(None)
            };
        };
        let length = |id: u32| {
            lookup
                .read_length(id)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no read length for read {id}")))
        };
        Ok(Some((length(record.a_id())?, length(record.b_id())?)))
    }
}

impl<L: OverlapLayout, W: Write + Send> OverlapSink<L> for DisplaySink<'_, W> {
    fn write_batch(&mut self, records: &[OverlapRecord<L>]) -> io::Result<()> {
        for record in records {
            let lengths = self.lengths_for(record)?;
            // Lengths are always present for styles that need them.
            if let Some(line) = DisplayOverlap::new(record, self.style, lengths) {
                writeln!(self.writer, "{line}")?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
