//! Test overlap sinks.

#![allow(dead_code)]

use std::io;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use ovlpipe_lib::sink::OverlapSink;
use ovlpipe_record::{OverlapLayout, OverlapRecord};

/// Collects records and remembers each batch size and whether it was flushed.
#[derive(Debug)]
pub struct RecordingSink<L: OverlapLayout> {
    pub records: Vec<OverlapRecord<L>>,
    pub batch_sizes: Vec<usize>,
    pub flushed: bool,
    delay: Duration,
}

impl<L: OverlapLayout> RecordingSink<L> {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// Sleep for `delay` on every batch.
    pub fn with_delay(delay: Duration) -> Self {
        Self { records: Vec::new(), batch_sizes: Vec::new(), flushed: false, delay }
    }

    pub fn a_ids(&self) -> Vec<u32> {
        self.records.iter().map(OverlapRecord::a_id).collect()
    }
}

impl<L: OverlapLayout> OverlapSink<L> for RecordingSink<L> {
    fn write_batch(&mut self, records: &[OverlapRecord<L>]) -> io::Result<()> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.records.extend_from_slice(records);
        self.batch_sizes.push(records.len());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushed = true;
        Ok(())
    }
}

/// Fails on the batch with index `fail_at`.
#[derive(Debug)]
pub struct FailingSink {
    fail_at: usize,
    pub batches_written: usize,
}

impl FailingSink {
    pub fn new(fail_at: usize) -> Self {
        Self { fail_at, batches_written: 0 }
    }
}

impl<L: OverlapLayout> OverlapSink<L> for FailingSink {
    fn write_batch(&mut self, _records: &[OverlapRecord<L>]) -> io::Result<()> {
        if self.batches_written == self.fail_at {
            return Err(io::Error::other("disk full"));
        }
        self.batches_written += 1;
        Ok(())
    }
}

/// Blocks inside its first write until released.
///
/// Announces on `entered` when the first write begins and waits on `release`.
pub struct GateSink<L: OverlapLayout> {
    entered: Sender<()>,
    release: Receiver<()>,
    opened: bool,
    pub records: Vec<OverlapRecord<L>>,
}

impl<L: OverlapLayout> GateSink<L> {
    pub fn new(entered: Sender<()>, release: Receiver<()>) -> Self {
        Self { entered, release, opened: false, records: Vec::new() }
    }
}

impl<L: OverlapLayout> OverlapSink<L> for GateSink<L> {
    fn write_batch(&mut self, records: &[OverlapRecord<L>]) -> io::Result<()> {
        if !self.opened {
            self.opened = true;
            let _ = self.entered.send(());
            self.release.recv().map_err(io::Error::other)?;
        }
        self.records.extend_from_slice(records);
        Ok(())
    }
}
