//! Final and periodic pipeline statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::PipelinePhase;
use crate::logging::format_count;

/// Counts reported when a run finishes.
///
/// On success `loaded == computed == written` and `read == loaded + dropped`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Overlaps pulled from the source.
    pub read: u64,
    /// Overlaps skipped under [`super::RangePolicy::Drop`].
    pub dropped: u64,
    /// Overlaps placed into batches.
    pub loaded: u64,
    /// Overlaps transformed by workers.
    pub computed: u64,
    /// Overlaps handed to the sink.
    pub written: u64,
    /// Batches created by the Loader.
    pub batches: u64,
    /// Worker threads used.
    pub workers: usize,
    /// Largest load queue depth, in batches.
    pub peak_load_queue: usize,
    /// Largest write queue depth, in batches.
    pub peak_write_queue: usize,
    /// Largest number of batches held back by the Writer waiting for an earlier one.
    pub peak_reorder_backlog: usize,
    /// Time the Loader spent throttled by the load queue.
    pub loader_blocked_ms: u64,
    /// Wall time of the run in seconds.
    pub elapsed_secs: f64,
}

impl PipelineStats {
    /// Whether every loaded overlap was computed and written, and every read one
    /// was either loaded or dropped.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        self.loaded == self.computed && self.computed == self.written && self.read == self.loaded + self.dropped
    }
}

/// One sample taken by the status thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Current phase.
    pub phase: PipelinePhase,
    /// Overlaps loaded so far.
    pub loaded: u64,
    /// Overlaps computed so far.
    pub computed: u64,
    /// Overlaps written so far.
    pub written: u64,
    /// Batches in the load queue.
    pub load_queue: usize,
    /// Batches in the write queue.
    pub write_queue: usize,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] loaded {} / computed {} / written {}; queues load={} write={}",
            self.phase,
            format_count(self.loaded),
            format_count(self.computed),
            format_count(self.written),
            self.load_queue,
            self.write_queue
        )
    }
}
