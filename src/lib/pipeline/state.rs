//! Shared state of one pipeline run.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::batch::Batch;
use super::cancel::CancelToken;
use super::queue::StageQueue;
use super::stats::StatusSnapshot;
use crate::errors::{ClosedQueueError, PipelineError, Result};

/// Lifecycle of a run: `Idle -> Running -> Draining -> Completed`, or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PipelinePhase {
    /// Not started.
    Idle = 0,
    /// Loader still reading.
    Running = 1,
    /// Source exhausted; workers and Writer finishing.
    Draining = 2,
    /// Every batch was written.
    Completed = 3,
    /// A stage failed or the run was cancelled.
    Failed = 4,
}

impl PipelinePhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Draining,
            3 => Self::Completed,
            _ => Self::Failed,
        }
    }

    /// Whether the run has finished.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Advisory counters updated with atomic increments.
#[derive(Debug, Default)]
pub struct PipelineCounters {
    /// Items pulled from the source.
    pub read: AtomicU64,
    /// Items skipped by the Loader.
    pub dropped: AtomicU64,
    /// Items placed into batches.
    pub loaded: AtomicU64,
    /// Batches created.
    pub batches: AtomicU64,
    /// Items computed by workers.
    pub computed: AtomicU64,
    /// Items written.
    pub written: AtomicU64,
}

impl PipelineCounters {
    pub(crate) fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Queues, counters and the failure latch shared by every stage of one run.
///
/// Created when a run starts and dropped when it returns. The queues are the
/// only structures through which stages exchange data.
pub struct PipelineState<In, Out> {
    pub(crate) load_queue: StageQueue<Batch<In>>,
    pub(crate) write_queue: StageQueue<Batch<Out>>,
    pub(crate) counters: PipelineCounters,
    pub(crate) cancel: CancelToken,
    active_workers: AtomicUsize,
    phase: AtomicU8,
    error: Mutex<Option<PipelineError>>,
}

impl<In, Out> PipelineState<In, Out> {
    pub(crate) fn new(capacity: usize, workers: usize, cancel: CancelToken) -> Self {
        Self {
            load_queue: StageQueue::new("load", capacity).with_cancel(cancel.clone()),
            write_queue: StageQueue::new("write", capacity).with_cancel(cancel.clone()),
            counters: PipelineCounters::default(),
            cancel,
            active_workers: AtomicUsize::new(workers),
            phase: AtomicU8::new(PipelinePhase::Idle as u8),
            error: Mutex::new(None),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PipelinePhase {
        PipelinePhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set_phase(&self, phase: PipelinePhase) {
        // Failed is sticky.
        let _ = self.phase.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            (current != PipelinePhase::Failed as u8).then_some(phase as u8)
        });
    }

    /// Latch `error` if it is the first, mark the run failed and close every queue.
    pub(crate) fn fail(&self, error: PipelineError) {
        {
            let mut slot = self.error.lock();
            if slot.is_none() {
                log::debug!("Pipeline failing: {error}");
                *slot = Some(error);
            }
        }
        self.phase.store(PipelinePhase::Failed as u8, Ordering::Release);
        self.load_queue.close();
        self.write_queue.close();
    }

    /// Whether a stage has failed.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.error.lock().is_some()
    }

    pub(crate) fn take_error(&self) -> Option<PipelineError> {
        self.error.lock().take()
    }

    /// `Err(Cancelled)` once cancellation has been requested.
    pub(crate) fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() { Err(PipelineError::Cancelled) } else { Ok(()) }
    }

    /// `Err(Cancelled)` once cancelled, `Ok(true)` once another stage has failed.
    pub(crate) fn stop_requested(&self) -> Result<bool> {
        self.check_cancelled()?;
        Ok(self.has_failed())
    }

    /// The error to report when a queue operation was refused.
    pub(crate) fn refused(&self, error: ClosedQueueError) -> PipelineError {
        if self.cancel.is_cancelled() { PipelineError::Cancelled } else { PipelineError::ClosedQueue(error) }
    }

    /// Record a worker exit; the last one closes the write queue.
    pub(crate) fn worker_exited(&self) {
        if self.active_workers.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.write_queue.close();
        }
    }

    /// Sample counters and queue depths.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            phase: self.phase(),
            loaded: PipelineCounters::get(&self.counters.loaded),
            computed: PipelineCounters::get(&self.counters.computed),
            written: PipelineCounters::get(&self.counters.written),
            load_queue: self.load_queue.len(),
            write_queue: self.write_queue.len(),
        }
    }
}
