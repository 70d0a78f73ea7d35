//! The generic three-stage engine: one Loader, N workers and one Writer.
//!
//! ```text
//!  load() ──► Loader ──► [load queue] ──► Worker × N ──► [write queue] ──► Writer ──► write()
//!                 ▲                                                           │
//!                 └── high/low watermark on load queue length     ReorderBuffer (by serial)
//! ```
//!
//! Each role runs on its own scoped thread. The Loader numbers batches from 0,
//! workers transform them in any order, and the Writer releases them strictly
//! by sequence number. The first error (or a panic, or cancellation) latches
//! into the shared state, which closes both queues so every role unwinds.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, bounded};

use super::batch::Batch;
use super::cancel::CancelToken;
use super::config::PipelineConfig;
use super::state::{PipelineCounters, PipelinePhase, PipelineState};
use super::stats::PipelineStats;
use crate::errors::{ClosedQueueError, PipelineError, Result};
use crate::logging::{OperationTimer, log_pipeline_summary};
use crate::progress::ProgressTracker;
use crate::reorder_buffer::ReorderBuffer;

/// One step of the Loader's input.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    /// An item to place in the current batch.
    Item(T),
    /// An input that was read but skipped.
    Dropped,
    /// The input is exhausted.
    Exhausted,
}

/// Extract a readable message from a panic payload.
#[must_use]
pub fn extract_panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `body` for `role`, latching its error or panic into `state`.
fn guarded<In, Out>(state: &PipelineState<In, Out>, role: &str, body: impl FnOnce() -> Result<()>) {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => state.fail(error),
        Err(payload) => {
            let message = extract_panic_message(payload);
            log::error!("{role} thread panicked: {message}");
            state.fail(PipelineError::WorkerPanic { role: role.to_string(), message });
        }
    }
}

fn run_loader<In, Out, Load>(state: &PipelineState<In, Out>, config: &PipelineConfig, mut load: Load) -> Result<()>
where
    Load: FnMut() -> Result<LoadOutcome<In>>,
{
    let queue = &state.load_queue;
    let mut serial = 0u64;
    let mut items = Vec::with_capacity(config.batch_size);
    let mut exhausted = false;

    while !exhausted {
        if state.stop_requested()? {
            return Ok(());
        }
        // Reads only resume once the queue has drained to the low watermark.
        if queue.len() >= config.high_watermark {
            log::trace!("Loader throttled at {} queued batches", queue.len());
            if !queue.wait_until_len_at_most(config.low_watermark) {
                return if state.has_failed() {
                    Ok(())
                } else {
                    Err(state.refused(ClosedQueueError { queue: queue.name() }))
                };
            }
        }

        while items.len() < config.batch_size {
            match load()? {
                LoadOutcome::Item(item) => {
                    PipelineCounters::add(&state.counters.read, 1);
                    items.push(item);
                }
                LoadOutcome::Dropped => {
                    PipelineCounters::add(&state.counters.read, 1);
                    PipelineCounters::add(&state.counters.dropped, 1);
                }
                LoadOutcome::Exhausted => {
                    exhausted = true;
                    break;
                }
            }
        }

        if !items.is_empty() {
            let full = std::mem::replace(&mut items, Vec::with_capacity(config.batch_size));
            let count = full.len();
            queue.push(Batch::new(serial, full)).map_err(|e| state.refused(e))?;
            PipelineCounters::add(&state.counters.loaded, count);
            PipelineCounters::add(&state.counters.batches, 1);
            serial += 1;
        }
    }

    log::debug!("Loader finished after {serial} batches");
    state.set_phase(PipelinePhase::Draining);
    queue.close();
    Ok(())
}

fn run_worker<In, Out, Compute>(
    state: &PipelineState<In, Out>,
    config: &PipelineConfig,
    id: usize,
    compute: &Compute,
) -> Result<()>
where
    Compute: Fn(In) -> Result<Out>,
{
    while let Some(batch) = state.load_queue.pop() {
        if state.stop_requested()? {
            return Ok(());
        }
        let started = Instant::now();
        let (serial, items) = batch.into_parts();
        let out = items.into_iter().map(compute).collect::<Result<Vec<Out>>>()?;
        if let Some(deadline) = config.batch_deadline {
            let elapsed = started.elapsed();
            if elapsed > deadline {
                log::warn!("Worker {id} took {elapsed:?} on batch {serial} (deadline {deadline:?})");
            }
        }
        PipelineCounters::add(&state.counters.computed, out.len());
        state.write_queue.push(Batch::new(serial, out)).map_err(|e| state.refused(e))?;
    }
    state.check_cancelled()
}

fn run_writer<In, Out, Write>(
    state: &PipelineState<In, Out>,
    config: &PipelineConfig,
    write: &mut Write,
    reorder: &mut ReorderBuffer<Batch<Out>>,
) -> Result<()>
where
    Write: FnMut(&Batch<Out>) -> Result<()>,
{
    let progress = config.progress_interval.map(|n| ProgressTracker::new("Wrote overlaps").with_interval(n));

    while let Some(batch) = state.write_queue.pop() {
        if state.stop_requested()? {
            return Ok(());
        }
        reorder.insert(batch.serial(), batch).map_err(|e| PipelineError::Protocol(e.to_string()))?;
        while let Some(ready) = reorder.try_pop_next() {
            // Only whole batches reach the sink.
            if state.stop_requested()? {
                return Ok(());
            }
            write(&ready)?;
            PipelineCounters::add(&state.counters.written, ready.len());
            if let Some(progress) = &progress {
                progress.record(ready.len() as u64);
            }
        }
    }
    state.check_cancelled()?;
    if state.has_failed() {
        return Ok(());
    }
    if !reorder.is_empty() {
        return Err(PipelineError::Protocol(format!(
            "{} batches never released; batch {} is missing",
            reorder.len(),
            reorder.next_seq()
        )));
    }
    if let Some(progress) = &progress {
        progress.log_final();
    }
    Ok(())
}

fn run_status<In, Out>(state: &PipelineState<In, Out>, interval: Duration, stop: &crossbeam_channel::Receiver<()>) {
    loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => log::info!("{}", state.snapshot()),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Run the three stages to completion.
///
/// * `load` is called repeatedly by the Loader until it returns
///   [`LoadOutcome::Exhausted`].
/// * `compute` is called by the workers on every item, possibly concurrently.
/// * `write` is called by the Writer with whole batches in sequence order.
///
/// Returns the final statistics, or the first error any stage reported.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] for an invalid configuration,
/// [`PipelineError::Cancelled`] if `cancel` fires, [`PipelineError::WorkerPanic`]
/// if a stage panics, and otherwise the first error returned by a closure.
pub fn run_stages<In, Out, Load, Compute, Write>(
    config: &PipelineConfig,
    cancel: &CancelToken,
    load: Load,
    compute: Compute,
    mut write: Write,
) -> Result<PipelineStats>
where
    In: Send,
    Out: Send,
    Load: FnMut() -> Result<LoadOutcome<In>> + Send,
    Compute: Fn(In) -> Result<Out> + Sync,
    Write: FnMut(&Batch<Out>) -> Result<()> + Send,
{
    config.validate()?;
    let workers = config.worker_count;
    let state: PipelineState<In, Out> = PipelineState::new(config.queue_capacity, workers, cancel.clone());
    state.check_cancelled()?;

    let timer = OperationTimer::new(&format!("Running overlap pipeline with {workers} workers"));
    state.set_phase(PipelinePhase::Running);
    let mut reorder = ReorderBuffer::new();

    thread::scope(|s| {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let status = config.status_interval.map(|interval| {
            let state = &state;
            s.spawn(move || run_status(state, interval, &stop_rx))
        });

        let loader = s.spawn(|| guarded(&state, "loader", || run_loader(&state, config, load)));
        let compute = &compute;
        let worker_handles: Vec<_> = (0..workers)
            .map(|id| {
                let state = &state;
                s.spawn(move || {
                    guarded(state, &format!("worker {id}"), || run_worker(state, config, id, compute));
                    state.worker_exited();
                })
            })
            .collect();
        guarded(&state, "writer", || run_writer(&state, config, &mut write, &mut reorder));

        // Panics are caught inside each role, so joins only fail on a bug here.
        for handle in worker_handles.into_iter().chain(std::iter::once(loader)) {
            if handle.join().is_err() {
                state.fail(PipelineError::WorkerPanic { role: "stage".to_string(), message: "join failed".to_string() });
            }
        }
        drop(stop_tx);
        if let Some(handle) = status {
            let _ = handle.join();
        }
    });

    let load_stats = state.load_queue.stats();
    let write_stats = state.write_queue.stats();
    let counters = &state.counters;
    let stats = PipelineStats {
        read: PipelineCounters::get(&counters.read),
        dropped: PipelineCounters::get(&counters.dropped),
        loaded: PipelineCounters::get(&counters.loaded),
        computed: PipelineCounters::get(&counters.computed),
        written: PipelineCounters::get(&counters.written),
        batches: PipelineCounters::get(&counters.batches),
        workers,
        peak_load_queue: load_stats.peak_len,
        peak_write_queue: write_stats.peak_len,
        peak_reorder_backlog: reorder.peak_len(),
        loader_blocked_ms: u64::try_from(load_stats.push_blocked.as_millis()).unwrap_or(u64::MAX),
        elapsed_secs: timer.elapsed().as_secs_f64(),
    };

    if let Some(error) = state.take_error() {
        log::error!("Overlap pipeline failed after writing {} overlaps: {error}", stats.written);
        return Err(error);
    }
    if !stats.is_conserved() {
        state.set_phase(PipelinePhase::Failed);
        return Err(PipelineError::Protocol(format!(
            "counts disagree: loaded {} computed {} written {}",
            stats.loaded, stats.computed, stats.written
        )));
    }
    state.set_phase(PipelinePhase::Completed);
    timer.log_completion(stats.written);
    log_pipeline_summary(&stats);
    Ok(stats)
}
