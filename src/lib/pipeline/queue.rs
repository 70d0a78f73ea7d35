//! Bounded FIFO queues between pipeline stages.
//!
//! A [`StageQueue`] holds at most `capacity` items. `push` blocks while full,
//! `pop` blocks while empty, and `close` turns the queue into end-of-stream
//! once it has drained. A queue built with a [`CancelToken`] also gives up on
//! any blocking operation shortly after cancellation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::cancel::CancelToken;
use crate::errors::ClosedQueueError;

/// How often blocked operations re-check the cancel token.
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Point-in-time statistics for one queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items currently queued.
    pub len: usize,
    /// Largest number of items queued at once.
    pub peak_len: usize,
    /// Total items accepted.
    pub pushed: u64,
    /// Total time producers spent blocked on a full queue or a watermark.
    pub push_blocked: Duration,
    /// Total time consumers spent blocked on an empty queue.
    pub pop_blocked: Duration,
}

struct QueueInner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Fixed-capacity, thread-safe FIFO with blocking push and pop.
pub struct StageQueue<T> {
    name: &'static str,
    capacity: usize,
    inner: Mutex<QueueInner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    cancel: Option<CancelToken>,
    peak_len: AtomicUsize,
    pushed: AtomicU64,
    push_blocked_ns: AtomicU64,
    pop_blocked_ns: AtomicU64,
}

impl<T> StageQueue<T> {
    /// A queue named `name` (used in errors and logs) holding at most `capacity` items.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            inner: Mutex::new(QueueInner { items: VecDeque::with_capacity(capacity), closed: false }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            cancel: None,
            peak_len: AtomicUsize::new(0),
            pushed: AtomicU64::new(0),
            push_blocked_ns: AtomicU64::new(0),
            pop_blocked_ns: AtomicU64::new(0),
        }
    }

    /// Make blocking operations return once `cancel` is cancelled.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Name given at construction.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Maximum number of queued items.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn wait(&self, condvar: &Condvar, guard: &mut MutexGuard<'_, QueueInner<T>>) {
        if self.cancel.is_some() {
            condvar.wait_for(guard, CANCEL_POLL);
        } else {
            condvar.wait(guard);
        }
    }

    fn add_blocked(counter: &AtomicU64, since: Option<Instant>) {
        if let Some(start) = since {
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            counter.fetch_add(nanos, Ordering::Relaxed);
        }
    }

    /// Enqueue `item`, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`ClosedQueueError`] if the queue is closed (or cancelled) before
    /// the item could be enqueued. The item is dropped.
    pub fn push(&self, item: T) -> Result<(), ClosedQueueError> {
        let mut inner = self.inner.lock();
        let mut blocked_since = None;
        while inner.items.len() >= self.capacity && !inner.closed && !self.is_cancelled() {
            blocked_since.get_or_insert_with(Instant::now);
            self.wait(&self.not_full, &mut inner);
        }
        Self::add_blocked(&self.push_blocked_ns, blocked_since);

        if inner.closed || self.is_cancelled() {
            return Err(ClosedQueueError { queue: self.name });
        }
        inner.items.push_back(item);
        self.peak_len.fetch_max(inner.items.len(), Ordering::Relaxed);
        self.pushed.fetch_add(1, Ordering::Relaxed);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained, or as soon as the
    /// queue's cancel token is cancelled.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        let mut blocked_since = None;
        loop {
            if self.is_cancelled() {
                Self::add_blocked(&self.pop_blocked_ns, blocked_since);
                return None;
            }
            if let Some(item) = inner.items.pop_front() {
                Self::add_blocked(&self.pop_blocked_ns, blocked_since);
                drop(inner);
                // Watermark waiters share this condvar with blocked producers.
                self.not_full.notify_all();
                return Some(item);
            }
            if inner.closed {
                Self::add_blocked(&self.pop_blocked_ns, blocked_since);
                return None;
            }
            blocked_since.get_or_insert_with(Instant::now);
            self.wait(&self.not_empty, &mut inner);
        }
    }

    /// Block until at most `threshold` items are queued.
    ///
    /// Returns `false` if the queue was closed or cancelled while waiting.
    pub fn wait_until_len_at_most(&self, threshold: usize) -> bool {
        let mut inner = self.inner.lock();
        let mut blocked_since = None;
        while inner.items.len() > threshold && !inner.closed && !self.is_cancelled() {
            blocked_since.get_or_insert_with(Instant::now);
            self.wait(&self.not_full, &mut inner);
        }
        Self::add_blocked(&self.push_blocked_ns, blocked_since);
        !inner.closed && !self.is_cancelled()
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Whether no items are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting items and wake every blocked caller. Idempotent.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Whether [`Self::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            len: self.len(),
            peak_len: self.peak_len.load(Ordering::Relaxed),
            pushed: self.pushed.load(Ordering::Relaxed),
            push_blocked: Duration::from_nanos(self.push_blocked_ns.load(Ordering::Relaxed)),
            pop_blocked: Duration::from_nanos(self.pop_blocked_ns.load(Ordering::Relaxed)),
        }
    }
}
