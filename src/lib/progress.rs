//! Interval progress logging shared by pipeline stages.
//!
//! A [`ProgressTracker`] keeps an atomic count and logs one line each time the
//! count crosses a multiple of its interval, including the rate since the
//! tracker was created.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::info;

use crate::logging::{format_count, format_rate};

/// Thread-safe interval progress logger.
///
/// ```
/// use ovlpipe_lib::progress::ProgressTracker;
///
/// let tracker = ProgressTracker::new("Wrote overlaps").with_interval(100);
/// for _ in 0..25 {
///     tracker.record(10); // logs at 100 and 200
/// }
/// tracker.log_final(); // logs "Wrote overlaps 250 (complete)"
/// assert_eq!(tracker.count(), 250);
/// ```
#[derive(Debug)]
pub struct ProgressTracker {
    message: String,
    interval: u64,
    count: AtomicU64,
    start: Instant,
}

impl ProgressTracker {
    /// Default number of items between log lines.
    pub const DEFAULT_INTERVAL: u64 = 1_000_000;

    /// A tracker with the default interval.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            interval: Self::DEFAULT_INTERVAL,
            count: AtomicU64::new(0),
            start: Instant::now(),
        }
    }

    /// Set the interval; zero is treated as one.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Add `additional` items and log once for every interval boundary crossed.
    ///
    /// Returns `true` if the new count lies exactly on a boundary.
    pub fn record(&self, additional: u64) -> bool {
        let prev = self.count.fetch_add(additional, Ordering::Relaxed);
        let now = prev + additional;
        for milestone in (prev / self.interval + 1)..=(now / self.interval) {
            let reached = milestone * self.interval;
            info!("{} {} ({})", self.message, format_count(reached), format_rate(reached, self.start.elapsed()));
        }
        now > 0 && now.is_multiple_of(self.interval)
    }

    /// Log the final count unless the last [`Self::record`] already did.
    pub fn log_final(&self) {
        let count = self.count();
        if count > 0 && !count.is_multiple_of(self.interval) {
            info!("{} {} (complete)", self.message, format_count(count));
        }
    }

    /// Items recorded so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
