//! Human-readable formatting helpers and run summaries for log output.

use std::time::{Duration, Instant};

use crate::pipeline::PipelineStats;

/// Formats a count with thousands separators.
///
/// ```
/// use ovlpipe_lib::logging::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a fraction (0.0-1.0) as a percentage with `decimals` places.
///
/// ```
/// use ovlpipe_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0)
}

/// Formats a duration as e.g. "45s", "2m 15s" or "1h 30m".
///
/// Durations under a second are reported in milliseconds.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return format!("{}ms", duration.as_millis());
    }
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let (mins, rem) = (secs / 60, secs % 60);
        if rem == 0 { format!("{mins}m") } else { format!("{mins}m {rem}s") }
    } else {
        let (hours, mins) = (secs / 3600, (secs % 3600) / 60);
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a throughput in overlaps per second (or per minute when slow).
#[must_use]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} overlaps/s", format_count(count));
    }
    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} overlaps/s", format_count(rate as u64))
    } else {
        format!("{:.1} overlaps/min", rate * 60.0)
    }
}

/// Logs the final counters of a pipeline run.
pub fn log_pipeline_summary(stats: &PipelineStats) {
    log::info!("Overlap Pipeline Summary:");
    log::info!("  Overlaps read: {}", format_count(stats.read));
    log::info!("  Overlaps loaded: {}", format_count(stats.loaded));
    if stats.dropped > 0 {
        let frac = stats.dropped as f64 / stats.read.max(1) as f64;
        log::info!("  Dropped out of range: {} ({})", format_count(stats.dropped), format_percent(frac, 2));
    }
    log::info!("  Overlaps computed: {}", format_count(stats.computed));
    log::info!("  Overlaps written: {}", format_count(stats.written));
    log::info!(
        "  Batches: {} across {} workers, peak reorder backlog {}",
        format_count(stats.batches),
        stats.workers,
        stats.peak_reorder_backlog
    );
    log::info!(
        "  Peak queue depth: load {} / write {}; loader blocked {}",
        stats.peak_load_queue,
        stats.peak_write_queue,
        format_duration(Duration::from_millis(stats.loader_blocked_ms))
    );
    let elapsed = Duration::from_secs_f64(stats.elapsed_secs);
    log::info!("  Elapsed: {} ({})", format_duration(elapsed), format_rate(stats.written, elapsed));
}

/// Times an operation and logs its completion with a rate.
///
/// ```
/// use ovlpipe_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Scoring overlaps");
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    /// Starts the timer and logs the start of the operation.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start: Instant::now() }
    }

    /// Time since the timer was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Logs completion with an item count and rate.
    pub fn log_completion(&self, count: u64) {
        let elapsed = self.elapsed();
        log::info!(
            "{} completed: {} in {} ({})",
            self.operation,
            format_count(count),
            format_duration(elapsed),
            format_rate(count, elapsed)
        );
    }
}
