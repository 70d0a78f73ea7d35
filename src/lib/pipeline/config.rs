//! Pipeline configuration.

use std::thread;
use std::time::Duration;

use ovlpipe_record::Profile;

use crate::errors::ConfigError;

/// What the Loader does with an overlap that cannot be encoded under the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangePolicy {
    /// Skip the overlap and count it in [`super::PipelineStats::dropped`].
    #[default]
    Drop,
    /// Fail the run with the range error.
    Abort,
}

/// Configuration for an overlap pipeline run.
///
/// Built with [`PipelineConfig::new`] or [`PipelineConfig::configure`] and the
/// `with_*` methods; checked by [`PipelineConfig::validate`] before any thread
/// starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Record width profile.
    pub profile: Profile,
    /// Maximum records per batch.
    pub batch_size: usize,
    /// Capacity, in batches, of each stage queue.
    pub queue_capacity: usize,
    /// Number of worker threads.
    pub worker_count: usize,
    /// The Loader resumes reading once the load queue drains to this many batches.
    pub low_watermark: usize,
    /// The Loader stops reading once the load queue holds this many batches.
    pub high_watermark: usize,
    /// Handling of overlaps that do not fit the profile.
    pub range_policy: RangePolicy,
    /// Interval between status log lines; `None` disables the status thread.
    pub status_interval: Option<Duration>,
    /// Records written between progress log lines; `None` disables progress logging.
    pub progress_interval: Option<u64>,
    /// Log a warning when a worker takes longer than this on one batch.
    pub batch_deadline: Option<Duration>,
}

impl PipelineConfig {
    /// Records per batch unless configured otherwise.
    pub const DEFAULT_BATCH_SIZE: usize = 1024;

    /// Defaults for `worker_count` workers: capacity `2 * workers`, low watermark
    /// `workers`, high watermark equal to the capacity.
    #[must_use]
    pub fn new(worker_count: usize) -> Self {
        let workers = worker_count.max(1);
        Self {
            profile: Profile::default(),
            batch_size: Self::DEFAULT_BATCH_SIZE,
            queue_capacity: 2 * workers,
            worker_count,
            low_watermark: workers,
            high_watermark: 2 * workers,
            range_policy: RangePolicy::default(),
            status_interval: None,
            progress_interval: None,
            batch_deadline: None,
        }
    }

    /// Build and validate a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an invalid profile width, a zero worker count,
    /// batch size or capacity, `low_watermark >= high_watermark`, or
    /// `high_watermark > queue_capacity`.
    pub fn configure(
        profile_width: u32,
        batch_size: usize,
        queue_capacity: usize,
        worker_count: usize,
        low_watermark: usize,
        high_watermark: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self::new(worker_count)
            .with_profile(Profile::for_read_len_bits(profile_width)?)
            .with_batch_size(batch_size)
            .with_queue_capacity(queue_capacity)
            .with_watermarks(low_watermark, high_watermark);
        config.validate()?;
        Ok(config)
    }

    /// Set the record width profile.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the maximum records per batch.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the capacity of each stage queue.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the Loader's low and high watermarks.
    #[must_use]
    pub fn with_watermarks(mut self, low: usize, high: usize) -> Self {
        self.low_watermark = low;
        self.high_watermark = high;
        self
    }

    /// Set the range policy.
    #[must_use]
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = policy;
        self
    }

    /// Enable the status thread.
    #[must_use]
    pub fn with_status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = Some(interval);
        self
    }

    /// Enable progress logging every `records` written.
    #[must_use]
    pub fn with_progress_interval(mut self, records: u64) -> Self {
        self.progress_interval = Some(records);
        self
    }

    /// Warn when a worker spends longer than `deadline` on one batch.
    #[must_use]
    pub fn with_batch_deadline(mut self, deadline: Duration) -> Self {
        self.batch_deadline = Some(deadline);
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.low_watermark >= self.high_watermark {
            return Err(ConfigError::WatermarkOrder { low: self.low_watermark, high: self.high_watermark });
        }
        if self.high_watermark > self.queue_capacity {
            return Err(ConfigError::HighWatermarkAboveCapacity {
                high: self.high_watermark,
                capacity: self.queue_capacity,
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// One worker per available hardware thread.
    fn default() -> Self {
        Self::new(thread::available_parallelism().map_or(1, usize::from))
    }
}
