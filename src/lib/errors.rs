//! Error types for pipeline configuration and execution.

use std::io;

use ovlpipe_record::{ProfileError, RangeError};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The terminal error of a pipeline run.
///
/// Only the first error observed by any stage is reported; later errors caused
/// by the shutdown it triggers are discarded.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration, detected before any thread starts
    #[error("Invalid pipeline configuration: {0}")]
    Config(#[from] ConfigError),

    /// A record could not be represented under the active profile
    #[error("Overlap out of range: {0}")]
    Range(#[from] RangeError),

    /// A stage pushed to a queue that was already closed
    #[error("Internal error: {0}")]
    ClosedQueue(#[from] ClosedQueueError),

    /// No length is known for a read
    #[error("No read length for read {read_id}")]
    Lookup {
        /// The read id that was looked up
        read_id: u32,
    },

    /// The overlap source failed
    #[error("Failed to read overlaps: {0}")]
    Source(#[source] io::Error),

    /// The sink failed to accept a batch
    #[error("Failed to write batch {serial}: {source}")]
    Sink {
        /// Sequence number of the batch being written
        serial: u64,
        /// The underlying error
        #[source]
        source: io::Error,
    },

    /// The run was cancelled
    #[error("Pipeline cancelled")]
    Cancelled,

    /// A stage thread panicked
    #[error("{role} thread panicked: {message}")]
    WorkerPanic {
        /// The role of the thread, e.g. "worker 3"
        role: String,
        /// The panic payload, if it was a string
        message: String,
    },

    /// Stages disagreed about the batch protocol (duplicate or missing sequence numbers)
    #[error("Pipeline protocol violation: {0}")]
    Protocol(String),
}

impl PipelineError {
    /// Whether this error is the result of [`PipelineError::Cancelled`].
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Invalid pipeline configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one worker is required
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    /// Batches must hold at least one record
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    /// Queues must hold at least one batch
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,

    /// The low watermark must be below the high watermark
    #[error("low watermark {low} must be less than high watermark {high}")]
    WatermarkOrder {
        /// Configured low watermark
        low: usize,
        /// Configured high watermark
        high: usize,
    },

    /// The high watermark cannot exceed the queue capacity
    #[error("high watermark {high} exceeds queue capacity {capacity}")]
    HighWatermarkAboveCapacity {
        /// Configured high watermark
        high: usize,
        /// Configured queue capacity
        capacity: usize,
    },

    /// The profile is invalid or does not match the record layout
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl From<ProfileError> for PipelineError {
    fn from(error: ProfileError) -> Self {
        Self::Config(ConfigError::Profile(error))
    }
}

/// An item was pushed to a queue after it was closed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("push to closed queue '{queue}'")]
pub struct ClosedQueueError {
    /// Name of the queue
    pub queue: &'static str,
}
