//! The staged, order-preserving parallel pipeline.
//!
//! - [`engine`]: the generic Loader / workers / Writer engine ([`run_stages`])
//! - [`overlap`]: [`OverlapPipeline`], which binds the engine to overlap
//!   records, a source, a transform and a sink
//! - [`queue`]: the bounded, closeable, cancel-aware [`StageQueue`]
//! - [`state`]: phase, counters and the latched first error shared by all stages
//! - [`config`], [`stats`], [`batch`] and [`cancel`]: the supporting types

pub mod batch;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod overlap;
pub mod queue;
pub mod state;
pub mod stats;

pub use batch::Batch;
pub use cancel::CancelToken;
pub use config::{PipelineConfig, RangePolicy};
pub use engine::{LoadOutcome, extract_panic_message, run_stages};
pub use overlap::OverlapPipeline;
pub use queue::{QueueStats, StageQueue};
pub use state::{PipelineCounters, PipelinePhase, PipelineState};
pub use stats::{PipelineStats, StatusSnapshot};
