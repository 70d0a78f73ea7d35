#![deny(unsafe_code)]
// Clippy lint configuration for CI
// These lints are allowed because:
// - cast_*: Packed fields are widened and narrowed between u16, u32 and u64
// - missing_*_doc: Documentation improvements tracked separately
// - items_after_statements: Some test code uses late item declarations
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::items_after_statements,
    clippy::uninlined_format_args
)]

//! # ovlpipe - parallel processing of packed read overlaps
//!
//! Overlaps between sequencing reads are packed into fixed-width records (see
//! [`ovlpipe_record`]) and pushed through a three-stage pipeline that reads,
//! transforms and writes them in parallel while preserving input order.
//!
//! ## Overview
//!
//! ### Pipeline
//!
//! - **[`pipeline`]** - the Loader / workers / Writer engine and [`pipeline::OverlapPipeline`]
//! - **[`source`]** - where raw overlaps come from
//! - **[`transform`]** - per-record transforms run by the workers
//! - **[`sink`]** - where ordered batches go
//! - **[`lookup`]** - read length lookup shared by all workers
//!
//! ### Utilities
//!
//! - **[`errors`]** - the pipeline error type
//! - **[`reorder_buffer`]** - releases out-of-order batches in sequence
//! - **[`progress`]** - progress tracking and logging
//! - **[`logging`]** - count, rate and duration formatting plus run summaries
//! - **[`metrics`]** - writing run statistics to TSV
//!
//! ## Quick Start
//!
//! ```
//! use ovlpipe_lib::lookup::ReadLengths;
//! use ovlpipe_lib::pipeline::{OverlapPipeline, PipelineConfig};
//! use ovlpipe_lib::source::{RawOverlap, from_overlaps};
//! use ovlpipe_lib::transform::UsageFilter;
//! use ovlpipe_record::{Medium, OverlapRecord};
//!
//! # fn main() -> anyhow::Result<()> {
//! let raw = vec![
//!     RawOverlap { a_id: 0, b_id: 1, ahg5: 200, bhg3: 200, erate: 0.01, ..Default::default() },
//!     RawOverlap { a_id: 1, b_id: 0, bhg5: 200, ahg3: 200, erate: 0.10, ..Default::default() },
//! ];
//! let lengths: ReadLengths = [(0, 1000), (1, 1000)].into_iter().collect();
//!
//! let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(2))?;
//! let mut out: Vec<OverlapRecord<Medium>> = Vec::new();
//! let stats = pipeline.run(&mut from_overlaps(raw), &mut out, &lengths, &UsageFilter::new(0.05, 500))?;
//!
//! assert_eq!(stats.written, 2);
//! assert!(out[0].for_graph());
//! assert!(!out[1].for_graph());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod logging;
pub mod lookup;
pub mod metrics;
pub mod pipeline;
pub mod progress;
pub mod reorder_buffer;
pub mod sink;
pub mod source;
pub mod transform;

pub use errors::{PipelineError, Result};
pub use ovlpipe_record;
