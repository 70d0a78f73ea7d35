//! Writing run statistics to TSV files.

use anyhow::{Context, Result};
use fgoxide::io::DelimFile;
use serde::Serialize;
use std::path::Path;

use crate::pipeline::PipelineStats;

/// Write `metrics` to a TSV file with a header row.
///
/// `description` names the metrics in the error message.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
///
/// # Example
///
/// ```no_run
/// use ovlpipe_lib::metrics::write_metrics;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct LayoutCount {
///     layout: &'static str,
///     records: u64,
/// }
///
/// let rows = vec![LayoutCount { layout: "medium", records: 10 }];
/// write_metrics("counts.tsv", &rows, "layout count").unwrap();
/// ```
pub fn write_metrics<P: AsRef<Path>, T: Serialize>(path: P, metrics: &[T], description: &str) -> Result<()> {
    let path = path.as_ref();
    DelimFile::default()
        .write_tsv(&path, metrics)
        .with_context(|| format!("Failed to write {description} metrics: {}", path.display()))
}

/// Write the final statistics of one run as a single-row TSV.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_pipeline_stats<P: AsRef<Path>>(path: P, stats: &PipelineStats) -> Result<()> {
    write_metrics(path, std::slice::from_ref(stats), "pipeline")
}
