//! The overlap-specific pipeline: encode at the Loader, transform in the
//! workers, hand ordered batches to a sink.

use ovlpipe_record::{OverlapCodec, OverlapLayout, OverlapRecord};

use super::batch::Batch;
use super::cancel::CancelToken;
use super::config::{PipelineConfig, RangePolicy};
use super::engine::{LoadOutcome, run_stages};
use super::stats::PipelineStats;
use crate::errors::{ConfigError, PipelineError, Result};
use crate::lookup::ReadLengthLookup;
use crate::sink::OverlapSink;
use crate::source::OverlapSource;
use crate::transform::OverlapTransform;

/// A configured pipeline over records of layout `L`.
///
/// # Example
///
/// ```
/// use ovlpipe_lib::pipeline::{OverlapPipeline, PipelineConfig};
/// use ovlpipe_lib::source::{RawOverlap, from_overlaps};
/// use ovlpipe_lib::transform::SwapIds;
/// use ovlpipe_record::{Medium, OverlapRecord};
///
/// let raw = (0..10).map(|i| RawOverlap { a_id: i, b_id: i + 100, ahg5: 5, ..Default::default() });
/// let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(2).with_batch_size(3)).unwrap();
///
/// let mut out: Vec<OverlapRecord<Medium>> = Vec::new();
/// let stats = pipeline.run(&mut from_overlaps(raw), &mut out, &Vec::<u32>::new(), &SwapIds).unwrap();
///
/// assert_eq!(stats.written, 10);
/// assert_eq!(out[3].a_id(), 103);
/// assert_eq!(out[3].bhg5(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct OverlapPipeline<L: OverlapLayout> {
    config: PipelineConfig,
    codec: OverlapCodec<L>,
    cancel: CancelToken,
}

impl<L: OverlapLayout> OverlapPipeline<L> {
    /// Validate `config` and bind it to layout `L`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is invalid or its
    /// profile selects a layout other than `L`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let codec = OverlapCodec::new(config.profile).map_err(ConfigError::from)?;
        Ok(Self { config, codec, cancel: CancelToken::new() })
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// A handle that cancels runs of this pipeline from another thread.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Cancel any current and future run of this pipeline.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Pull every overlap from `source`, apply `transform` and deliver the
    /// results to `sink` in input order.
    ///
    /// The sink is flushed only after a successful run. On failure it may have
    /// received a prefix of whole batches.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any stage: [`PipelineError::Source`],
    /// [`PipelineError::Range`] under [`RangePolicy::Abort`] or when a transform
    /// produces a record outside the profile bound, any transform error,
    /// [`PipelineError::Sink`], [`PipelineError::Cancelled`] or
    /// [`PipelineError::WorkerPanic`].
    pub fn run<S, K, T>(
        &self,
        source: &mut S,
        sink: &mut K,
        lookup: &dyn ReadLengthLookup,
        transform: &T,
    ) -> Result<PipelineStats>
    where
        S: OverlapSource + ?Sized,
        K: OverlapSink<L> + ?Sized,
        T: OverlapTransform<L> + ?Sized,
    {
        let codec = self.codec;
        let policy = self.config.range_policy;

        let load = || -> Result<LoadOutcome<OverlapRecord<L>>> {
            let Some(raw) = source.next_overlap().map_err(PipelineError::Source)? else {
                return Ok(LoadOutcome::Exhausted);
            };
            match codec.encode(&raw.to_fields()) {
                Ok(record) => Ok(LoadOutcome::Item(record)),
                Err(e) if policy == RangePolicy::Drop => {
                    log::debug!("Dropping overlap {} x {}: {e}", raw.a_id, raw.b_id);
                    Ok(LoadOutcome::Dropped)
                }
                Err(e) => Err(e.into()),
            }
        };
        // Transforms may move hangs or span past the profile bound; the slot
        // width alone does not catch that.
        let compute = |record: OverlapRecord<L>| -> Result<OverlapRecord<L>> {
            let out = transform.apply(record, lookup)?;
            codec.check_record(&out)?;
            Ok(out)
        };
        let write = |batch: &Batch<OverlapRecord<L>>| -> Result<()> {
            sink.write_batch(batch.items()).map_err(|source| PipelineError::Sink { serial: batch.serial(), source })
        };

        let stats = run_stages(&self.config, &self.cancel, load, compute, write)?;
        sink.flush().map_err(|source| PipelineError::Sink { serial: stats.batches, source })?;
        Ok(stats)
    }
}
