//! Error propagation: the first failure ends the run and is reported.

use std::io;

use ovlpipe_lib::PipelineError;
use ovlpipe_lib::errors::ConfigError;
use ovlpipe_lib::lookup::{ReadLengthLookup, ReadLengths};
use ovlpipe_lib::pipeline::{OverlapPipeline, PipelineConfig, RangePolicy};
use ovlpipe_lib::source::from_overlaps;
use ovlpipe_lib::transform::{Passthrough, UsageFilter};
use ovlpipe_record::{Medium, Narrow, OverlapRecord, Profile, ProfileError, RangeError};
use rstest::rstest;

use crate::helpers::{FailingSink, FailingSource, RecordingSink, init_logging, sequential_overlaps};

#[test]
fn test_source_error() {
    init_logging();
    let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(2).with_batch_size(8)).unwrap();
    let mut sink = RecordingSink::new();
    let result =
        pipeline.run(&mut FailingSource::new(sequential_overlaps(50)), &mut sink, &Vec::<u32>::new(), &Passthrough);

    match result {
        Err(PipelineError::Source(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
        other => panic!("expected a source error, got {other:?}"),
    }
    // Batches completed before the failure may have been written, in order.
    assert!(sink.records.len() <= 48);
    assert_eq!(sink.a_ids(), (0..sink.records.len() as u32).collect::<Vec<_>>());
    assert!(!sink.flushed);
}

#[test]
fn test_sink_error_names_batch() {
    let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(3).with_batch_size(5)).unwrap();
    let mut sink = FailingSink::new(4);
    let result = pipeline.run(&mut from_overlaps(sequential_overlaps(100)), &mut sink, &Vec::<u32>::new(), &Passthrough);

    match result {
        Err(PipelineError::Sink { serial, source }) => {
            assert_eq!(serial, 4);
            assert_eq!(source.to_string(), "disk full");
        }
        other => panic!("expected a sink error, got {other:?}"),
    }
    assert_eq!(sink.batches_written, 4);
}

#[test]
fn test_missing_read_length() {
    let input = sequential_overlaps(40);
    let lengths: ReadLengths = (0..40).filter(|&id| id != 17).map(|id| (id, 5_000)).collect();
    let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(4).with_batch_size(4)).unwrap();
    let mut sink = RecordingSink::new();

    let result = pipeline.run(&mut from_overlaps(input), &mut sink, &lengths, &UsageFilter::default());

    assert!(matches!(result, Err(PipelineError::Lookup { read_id: 17 })));
    assert!(sink.records.len() <= 16);
}

#[test]
fn test_abort_on_out_of_range() {
    let mut input = sequential_overlaps(30);
    input[12].bhg5 = 1 << 15;
    let config = PipelineConfig::new(2)
        .with_profile(Profile::for_read_len_bits(15).unwrap())
        .with_range_policy(RangePolicy::Abort);
    let pipeline = OverlapPipeline::<Narrow>::new(config).unwrap();
    let mut sink = RecordingSink::new();

    let result = pipeline.run(&mut from_overlaps(input), &mut sink, &Vec::<u32>::new(), &Passthrough);

    assert!(matches!(
        result,
        Err(PipelineError::Range(RangeError::FieldTooLarge { field: "bhg5", value: 32_768, max: 32_767 }))
    ));
}

#[test]
fn test_worker_panic_is_reported() {
    let exploding = |record: OverlapRecord<Medium>, _: &dyn ReadLengthLookup| -> ovlpipe_lib::Result<_> {
        assert!(record.a_id() != 37, "boom at {}", record.a_id());
        Ok(record)
    };
    let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(4).with_batch_size(10)).unwrap();
    let mut sink = RecordingSink::new();

    let result = pipeline.run(&mut from_overlaps(sequential_overlaps(100)), &mut sink, &Vec::<u32>::new(), &exploding);

    match result {
        Err(PipelineError::WorkerPanic { role, message }) => {
            assert!(role.starts_with("worker"), "{role}");
            assert!(message.contains("boom at 37"), "{message}");
        }
        other => panic!("expected a worker panic, got {other:?}"),
    }
    assert!(sink.records.iter().all(|r| r.a_id() < 30));
}

#[test]
fn test_profile_layout_mismatch() {
    let config = PipelineConfig::new(1).with_profile(Profile::for_read_len_bits(30).unwrap());
    let error = OverlapPipeline::<Medium>::new(config).unwrap_err();
    assert!(matches!(error, PipelineError::Config(ConfigError::Profile(ProfileError::LayoutMismatch { .. }))));
}

#[rstest]
#[case::zero_workers(PipelineConfig::new(2).with_workers(0))]
#[case::zero_batch(PipelineConfig::new(2).with_batch_size(0))]
#[case::inverted_watermarks(PipelineConfig::new(2).with_watermarks(3, 3))]
#[case::watermark_above_capacity(PipelineConfig::new(2).with_queue_capacity(2).with_watermarks(1, 3))]
fn test_invalid_config_rejected_before_start(#[case] config: PipelineConfig) {
    let error = OverlapPipeline::<Medium>::new(config).unwrap_err();
    assert!(matches!(error, PipelineError::Config(_)), "{error}");
}
