//! Cancellation from another thread.

use std::thread;
use std::time::Duration;

use ovlpipe_lib::PipelineError;
use ovlpipe_lib::pipeline::{OverlapPipeline, PipelineConfig, PipelinePhase};
use ovlpipe_lib::source::from_overlaps;
use ovlpipe_lib::transform::Passthrough;
use ovlpipe_record::Medium;

use crate::helpers::{RecordingSink, init_logging, sequential_overlaps};

#[test]
fn test_cancel_mid_run_writes_only_whole_batches() {
    init_logging();
    let config = PipelineConfig::new(4).with_batch_size(10).with_status_interval(Duration::from_millis(5));
    let pipeline = OverlapPipeline::<Medium>::new(config).unwrap();
    let cancel = pipeline.cancel_handle();
    let mut sink = RecordingSink::with_delay(Duration::from_millis(20));

    let result = thread::scope(|s| {
        s.spawn(move || {
            thread::sleep(Duration::from_millis(100));
            cancel.cancel();
        });
        pipeline.run(&mut from_overlaps(sequential_overlaps(1_000)), &mut sink, &Vec::<u32>::new(), &Passthrough)
    });

    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert!(sink.records.len() < 1_000);
    assert!(sink.batch_sizes.iter().all(|&n| n == 10));
    assert_eq!(sink.a_ids(), (0..sink.records.len() as u32).collect::<Vec<_>>());
    assert!(!sink.flushed);
}

#[test]
fn test_cancel_is_idempotent_and_sticky() {
    let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(2)).unwrap();
    pipeline.cancel();
    pipeline.cancel();
    for _ in 0..2 {
        let mut sink = RecordingSink::new();
        let result =
            pipeline.run(&mut from_overlaps(sequential_overlaps(10)), &mut sink, &Vec::<u32>::new(), &Passthrough);
        assert!(result.unwrap_err().is_cancelled());
        assert!(sink.records.is_empty());
    }
    assert!(PipelinePhase::Failed.is_terminal());
}
