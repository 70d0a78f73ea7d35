//! Order preservation under concurrent, uneven work.

use std::thread;
use std::time::Duration;

use ovlpipe_lib::lookup::ReadLengthLookup;
use ovlpipe_lib::pipeline::{OverlapPipeline, PipelineConfig};
use ovlpipe_lib::source::from_overlaps;
use ovlpipe_lib::transform::SwapIds;
use ovlpipe_record::{Medium, OverlapRecord};
use proptest::prelude::*;
use rand::Rng;

use crate::helpers::{RecordingSink, init_logging, sequential_overlaps};

fn jittered(record: OverlapRecord<Medium>, _: &dyn ReadLengthLookup) -> ovlpipe_lib::Result<OverlapRecord<Medium>> {
    let micros = rand::rng().random_range(0..300);
    thread::sleep(Duration::from_micros(micros));
    Ok(record)
}

#[test]
fn test_output_order_matches_input_with_random_delays() {
    init_logging();
    let input = sequential_overlaps(2_000);
    let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(8).with_batch_size(25)).unwrap();
    let mut sink = RecordingSink::new();

    let stats = pipeline.run(&mut from_overlaps(input), &mut sink, &Vec::<u32>::new(), &jittered).unwrap();

    assert_eq!(stats.written, 2_000);
    assert_eq!(stats.batches, 80);
    assert_eq!(sink.a_ids(), (0..2_000).collect::<Vec<_>>());
    assert!(sink.batch_sizes.iter().all(|&n| n == 25));
    assert!(sink.flushed);
}

#[test]
fn test_final_batch_may_be_short() {
    let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(3).with_batch_size(64)).unwrap();
    let mut sink = RecordingSink::new();
    pipeline.run(&mut from_overlaps(sequential_overlaps(200)), &mut sink, &Vec::<u32>::new(), &SwapIds).unwrap();

    assert_eq!(sink.batch_sizes, vec![64, 64, 64, 8]);
    // SwapIds moves the input position into b_id.
    assert!(sink.records.iter().enumerate().all(|(i, r)| r.b_id() as usize == i));
}

#[test]
fn test_empty_source() {
    let pipeline = OverlapPipeline::<Medium>::new(PipelineConfig::new(4)).unwrap();
    let mut sink = RecordingSink::new();
    let stats = pipeline.run(&mut from_overlaps(Vec::new()), &mut sink, &Vec::<u32>::new(), &SwapIds).unwrap();

    assert_eq!((stats.read, stats.batches, stats.written), (0, 0, 0));
    assert!(sink.records.is_empty());
    assert!(sink.flushed);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_order_preserved(n in 0usize..400, batch_size in 1usize..32, workers in 1usize..6) {
        let config = PipelineConfig::new(workers).with_batch_size(batch_size);
        let pipeline = OverlapPipeline::<Medium>::new(config).unwrap();
        let mut sink = RecordingSink::new();
        let stats = pipeline.run(&mut from_overlaps(sequential_overlaps(n)), &mut sink, &Vec::<u32>::new(), &jittered).unwrap();

        prop_assert_eq!(stats.written, n as u64);
        prop_assert_eq!(stats.batches, n.div_ceil(batch_size) as u64);
        prop_assert_eq!(sink.a_ids(), (0..n as u32).collect::<Vec<_>>());
    }
}
