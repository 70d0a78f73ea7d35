//! Bounded memory: a stalled sink stops the source from being drained.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use ovlpipe_lib::pipeline::{OverlapPipeline, PipelineConfig};
use ovlpipe_lib::transform::Passthrough;
use ovlpipe_record::{Medium, OverlapRecord};

use crate::helpers::{CountingSource, GateSink, init_logging, sequential_overlaps};

#[test]
fn test_stalled_sink_bounds_reads() {
    init_logging();
    const TOTAL: usize = 10_000;
    const BATCH: usize = 10;
    const CAPACITY: usize = 4;
    const WORKERS: usize = 2;

    let config = PipelineConfig::new(WORKERS)
        .with_batch_size(BATCH)
        .with_queue_capacity(CAPACITY)
        .with_watermarks(1, CAPACITY);
    let pipeline = OverlapPipeline::<Medium>::new(config).unwrap();

    let mut source = CountingSource::new(sequential_overlaps(TOTAL));
    let reads = source.reads();
    let (entered_tx, entered_rx) = bounded(1);
    let (release_tx, release_rx) = bounded(1);
    let mut sink = GateSink::new(entered_tx, release_rx);

    let stats = thread::scope(|s| {
        let run = s.spawn(|| pipeline.run(&mut source, &mut sink, &Vec::<u32>::new(), &Passthrough));

        entered_rx.recv().unwrap();
        thread::sleep(Duration::from_millis(200));

        // Batches in flight: one in the sink, the write queue, one per worker,
        // a few early arrivals held for reordering, the load queue and one
        // being filled by the Loader.
        let in_flight = 1 + CAPACITY + WORKERS + WORKERS + CAPACITY + 1;
        let pulled = reads.load(Ordering::Relaxed);
        assert!(pulled <= (in_flight * BATCH) as u64, "source drained {pulled} overlaps while the sink was stalled");

        release_tx.send(()).unwrap();
        run.join().unwrap()
    })
    .unwrap();

    assert_eq!(stats.written, TOTAL as u64);
    assert!(stats.peak_load_queue <= CAPACITY);
    assert!(stats.peak_write_queue <= CAPACITY);
    assert_eq!(sink.records.len(), TOTAL);
}

#[test]
fn test_single_slot_queues() {
    let config = PipelineConfig::new(1).with_batch_size(3).with_queue_capacity(1).with_watermarks(0, 1);
    let pipeline = OverlapPipeline::<Medium>::new(config).unwrap();
    let mut source = CountingSource::new(sequential_overlaps(100));
    let mut out: Vec<OverlapRecord<Medium>> = Vec::new();

    let stats = pipeline.run(&mut source, &mut out, &Vec::<u32>::new(), &Passthrough).unwrap();

    assert_eq!(stats.written, 100);
    assert_eq!(stats.peak_load_queue, 1);
    assert!(out.iter().enumerate().all(|(i, r)| r.a_id() as usize == i));
}
