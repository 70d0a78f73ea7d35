//! End-to-end runs: conservation of counts, display output and metrics.

use std::time::Duration;

use fgoxide::io::DelimFile;
use ovlpipe_lib::metrics::write_pipeline_stats;
use ovlpipe_lib::pipeline::{
    Batch, CancelToken, LoadOutcome, OverlapPipeline, PipelineConfig, PipelineStats, run_stages,
};
use ovlpipe_lib::sink::DisplaySink;
use ovlpipe_lib::source::from_overlaps;
use ovlpipe_lib::transform::{Chain, Passthrough, SwapIds, UsageFilter};
use ovlpipe_record::{Narrow, OverlapCodec, OverlapDisplay, Profile, Wide};
use tempfile::TempDir;

use crate::helpers::{RecordingSink, init_logging, random_overlaps, sequential_overlaps, uniform_lengths};

#[test]
fn test_counts_conserved_with_dropped_overlaps() {
    init_logging();
    let profile = Profile::for_read_len_bits(12).unwrap();
    let input = random_overlaps(3_000, 42, 6_000);
    let codec = OverlapCodec::<Narrow>::new(profile).unwrap();
    let expected: Vec<u32> = input.iter().filter(|o| codec.check(&o.to_fields()).is_ok()).map(|o| o.a_id).collect();
    assert!(expected.len() < input.len() && !expected.is_empty());

    let config = PipelineConfig::new(6)
        .with_profile(profile)
        .with_batch_size(50)
        .with_status_interval(Duration::from_millis(2))
        .with_progress_interval(500)
        .with_batch_deadline(Duration::from_secs(5));
    let pipeline = OverlapPipeline::<Narrow>::new(config).unwrap();
    let mut sink = RecordingSink::new();

    let stats = pipeline.run(&mut from_overlaps(input), &mut sink, &Vec::<u32>::new(), &Passthrough).unwrap();

    assert!(stats.is_conserved());
    assert_eq!(stats.read, 3_000);
    assert_eq!(stats.dropped, 3_000 - expected.len() as u64);
    assert_eq!(stats.written, expected.len() as u64);
    assert_eq!(stats.workers, 6);
    assert_eq!(sink.a_ids(), expected);
}

#[test]
fn test_decoded_output_matches_input() {
    let input = random_overlaps(500, 7, 1_000);
    let profile = Profile::for_read_len_bits(32).unwrap();
    let pipeline = OverlapPipeline::<Wide>::new(PipelineConfig::new(3).with_profile(profile)).unwrap();
    let mut sink = RecordingSink::new();

    pipeline.run(&mut from_overlaps(input.clone()), &mut sink, &Vec::<u32>::new(), &Passthrough).unwrap();

    for (raw, record) in input.iter().zip(&sink.records) {
        let fields = record.fields();
        let expected = raw.to_fields();
        assert_eq!((fields.a_id, fields.b_id), (expected.a_id, expected.b_id));
        assert_eq!((fields.ahg5, fields.ahg3, fields.bhg5, fields.bhg3), (raw.ahg5, raw.ahg3, raw.bhg5, raw.bhg3));
        assert_eq!(fields.span, raw.span);
        assert_eq!(fields.flipped, raw.flipped);
        assert!((fields.erate - raw.erate).abs() <= 0.000_051);
    }
}

#[test]
fn test_chained_transforms_and_display_sink() {
    let input = sequential_overlaps(30);
    let lengths = uniform_lengths(&input, 1_000);
    let transform = Chain::new(UsageFilter::new(0.02, 950), SwapIds);
    let pipeline = OverlapPipeline::<ovlpipe_record::Medium>::new(PipelineConfig::new(2).with_batch_size(7)).unwrap();
    let mut sink = DisplaySink::new(Vec::new(), OverlapDisplay::Paf).with_lengths(&lengths);

    let stats = pipeline.run(&mut from_overlaps(input), &mut sink, &lengths, &transform).unwrap();
    assert_eq!(stats.written, 30);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 30);
    for (i, line) in lines.iter().enumerate() {
        let columns: Vec<&str> = line.split('\t').collect();
        assert_eq!(columns[0], (i + 1).to_string(), "{line}");
        assert_eq!(columns[5], i.to_string(), "{line}");
    }
}

#[test]
fn test_stats_written_to_tsv() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("pipeline.tsv");
    let pipeline = OverlapPipeline::<ovlpipe_record::Medium>::new(PipelineConfig::new(2))?;
    let mut sink = RecordingSink::new();
    let stats = pipeline.run(&mut from_overlaps(sequential_overlaps(10)), &mut sink, &Vec::<u32>::new(), &Passthrough)?;

    write_pipeline_stats(&path, &stats)?;
    let rows: Vec<PipelineStats> = DelimFile::default().read_tsv(&path)?;
    assert_eq!(rows, vec![stats]);
    Ok(())
}

#[test]
fn test_run_stages_with_plain_closures() {
    let mut words = ["alpha", "beta", "gamma", "delta", "epsilon"].into_iter();
    let mut lines = Vec::new();
    let config = PipelineConfig::new(3).with_batch_size(2);

    let stats = run_stages(
        &config,
        &CancelToken::new(),
        || Ok(words.next().map_or(LoadOutcome::Exhausted, LoadOutcome::Item)),
        |word: &str| Ok(word.len()),
        |batch: &Batch<usize>| {
            lines.push((batch.serial(), batch.items().to_vec()));
            Ok(())
        },
    )
    .unwrap();

    assert_eq!(stats.batches, 3);
    assert_eq!(lines, vec![(0, vec![5, 4]), (1, vec![5, 5]), (2, vec![7])]);
}
