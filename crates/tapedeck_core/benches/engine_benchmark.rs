//! Engine benchmarks
//!
//! Measures the per-block bookkeeping around the render path: rolling the
//! history ring forward and appending to the recording buffer.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use tapedeck_core::{HistoryRing, Recorder};

fn benchmark_history_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_advance");

    // Typical buffer sizes used in real-time audio
    for block_size in [64, 128, 256, 512, 1024].iter() {
        let channels = 2;
        let mut ring = HistoryRing::new(*block_size, 10, channels);

        let input: Vec<f32> = (0..block_size * channels)
            .map(|i| (i as f32 * 0.001).sin())
            .collect();
        let output = input.clone();

        group.throughput(Throughput::Elements((*block_size * channels) as u64));
        group.bench_function(format!("advance_{}_frames", block_size), |b| {
            b.iter(|| {
                ring.advance(black_box(&input), black_box(&output));
            })
        });
    }

    group.finish();
}

fn benchmark_recorder_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("recorder_capture");

    for block_size in [256, 1024].iter() {
        let channels = 2;
        let blocks = 64;
        let output: Vec<f32> = (0..block_size * channels)
            .map(|i| (i as f32 * 0.001).sin())
            .collect();

        group.throughput(Throughput::Elements((block_size * channels * blocks) as u64));
        group.bench_function(format!("capture_{}x{}_frames", blocks, block_size), |b| {
            b.iter_batched(
                || Recorder::new(block_size * blocks, *block_size, channels),
                |mut recorder| {
                    for i in 0..blocks {
                        recorder.record(i * block_size, *block_size, black_box(&output));
                    }
                    recorder
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_history_advance, benchmark_recorder_capture);
criterion_main!(benches);
