//! Block effect benchmarks
//!
//! Measures the per-block cost of the shipped effects across the buffer
//! sizes used in real-time audio.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tapedeck_fx::{BlockEffect, EffectContext, FeedbackDelay, HistoryView, PeakingFilter};

fn benchmark_feedback_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("feedback_delay");

    for block_size in [64, 128, 256, 512, 1024].iter() {
        let history_len = block_size * 10;
        let ctx = EffectContext::new(48000, *block_size, history_len);
        let delay = FeedbackDelay::new(48000.0 / *block_size as f32, 0.6).unwrap();

        let input: Vec<f32> = (0..*block_size).map(|i| (i as f32 * 0.001).sin()).collect();
        let history: Vec<f32> = (0..history_len).map(|i| (i as f32 * 0.002).sin()).collect();
        let mut output = vec![0.0_f32; *block_size];

        group.throughput(Throughput::Elements(*block_size as u64));
        group.bench_function(format!("process_{}_frames", block_size), |b| {
            b.iter(|| {
                let view = HistoryView::new(&history, &[]);
                delay
                    .process(&ctx, black_box(&input), black_box(&mut output), &view, &view)
                    .unwrap();
            })
        });
    }

    group.finish();
}

fn benchmark_peaking_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("peaking_filter");

    for block_size in [64, 128, 256, 512, 1024].iter() {
        let history_len = block_size * 10;
        let ctx = EffectContext::new(48000, *block_size, history_len);
        let filter = PeakingFilter::new(1000.0, 6.0);

        let input: Vec<f32> = (0..*block_size).map(|i| (i as f32 * 0.001).sin()).collect();
        let history = vec![0.0_f32; history_len];
        let mut output = vec![0.0_f32; *block_size];

        group.throughput(Throughput::Elements(*block_size as u64));
        group.bench_function(format!("process_{}_frames", block_size), |b| {
            b.iter(|| {
                let view = HistoryView::new(&history, &[]);
                filter
                    .process(&ctx, black_box(&input), black_box(&mut output), &view, &view)
                    .unwrap();
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_feedback_delay, benchmark_peaking_filter);
criterion_main!(benches);
