//! Block throughput for each engine and for a crossfade-heavy ratio curve.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sw_core::{LoopCursor, Resampler, BLOCK_SIZE};

const BLOCKS: usize = 4096;

fn source() -> Vec<f32> {
    (0..48_000)
        .map(|n| (2.0 * std::f32::consts::PI * 440.0 * n as f32 / 48_000.0).sin() * 0.5)
        .collect()
}

fn bench_steady(c: &mut Criterion) {
    let input = source();
    let mut group = c.benchmark_group("steady");
    group.throughput(Throughput::Elements((BLOCKS * BLOCK_SIZE) as u64));

    for &ratio in &[0.5f32, 0.9, 1.0, 1.5, 4.0] {
        group.bench_with_input(BenchmarkId::from_parameter(ratio), &ratio, |b, &ratio| {
            let mut resampler = Resampler::new();
            resampler.set_ratio(ratio);
            let mut cursor = LoopCursor::new(&input);
            let mut block = [0.0; BLOCK_SIZE];
            b.iter(|| {
                for _ in 0..BLOCKS {
                    resampler.process16(&mut cursor, &mut block);
                }
                black_box(block[0])
            });
        });
    }
    group.finish();
}

fn bench_transitions(c: &mut Criterion) {
    let input = source();
    let mut group = c.benchmark_group("transitions");
    group.throughput(Throughput::Elements((BLOCKS * BLOCK_SIZE) as u64));

    group.bench_function("flip_every_block", |b| {
        let mut resampler = Resampler::new();
        let mut cursor = LoopCursor::new(&input);
        let mut block = [0.0; BLOCK_SIZE];
        b.iter(|| {
            for i in 0..BLOCKS {
                resampler.set_ratio(if i % 2 == 0 { 1.1 } else { 0.9 });
                resampler.process16(&mut cursor, &mut block);
            }
            black_box(block[0])
        });
    });
    group.finish();
}

criterion_group!(benches, bench_steady, bench_transitions);
criterion_main!(benches);
