//! Benchmarks for the intersection engine.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use memloc::analysis::{difference, intersect_progressions};
use memloc::prelude::*;

/// Benchmark the Diophantine progression intersection.
fn bench_progressions(c: &mut Criterion) {
    let lhs = Dimension::new(3, 7919, 1_000_000, u64::MAX);
    let rhs = Dimension::new(11, 104_729, 1_000_000, u64::MAX);

    c.bench_function("intersect_coprime_progressions", |b| {
        b.iter(|| intersect_progressions(black_box(&lhs), black_box(&rhs)))
    });
}

/// Benchmark complement splitting.
fn bench_difference(c: &mut Criterion) {
    let d = Dimension::dense(0, 10_000, 10_000);
    let i = Dimension::new(5, 10, 999, 10_000);

    c.bench_function("difference_step_10", |b| {
        b.iter(|| difference(black_box(&d), black_box(&i), 10).unwrap())
    });
}

/// Benchmark full engine queries.
fn bench_engine(c: &mut Criterion) {
    let base = BaseId::new(0);
    let matrix = MemoryLocationRange::collapsed(
        base,
        8,
        vec![Dimension::dense(0, 512, 512), Dimension::dense(0, 512, 512)],
    );
    let tile = MemoryLocationRange::collapsed(
        base,
        8,
        vec![Dimension::new(64, 2, 64, 512), Dimension::dense(128, 64, 512)],
    );
    let rows = MemoryLocationRange::flat(base, 512 * 8 * 100, 512 * 8 * 200);
    let engine = RangeEngine::new();

    c.bench_function("intersect_2d_with_complements", |b| {
        b.iter(|| engine.intersect_with_complements(black_box(&matrix), black_box(&tile)))
    });

    c.bench_function("intersect_delinearized_rows", |b| {
        b.iter(|| engine.intersect(black_box(&rows), black_box(&matrix)))
    });
}

criterion_group!(benches, bench_progressions, bench_difference, bench_engine);
criterion_main!(benches);
