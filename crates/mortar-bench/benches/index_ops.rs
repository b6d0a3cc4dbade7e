//! Criterion micro-benchmarks for spatial index insert, query, and parallel writes.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use mortar_bench::{reference_index, scattered_points, REFERENCE_SIDE};
use mortar_core::encode;
use mortar_index::{IndexConfig, SpatialIndex};

/// Benchmark: Encode every point of the reference grid.
fn bench_morton_encode_10k(c: &mut Criterion) {
    c.bench_function("morton_encode_10k", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for y in 0..REFERENCE_SIDE {
                for x in 0..REFERENCE_SIDE {
                    acc ^= encode(black_box(x), black_box(y));
                }
            }
            black_box(acc);
        });
    });
}

/// Benchmark: Build the 10K-cell reference index from scratch.
fn bench_index_build_10k(c: &mut Criterion) {
    c.bench_function("index_build_10k", |b| {
        b.iter(|| black_box(reference_index()));
    });
}

/// Benchmark: Insert 10K scattered payloads into an index that starts small
/// and grows.
fn bench_index_insert_growing(c: &mut Criterion) {
    let points = scattered_points(10_000, 256, 42);
    c.bench_function("index_insert_growing", |b| {
        b.iter_batched(
            || SpatialIndex::<u32>::new(IndexConfig::new(64).with_max_per_bucket(16)).unwrap(),
            |mut index| {
                for (i, &(x, y)) in points.iter().enumerate() {
                    // Duplicate points past the bucket size are skipped.
                    if index.query_point(x, y).1.len() < 16 {
                        let _ = index.insert_point(x, y, i as u32);
                    }
                }
                index
            },
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: Query 10K scattered points against the reference index.
fn bench_index_query_10k(c: &mut Criterion) {
    let index = reference_index();
    let points = scattered_points(10_000, REFERENCE_SIDE, 7);
    c.bench_function("index_query_10k", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for &(x, y) in &points {
                hits += index.query_bucket(x, y).1.len();
            }
            black_box(hits);
        });
    });
}

/// Benchmark: 4 workers appending 10K payloads through the parallel writer.
fn bench_index_parallel_insert(c: &mut Criterion) {
    let keys: Vec<u32> = (0..10_000u32).collect();
    c.bench_function("index_parallel_insert_4x2500", |b| {
        b.iter_batched(
            || SpatialIndex::<u32>::new(IndexConfig::new(10_000).with_max_per_bucket(1)).unwrap(),
            |mut index| {
                {
                    let writer = index.as_parallel_writer();
                    std::thread::scope(|s| {
                        for chunk in keys.chunks(2500) {
                            let writer = &writer;
                            s.spawn(move || {
                                for &key in chunk {
                                    writer.insert_no_resize(key, key);
                                }
                            });
                        }
                    });
                }
                index
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_morton_encode_10k,
    bench_index_build_10k,
    bench_index_insert_growing,
    bench_index_query_10k,
    bench_index_parallel_insert
);
criterion_main!(benches);
