//! Criterion micro-benchmarks for owner-mode and parallel stack operations.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use mortar_bench::filled_stack;
use mortar_stack::ConcurrentStack;

const OPS: usize = 10_000;

/// Benchmark: Push 10K values starting from capacity 1 (exercises doubling).
fn bench_stack_push_growing(c: &mut Criterion) {
    c.bench_function("stack_push_growing_10k", |b| {
        b.iter(|| {
            let mut stack = ConcurrentStack::with_capacity(1).unwrap();
            for v in 0..OPS as u64 {
                stack.push(black_box(v));
            }
            black_box(stack.len());
        });
    });
}

/// Benchmark: Pop 10K values in owner mode.
fn bench_stack_pop_10k(c: &mut Criterion) {
    c.bench_function("stack_pop_10k", |b| {
        b.iter_batched(
            || filled_stack(OPS),
            |mut stack| {
                while let Some(v) = stack.pop() {
                    black_box(v);
                }
                stack
            },
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: 4 workers pushing 2500 values each through the parallel writer.
fn bench_stack_parallel_push(c: &mut Criterion) {
    c.bench_function("stack_parallel_push_4x2500", |b| {
        b.iter_batched(
            || ConcurrentStack::<u64>::with_capacity(OPS).unwrap(),
            |mut stack| {
                {
                    let writer = stack.as_parallel_writer();
                    std::thread::scope(|s| {
                        for t in 0..4u64 {
                            let writer = &writer;
                            s.spawn(move || {
                                for i in 0..(OPS as u64 / 4) {
                                    writer.push_no_resize(t * 10_000 + i);
                                }
                            });
                        }
                    });
                }
                stack
            },
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: 4 workers draining a 10K stack through the parallel reader.
fn bench_stack_parallel_pop(c: &mut Criterion) {
    c.bench_function("stack_parallel_pop_4x", |b| {
        b.iter_batched(
            || filled_stack(OPS),
            |mut stack| {
                {
                    let reader = stack.as_parallel_reader();
                    std::thread::scope(|s| {
                        for _ in 0..4 {
                            let reader = &reader;
                            s.spawn(move || {
                                while let Some(v) = reader.pop() {
                                    black_box(v);
                                }
                            });
                        }
                    });
                }
                stack
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_stack_push_growing,
    bench_stack_pop_10k,
    bench_stack_parallel_push,
    bench_stack_parallel_pop
);
criterion_main!(benches);
