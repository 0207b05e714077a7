//! Benchmarks for duplicating nested values and numeric buffers.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use facsimile::value::{BufferKind, NumericBuffer};
use facsimile::{DuplicateOptions, Duplicator, Value};
use std::hint::black_box;

/// Record of `width` fields, each holding a small sequence, nested `depth` levels.
fn nested_record(width: usize, depth: usize) -> Value {
    let leaf = || Value::sequence((0..4).map(|i| Value::from(i as f64)));
    let mut value = leaf();
    for _ in 0..depth {
        value = Value::record((0..width).map(|i| {
            let child = if i == 0 { value.clone() } else { leaf() };
            (format!("field{}", i), child)
        }));
    }
    value
}

/// Plain versus cycle-tracking duplication of growing trees
fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_record");
    let tracking = Duplicator::new().with_options(DuplicateOptions {
        track_cycles: true,
        ..DuplicateOptions::default()
    });

    for depth in [2, 8, 32] {
        let input = nested_record(8, depth);

        group.bench_with_input(BenchmarkId::new("plain", depth), &input, |b, input| {
            b.iter(|| facsimile::duplicate(black_box(input)))
        });

        group.bench_with_input(BenchmarkId::new("track_cycles", depth), &input, |b, input| {
            b.iter(|| tracking.duplicate(black_box(input)))
        });
    }

    group.finish();
}

/// Element-wise numeric buffer copies
fn bench_numeric_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("numeric_buffer");

    for len in [64, 4096] {
        let numbers: Vec<f64> = (0..len).map(|i| i as f64 * 0.5).collect();
        for kind in [BufferKind::Uint8Clamped, BufferKind::Float64] {
            let input = Value::NumericBuffer(NumericBuffer::from_numbers(kind, &numbers));
            group.bench_with_input(BenchmarkId::new(kind.name(), len), &input, |b, input| {
                b.iter(|| facsimile::duplicate(black_box(input)))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_nested, bench_numeric_buffer);
criterion_main!(benches);
