/// Reduction Benchmarks
///
/// Compares the generic strided reducer with the accelerated dispatch path
/// for full and segmented reductions over C- and F-ordered inputs.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use extremis_core::ops::reduction::normalize_axes;
use extremis_core::{AxisSpec, Dispatcher, ReduceOp, Tensor};
#[cfg(feature = "parallel")]
use extremis_core::{DispatchConfig, ParallelBackend};
#[cfg(feature = "parallel")]
use std::sync::Arc;

/// Benchmark configuration for different tensor shapes
struct BenchConfig {
    name: &'static str,
    shape: &'static [usize],
}

const SHAPES: &[BenchConfig] = &[
    BenchConfig {
        name: "vec_100k",
        shape: &[100_000],
    },
    BenchConfig {
        name: "mat_512x512",
        shape: &[512, 512],
    },
    BenchConfig {
        name: "cube_64x64x64",
        shape: &[64, 64, 64],
    },
];

fn dispatchers() -> Vec<(&'static str, Dispatcher)> {
    let mut dispatchers = vec![("generic", Dispatcher::generic())];
    #[cfg(feature = "parallel")]
    dispatchers.push((
        "rayon",
        Dispatcher::new(Arc::new(ParallelBackend::new())).with_config(DispatchConfig::default()),
    ));
    dispatchers
}

fn sample(shape: &[usize]) -> Tensor<f32> {
    let numel: usize = shape.iter().product();
    let data = (0..numel).map(|i| ((i * 7919) % 10_007) as f32 * 0.01).collect();
    Tensor::from_vec(data, shape).unwrap()
}

fn bench_full_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_reduction");

    for config in SHAPES {
        let x = sample(config.shape);
        let axes = normalize_axes(&AxisSpec::All, x.ndim()).unwrap();
        for (name, dispatcher) in dispatchers() {
            group.bench_with_input(BenchmarkId::new(name, config.name), &x, |b, x| {
                b.iter(|| black_box(dispatcher.reduce(x, &axes, ReduceOp::Max).unwrap()))
            });
        }
    }

    group.finish();
}

fn bench_segmented_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmented_reduction");

    for config in SHAPES.iter().filter(|config| config.shape.len() > 1) {
        let c_order = sample(config.shape);
        let f_order = c_order.to_fortran();
        let axes = normalize_axes(&AxisSpec::Single(-1), c_order.ndim()).unwrap();

        for (order, x) in [("c", &c_order), ("f", &f_order)] {
            for (name, dispatcher) in dispatchers() {
                let id = BenchmarkId::new(format!("{name}_{order}"), config.name);
                group.bench_with_input(id, x, |b, x| {
                    b.iter(|| black_box(dispatcher.reduce(x, &axes, ReduceOp::Min).unwrap()))
                });
            }
        }
    }

    group.finish();
}

criterion_group!(benches, bench_full_reduction, bench_segmented_reduction);
criterion_main!(benches);
