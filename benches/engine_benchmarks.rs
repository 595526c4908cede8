//! Criterion benchmarks for the bit engines and the layers built on them.
//!
//! Covers raw word throughput, bounded integer reduction, a rejection
//! sampler and Fisher–Yates shuffling across deck sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_variate::distributions::{gamma, gauss, poisson};
use u_variate::random::{riffle_shuffle, shuffle, WeightedSampler};
use u_variate::{BitEngine, Lcprng, UniformReduction, XorShift};

/// Raw 64-bit words from both engines.
fn bench_next(c: &mut Criterion) {
    let mut group = c.benchmark_group("next");

    let lcg = Lcprng::with_seed(42);
    group.bench_function("lcprng", |b| b.iter(|| black_box(lcg.next())));

    let xs = XorShift::with_seed(42);
    group.bench_function("xorshift", |b| b.iter(|| black_box(xs.next())));

    group.finish();
}

/// Unbiased reduction to `[0, n]`; powers of two avoid rejection entirely.
fn bench_limited(c: &mut Criterion) {
    let mut group = c.benchmark_group("limited");
    let rng = Lcprng::with_seed(42);

    for n in [1u64, 51, 1 << 20, (1 << 63) + 1] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(rng.limited(black_box(n))));
        });
    }

    group.bench_function("unit", |b| b.iter(|| black_box(rng.unit())));
    group.finish();
}

/// Samplers with different cost profiles.
fn bench_samplers(c: &mut Criterion) {
    let mut group = c.benchmark_group("samplers");
    let rng = Lcprng::with_seed(42);

    group.bench_function("gauss", |b| b.iter(|| black_box(gauss(&rng))));

    for alpha in [0.5, 2.0, 30.0] {
        group.bench_with_input(BenchmarkId::new("gamma", alpha), &alpha, |b, &alpha| {
            b.iter(|| black_box(gamma(black_box(alpha), 1.0, &rng)));
        });
    }

    for lambda in [3.0, 100.0, 1000.0] {
        group.bench_with_input(BenchmarkId::new("poisson", lambda), &lambda, |b, &lambda| {
            b.iter(|| black_box(poisson(black_box(lambda), &rng)));
        });
    }

    let weights: Vec<f64> = (1..=64).map(f64::from).collect();
    if let Some(sampler) = WeightedSampler::new(&weights) {
        group.bench_function("weighted_64", |b| b.iter(|| black_box(sampler.sample(&rng))));
    }

    group.finish();
}

/// Fisher–Yates versus the riffle model.
fn bench_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("shuffle");
    let rng = Lcprng::with_seed(42);

    for size in [52usize, 1000, 100_000] {
        let mut deck: Vec<usize> = (0..size).collect();
        group.bench_with_input(BenchmarkId::new("fisher_yates", size), &size, |b, _| {
            b.iter(|| shuffle(black_box(&mut deck), &rng));
        });
    }

    let mut deck: Vec<usize> = (0..52).collect();
    group.bench_function("riffle_52", |b| {
        b.iter(|| riffle_shuffle(black_box(&mut deck), &rng));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_next,
    bench_limited,
    bench_samplers,
    bench_shuffle
);
criterion_main!(benches);
