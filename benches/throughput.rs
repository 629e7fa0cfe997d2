use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;
use stream_stages::random::SeededRandom;
use stream_stages::stages::{AtLeast, AtMost, LastN, Sample};
use stream_stages::{Pipeline, PipelineBuilder};

fn keyed_input(len: u64, keys: u64) -> Vec<u64> {
    (0..len).map(|i| (i * 2_654_435_761) % keys).collect()
}

fn benchmark_frequency_filters(c: &mut Criterion) {
    let input = keyed_input(100_000, 5_000);
    let pipeline = Pipeline::sequential();

    c.bench_function("at_least_3_100k", |b| {
        b.iter(|| {
            pipeline
                .collect(&AtLeast::new(3), black_box(input.clone()))
                .expect("Traversal failed")
        });
    });

    c.bench_function("at_most_20_100k", |b| {
        b.iter(|| {
            pipeline
                .collect(&AtMost::new(20), black_box(input.clone()))
                .expect("Traversal failed")
        });
    });
}

fn benchmark_last_n(c: &mut Criterion) {
    let input = keyed_input(100_000, 5_000);
    let pipeline = Pipeline::sequential();

    c.bench_function("last_1000_100k", |b| {
        b.iter(|| {
            pipeline
                .collect(&LastN::new(1000), black_box(input.clone()))
                .expect("Traversal failed")
        });
    });

    c.bench_function("last_unique_1000_100k", |b| {
        b.iter(|| {
            pipeline
                .collect(&LastN::unique(1000), black_box(input.clone()))
                .expect("Traversal failed")
        });
    });
}

fn benchmark_parallel_at_most(c: &mut Criterion) {
    let input = keyed_input(1_000_000, 50_000);
    let sequential = Pipeline::sequential();
    let parallel = PipelineBuilder::new()
        .parallel()
        .min_split_len(16_384)
        .build()
        .expect("Build failed");

    c.bench_function("at_most_sequential_1m", |b| {
        b.iter(|| {
            sequential
                .collect(&AtMost::new(20), black_box(input.clone()))
                .expect("Traversal failed")
        });
    });

    c.bench_function("at_most_parallel_1m", |b| {
        b.iter(|| {
            parallel
                .collect(&AtMost::new(20), black_box(input.clone()))
                .expect("Traversal failed")
        });
    });
}

fn benchmark_sample(c: &mut Criterion) {
    let stage = Sample::new(100).with_random(SeededRandom::new(1));
    let pipeline = Pipeline::sequential();

    c.bench_function("sample_100_of_100k", |b| {
        b.iter(|| {
            pipeline
                .collect(&stage, black_box(0..100_000u64))
                .expect("Traversal failed")
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = benchmark_frequency_filters, benchmark_last_n, benchmark_parallel_at_most, benchmark_sample
);
criterion_main!(benches);
