use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;
use stream_stages::stages::{AtLeast, DistinctBy, LastN, Nth};
use stream_stages::{Pipeline, Stage};

fn benchmark_short_circuit(c: &mut Criterion) {
    let pipeline = Pipeline::sequential();

    // Stops after a handful of elements no matter how long the input is
    c.bench_function("at_least_2_first_10_of_10m", |b| {
        b.iter(|| {
            let input = (0..10_000_000u64).map(|i| i / 2);
            pipeline
                .collect_limited(&AtLeast::new(2), black_box(input), 10)
                .expect("Traversal failed")
        });
    });

    c.bench_function("nth_distinct_first_100_of_10m", |b| {
        let stage = Nth::new(3)
            .expect("Invalid step")
            .and_then(DistinctBy::new(|x: &u64| x % 1000));
        b.iter(|| {
            pipeline
                .collect_limited(&stage, black_box(0..10_000_000u64), 100)
                .expect("Traversal failed")
        });
    });
}

fn benchmark_greedy_drain(c: &mut Criterion) {
    let pipeline = Pipeline::sequential();

    // Greedy stages consume everything even when the sink fills early
    c.bench_function("last_10_limited_to_1_of_1m", |b| {
        b.iter(|| {
            pipeline
                .collect_limited(&LastN::new(10), black_box(0..1_000_000u64), 1)
                .expect("Traversal failed")
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = benchmark_short_circuit, benchmark_greedy_drain
);
criterion_main!(benches);
