use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use stream_stages::stages::{
    AtLeast, AtMost, DistinctBy, Extreme, IntoList, LastN, Order, OrderValidator, PeekWithIndex,
    Sample, Segmenting, WindowFixed,
};
use stream_stages::{
    FnSink, Pipeline, PipelineBuilder, PipelineError, SeededRandom, Stage, VecSink,
};

fn small_parallel() -> Pipeline {
    PipelineBuilder::new()
        .parallel()
        .min_split_len(16)
        .max_split_depth(4)
        .build()
        .expect("Pipeline build failed")
}

fn numbers() -> Vec<i32> {
    vec![1, 2, 3, 3, 3, 4, 5, 5, 6, 7, 8, 8, 8, 8, 9, 10]
}

#[test]
fn test_frequency_filters() {
    let pipeline = Pipeline::sequential();
    let at_least = pipeline
        .collect(&AtLeast::new(3), numbers())
        .expect("Traversal failed");
    assert_eq!(at_least, vec![3, 3, 3, 8, 8, 8, 8]);

    let at_most = pipeline
        .collect(&AtMost::new(2), numbers())
        .expect("Traversal failed");
    assert_eq!(at_most, vec![1, 2, 4, 5, 5, 6, 7, 9, 10]);
}

#[test]
fn test_stages_are_idempotent() {
    let pipeline = Pipeline::sequential();
    let input: Vec<i32> = (0..2000).map(|i| (i * 13) % 101).collect();

    let stage = AtLeast::new(4);
    assert_eq!(
        pipeline.collect(&stage, input.clone()).expect("Traversal failed"),
        pipeline.collect(&stage, input.clone()).expect("Traversal failed")
    );

    let stage = AtMost::new(19);
    assert_eq!(
        pipeline.collect(&stage, input.clone()).expect("Traversal failed"),
        pipeline.collect(&stage, input.clone()).expect("Traversal failed")
    );

    let stage = LastN::unique(8);
    assert_eq!(
        pipeline.collect(&stage, input.clone()).expect("Traversal failed"),
        pipeline.collect(&stage, input).expect("Traversal failed")
    );
}

#[test]
fn test_parallel_matches_sequential_for_combinable_stages() {
    let input: Vec<i32> = (0..5000).map(|i| (i * 7919) % 257).collect();
    let sequential = Pipeline::sequential();
    let parallel = small_parallel();

    let stage = AtMost::new(20);
    assert!(stage.is_combinable());
    assert_eq!(
        parallel.collect(&stage, input.clone()).expect("Parallel failed"),
        sequential.collect(&stage, input.clone()).expect("Sequential failed")
    );

    let stage = LastN::new(33);
    assert_eq!(
        parallel.collect(&stage, input.clone()).expect("Parallel failed"),
        sequential.collect(&stage, input.clone()).expect("Sequential failed")
    );

    let stage = Extreme::max_by(|x: &i32| *x);
    assert_eq!(
        parallel.collect(&stage, input.clone()).expect("Parallel failed"),
        sequential.collect(&stage, input.clone()).expect("Sequential failed")
    );

    let stage = IntoList::rotate(-17);
    assert_eq!(
        parallel.collect(&stage, input.clone()).expect("Parallel failed"),
        sequential.collect(&stage, input).expect("Sequential failed")
    );

    assert!(parallel.metrics().total_merges() > 0);
}

#[test]
fn test_non_combinable_stage_falls_back_to_sequential() {
    let pipeline = small_parallel();
    let result = pipeline
        .collect(&AtLeast::new(3), numbers())
        .expect("Traversal failed");
    assert_eq!(result, vec![3, 3, 3, 8, 8, 8, 8]);
    assert_eq!(pipeline.metrics().total_splits(), 0);
    assert_eq!(pipeline.metrics().total_traversals(), 1);
}

#[test]
fn test_chained_stages() {
    let stage = AtLeast::new(2)
        .and_then(DistinctBy::new(|x: &i32| *x))
        .and_then(LastN::new(2));
    assert_eq!(stage.name(), "at_least -> distinct_by -> last");

    let result = Pipeline::sequential()
        .collect(&stage, numbers())
        .expect("Traversal failed");
    assert_eq!(result, vec![5, 8]);
}

#[test]
fn test_chain_runs_in_parallel_when_both_halves_combine() {
    let text: Vec<String> = (0..200)
        .map(|i| format!("alpha beta{} gamma", i % 3))
        .collect();
    let stage = Segmenting::words().and_then(AtMost::new(70));
    assert!(stage.is_combinable());

    let sequential = Pipeline::sequential()
        .collect(&stage, text.clone())
        .expect("Sequential failed");
    let parallel = small_parallel()
        .collect(&stage, text)
        .expect("Parallel failed");
    assert_eq!(parallel, sequential);
    assert_eq!(sequential.len(), 66 + 67 + 67);
    assert!(sequential.iter().all(|w| w.starts_with("beta")));
}

#[test]
fn test_early_termination_limits_work() {
    let calls = AtomicUsize::new(0);
    let stage = PeekWithIndex::new(|_, _: &u64| {
        calls.fetch_add(1, Ordering::Relaxed);
    })
    .and_then(AtLeast::new(2));

    let input = (0..1_000_000u64).map(|i| i / 2);
    let result = Pipeline::sequential()
        .collect_limited(&stage, input, 6)
        .expect("Traversal failed");
    assert_eq!(result, vec![0, 0, 1, 1, 2, 2]);
    assert_eq!(calls.load(Ordering::Relaxed), 6);
}

#[test]
fn test_greedy_stage_drains_under_rejection() {
    let mut sink = VecSink::with_limit(3);
    Pipeline::sequential()
        .run(&LastN::new(10), 0..100, &mut sink)
        .expect("Traversal failed");
    assert_eq!(sink.into_inner(), vec![90, 91, 92]);
}

#[test]
fn test_function_sink_rejection() {
    let mut seen = Vec::new();
    let mut sink = FnSink::new(|x: i32| {
        seen.push(x);
        seen.len() < 2
    });
    Pipeline::sequential()
        .run(&AtLeast::new(1), 0..100, &mut sink)
        .expect("Traversal failed");
    assert_eq!(seen, vec![0, 1]);
}

#[test]
fn test_order_violation_aborts_traversal() {
    let stage = OrderValidator::new(Order::IncreasingOrEqual).and_then(LastN::new(5));
    let result = Pipeline::sequential().collect(&stage, vec![1, 2, 2, 5, 4, 6]);
    match result {
        Err(PipelineError::OrderViolation {
            position, expected, ..
        }) => {
            assert_eq!(position, 4);
            assert_eq!(expected, Order::IncreasingOrEqual);
        }
        other => panic!("expected an order violation, got {other:?}"),
    }
}

#[test]
fn test_sample_invariants() {
    let stage = Sample::new(25).with_random(SeededRandom::new(99));
    let input: Vec<u32> = (0..10_000).collect();
    let result = Pipeline::sequential()
        .collect(&stage, input.clone())
        .expect("Traversal failed");
    assert_eq!(result.len(), 25);
    let distinct: HashSet<_> = result.iter().collect();
    assert_eq!(distinct.len(), 25);

    let exact = Pipeline::sequential()
        .collect(&stage, input[..25].to_vec())
        .expect("Traversal failed");
    assert_eq!(exact, input[..25].to_vec());

    let parallel = small_parallel()
        .collect(&stage, input)
        .expect("Parallel failed");
    assert_eq!(parallel.len(), 25);
}

#[test]
fn test_zero_sized_stages_emit_nothing() {
    let pipeline = Pipeline::sequential();
    assert!(pipeline.collect(&LastN::new(0), 0..10).expect("Traversal failed").is_empty());
    assert!(pipeline.collect(&Sample::new(0), 0..10).expect("Traversal failed").is_empty());
    assert!(pipeline.collect(&AtMost::new(0), 0..10).expect("Traversal failed").is_empty());
}

#[test]
fn test_invalid_arguments_fail_at_construction() {
    assert!(matches!(
        Sample::<u8>::with_span(10, 10),
        Err(PipelineError::InvalidArgument { .. })
    ));
    assert!(matches!(
        WindowFixed::<u8, _, _>::new(0),
        Err(PipelineError::InvalidArgument { .. })
    ));
}

#[test]
fn test_metrics_snapshot() {
    let pipeline = small_parallel();
    pipeline
        .collect(&AtMost::new(1), 0..1000)
        .expect("Traversal failed");
    let snapshot = pipeline.metrics().snapshot();
    assert_eq!(snapshot.total_integrated, 1000);
    assert_eq!(snapshot.total_emitted, 1000);
    assert_eq!(snapshot.total_splits, 16);
    assert_eq!(snapshot.total_merges, 15);
    assert!(!snapshot.format().is_empty());
}
