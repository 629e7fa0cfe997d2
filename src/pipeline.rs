use crate::backpressure::Gate;
use crate::error::{PipelineError, Result};
use crate::metrics::TraversalMetrics;
use crate::sink::{Sink, VecSink};
use crate::stage::{Integration, Stage};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// How a pipeline drives a stage over its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One state, one thread, input order
    Sequential,
    /// Divide-and-conquer over contiguous sub-ranges, merged left to right
    Parallel,
}

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    mode: ExecutionMode,
    min_split_len: usize,
    max_split_depth: usize,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            min_split_len: DEFAULT_MIN_SPLIT_LEN,
            max_split_depth: default_split_depth(),
        }
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `mode(ExecutionMode::Parallel)`
    pub fn parallel(self) -> Self {
        self.mode(ExecutionMode::Parallel)
    }

    /// Sub-ranges at or below this length are not split further
    pub fn min_split_len(mut self, len: usize) -> Self {
        self.min_split_len = len;
        self
    }

    /// Maximum number of halvings; the input is cut into at most
    /// `2^depth` leaf ranges
    pub fn max_split_depth(mut self, depth: usize) -> Self {
        self.max_split_depth = depth;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if self.min_split_len == 0 {
            return Err(PipelineError::ConfigError(
                "min_split_len must be greater than zero".into(),
            ));
        }
        if self.mode == ExecutionMode::Parallel && self.max_split_depth == 0 {
            return Err(PipelineError::ConfigError(
                "max_split_depth must be greater than zero in parallel mode".into(),
            ));
        }

        Ok(Pipeline {
            mode: self.mode,
            min_split_len: self.min_split_len,
            max_split_depth: self.max_split_depth,
            metrics: TraversalMetrics::new(),
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

const DEFAULT_MIN_SPLIT_LEN: usize = 1024;

/// Enough halvings to give every available core a leaf
fn default_split_depth() -> usize {
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let depth = (usize::BITS - (threads - 1).leading_zeros()) as usize;
    depth.max(1)
}

/// Drives stages over input sequences.
///
/// A pipeline owns no stage state between traversals; every call to `run`
/// starts from fresh states produced by the stage's initializer.
pub struct Pipeline {
    mode: ExecutionMode,
    min_split_len: usize,
    max_split_depth: usize,
    metrics: TraversalMetrics,
}

/// Outcome of evaluating one sub-range in parallel mode
struct Partial<S: Stage> {
    state: S::State,
    emitted: Vec<S::Output>,
    stopped: bool,
}

impl Pipeline {
    /// A sequential pipeline with default settings
    pub fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            min_split_len: DEFAULT_MIN_SPLIT_LEN,
            max_split_depth: default_split_depth(),
            metrics: TraversalMetrics::new(),
        }
    }

    /// A parallel pipeline with default settings
    pub fn parallel() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            ..Self::sequential()
        }
    }

    /// Get the execution mode
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Get the counters accumulated over every traversal run so far
    pub fn metrics(&self) -> &TraversalMetrics {
        &self.metrics
    }

    /// Run `stage` over `input`, pushing results into `sink`.
    ///
    /// In parallel mode a stage that cannot combine partial state is run
    /// sequentially instead.
    pub fn run<S, I>(&self, stage: &S, input: I, sink: &mut dyn Sink<S::Output>) -> Result<()>
    where
        S: Stage,
        S::Input: Send,
        S::Output: Send,
        I: IntoIterator<Item = S::Input>,
    {
        match self.mode {
            ExecutionMode::Sequential => self.run_sequential(stage, input, sink),
            ExecutionMode::Parallel if !stage.is_combinable() => {
                warn!(
                    stage = stage.name(),
                    "stage cannot combine partial state, falling back to sequential traversal"
                );
                self.run_sequential(stage, input, sink)
            }
            ExecutionMode::Parallel => {
                self.run_parallel(stage, input.into_iter().collect(), sink)
            }
        }
    }

    /// Run `stage` over `input` on the calling thread with a single state
    pub fn run_sequential<S, I>(
        &self,
        stage: &S,
        input: I,
        sink: &mut dyn Sink<S::Output>,
    ) -> Result<()>
    where
        S: Stage,
        I: IntoIterator<Item = S::Input>,
    {
        self.metrics.record_traversal();
        debug!(stage = stage.name(), "starting sequential traversal");

        let short_circuit = stage.integration() == Integration::ShortCircuit;
        let mut gate = Gate::new(sink);
        let mut state = stage.initializer();
        let mut integrated = 0u64;

        for element in input {
            if short_circuit && gate.is_rejecting() {
                trace!(stage = stage.name(), integrated, "downstream rejecting, stopping");
                break;
            }
            integrated += 1;
            match stage.integrate(&mut state, element, &mut gate) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.metrics.record_integrated(integrated);
                    return Err(e);
                }
            }
        }
        self.metrics.record_integrated(integrated);

        stage.finish(state, &mut gate)?;
        self.metrics.record_emitted(gate.accepted());

        debug!(
            stage = stage.name(),
            integrated,
            emitted = gate.accepted(),
            "finished sequential traversal"
        );
        Ok(())
    }

    fn run_parallel<S>(
        &self,
        stage: &S,
        input: Vec<S::Input>,
        sink: &mut dyn Sink<S::Output>,
    ) -> Result<()>
    where
        S: Stage,
        S::Input: Send,
        S::Output: Send,
    {
        self.metrics.record_traversal();
        debug!(
            stage = stage.name(),
            elements = input.len(),
            max_depth = self.max_split_depth,
            "starting parallel traversal"
        );

        let partial = self.evaluate(stage, input, self.max_split_depth)?;

        let mut gate = Gate::new(sink);
        for item in partial.emitted {
            if !gate.push(item) {
                break;
            }
        }
        stage.finish(partial.state, &mut gate)?;
        self.metrics.record_emitted(gate.accepted());

        debug!(
            stage = stage.name(),
            emitted = gate.accepted(),
            "finished parallel traversal"
        );
        Ok(())
    }

    fn evaluate<S>(&self, stage: &S, mut input: Vec<S::Input>, depth: usize) -> Result<Partial<S>>
    where
        S: Stage,
        S::Input: Send,
        S::Output: Send,
    {
        if depth == 0 || input.len() <= self.min_split_len {
            return self.evaluate_leaf(stage, input);
        }

        let right_input = input.split_off(input.len() / 2);
        trace!(
            stage = stage.name(),
            left = input.len(),
            right = right_input.len(),
            depth,
            "splitting range"
        );

        let (left, right) = crossbeam::thread::scope(|scope| {
            let right = scope.spawn(move |_| self.evaluate(stage, right_input, depth - 1));
            let left = self.evaluate(stage, input, depth - 1);
            (left, right.join())
        })
        .map_err(|_| PipelineError::ThreadError("parallel split scope panicked".into()))?;
        let right =
            right.map_err(|_| PipelineError::ThreadError("right split panicked".into()))?;

        self.merge(stage, left?, right?)
    }

    fn evaluate_leaf<S>(&self, stage: &S, input: Vec<S::Input>) -> Result<Partial<S>>
    where
        S: Stage,
    {
        let started = Instant::now();
        let mut state = stage.initializer();
        let mut buffer = VecSink::new();
        let mut stopped = false;
        let mut integrated = 0u64;

        for element in input {
            integrated += 1;
            if !stage.integrate(&mut state, element, &mut buffer)? {
                stopped = true;
                break;
            }
        }

        self.metrics.record_integrated(integrated);
        self.metrics.record_split(started.elapsed());
        trace!(stage = stage.name(), integrated, stopped, "evaluated leaf range");

        Ok(Partial {
            state,
            emitted: buffer.into_inner(),
            stopped,
        })
    }

    fn merge<S>(&self, stage: &S, mut left: Partial<S>, right: Partial<S>) -> Result<Partial<S>>
    where
        S: Stage,
    {
        // A sequential run would never have reached the right range
        if left.stopped {
            trace!(stage = stage.name(), "left range stopped early, discarding right range");
            return Ok(left);
        }

        let state = stage.combine(left.state, right.state)?;
        self.metrics.record_merge();
        left.emitted.extend(right.emitted);

        Ok(Partial {
            state,
            emitted: left.emitted,
            stopped: right.stopped,
        })
    }

    /// Run `stage` and collect everything it emits
    pub fn collect<S, I>(&self, stage: &S, input: I) -> Result<Vec<S::Output>>
    where
        S: Stage,
        S::Input: Send,
        S::Output: Send,
        I: IntoIterator<Item = S::Input>,
    {
        let mut sink = VecSink::new();
        self.run(stage, input, &mut sink)?;
        Ok(sink.into_inner())
    }

    /// Run `stage` and collect at most `limit` elements. The collector starts
    /// rejecting once full, so short-circuiting stages stop early.
    pub fn collect_limited<S, I>(&self, stage: &S, input: I, limit: usize) -> Result<Vec<S::Output>>
    where
        S: Stage,
        S::Input: Send,
        S::Output: Send,
        I: IntoIterator<Item = S::Input>,
    {
        let mut sink = VecSink::with_limit(limit);
        self.run(stage, input, &mut sink)?;
        Ok(sink.into_inner())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::sequential()
    }
}
