use crate::error::{PipelineError, Result};
use crate::sink::Sink;

/// How a stage's integrator reacts to downstream rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    /// Consumes the whole input regardless of rejection. Used by stages that
    /// cannot emit anything correct before they have seen every element.
    Greedy,
    /// Stops as soon as downstream rejects
    ShortCircuit,
}

/// A stateful intermediate operation driven by the pipeline engine.
///
/// The stage value itself is immutable configuration. Everything that changes
/// during a traversal lives in `State`, created fresh by [`Stage::initializer`]
/// for every traversal and for every parallel split.
///
/// The engine calls, in order:
/// 1. `initializer` once per traversal or split
/// 2. `integrate` once per element, in input order, until it returns `false`
/// 3. `combine` to merge sibling splits left to right (only when
///    `is_combinable` is true)
/// 4. `finish` exactly once on the final, possibly merged, state
pub trait Stage: Send + Sync {
    type Input;
    type Output;
    type State: Send;

    /// Get a human-readable name for this stage
    fn name(&self) -> &str;

    fn integration(&self) -> Integration {
        Integration::ShortCircuit
    }

    /// Produce fresh, independent state
    fn initializer(&self) -> Self::State;

    /// Consume one element, pushing zero or more outputs.
    ///
    /// Returns whether the engine should keep feeding this stage. An `Err`
    /// aborts the whole traversal.
    fn integrate(
        &self,
        state: &mut Self::State,
        element: Self::Input,
        sink: &mut dyn Sink<Self::Output>,
    ) -> Result<bool>;

    /// Whether partial states from disjoint sub-ranges can be merged.
    /// Stages that return `false` are always run sequentially.
    fn is_combinable(&self) -> bool {
        false
    }

    /// Merge the state of a left sub-range with the state of the sub-range
    /// immediately to its right
    fn combine(&self, _left: Self::State, _right: Self::State) -> Result<Self::State> {
        Err(PipelineError::NotCombinable(self.name().to_string()))
    }

    /// Flush whatever the state still holds once its input is exhausted
    fn finish(&self, _state: Self::State, _sink: &mut dyn Sink<Self::Output>) -> Result<()> {
        Ok(())
    }

    /// Feed this stage's output into `next`
    fn and_then<B>(self, next: B) -> Chain<Self, B>
    where
        Self: Sized,
        B: Stage<Input = Self::Output>,
    {
        Chain::new(self, next)
    }
}

/// Sink that feeds pushed elements into a stage's integrator.
///
/// This is how one stage's output becomes the next stage's input. A fatal
/// error from the downstream integrator is parked here and surfaced by the
/// caller once control returns from the upstream stage.
pub(crate) struct Downstream<'a, S: Stage> {
    stage: &'a S,
    state: &'a mut S::State,
    sink: &'a mut dyn Sink<S::Output>,
    stopped: bool,
    error: Option<PipelineError>,
}

impl<'a, S: Stage> Downstream<'a, S> {
    pub(crate) fn new(
        stage: &'a S,
        state: &'a mut S::State,
        sink: &'a mut dyn Sink<S::Output>,
    ) -> Self {
        Self {
            stage,
            state,
            sink,
            stopped: false,
            error: None,
        }
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn take_error(&mut self) -> Option<PipelineError> {
        self.error.take()
    }
}

impl<S: Stage> Sink<S::Input> for Downstream<'_, S> {
    fn push(&mut self, item: S::Input) -> bool {
        if self.stopped {
            return false;
        }
        match self.stage.integrate(self.state, item, self.sink) {
            Ok(true) => true,
            Ok(false) => {
                self.stopped = true;
                false
            }
            Err(e) => {
                self.error = Some(e);
                self.stopped = true;
                false
            }
        }
    }

    fn is_rejecting(&self) -> bool {
        self.stopped || self.sink.is_rejecting()
    }
}

/// Two stages composed so that the first stage's output feeds the second
pub struct Chain<A, B> {
    first: A,
    second: B,
    name: String,
}

impl<A, B> Chain<A, B>
where
    A: Stage,
    B: Stage<Input = A::Output>,
{
    pub fn new(first: A, second: B) -> Self {
        let name = format!("{} -> {}", first.name(), second.name());
        Self {
            first,
            second,
            name,
        }
    }
}

/// State of a [`Chain`]: both halves plus whether the second stage has
/// already asked to stop
pub struct ChainState<A, B> {
    first: A,
    second: B,
    second_stopped: bool,
}

impl<A, B> Stage for Chain<A, B>
where
    A: Stage,
    B: Stage<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;
    type State = ChainState<A::State, B::State>;

    fn name(&self) -> &str {
        &self.name
    }

    fn integration(&self) -> Integration {
        match (self.first.integration(), self.second.integration()) {
            (Integration::Greedy, Integration::Greedy) => Integration::Greedy,
            _ => Integration::ShortCircuit,
        }
    }

    fn initializer(&self) -> Self::State {
        ChainState {
            first: self.first.initializer(),
            second: self.second.initializer(),
            second_stopped: false,
        }
    }

    fn integrate(
        &self,
        state: &mut Self::State,
        element: Self::Input,
        sink: &mut dyn Sink<Self::Output>,
    ) -> Result<bool> {
        if state.second_stopped {
            return Ok(false);
        }
        let mut downstream = Downstream::new(&self.second, &mut state.second, sink);
        let keep_going = self.first.integrate(&mut state.first, element, &mut downstream)?;
        if let Some(e) = downstream.take_error() {
            return Err(e);
        }
        let second_stopped = downstream.is_stopped();
        state.second_stopped = second_stopped;
        Ok(keep_going && !second_stopped)
    }

    fn is_combinable(&self) -> bool {
        self.first.is_combinable() && self.second.is_combinable()
    }

    fn combine(&self, left: Self::State, right: Self::State) -> Result<Self::State> {
        Ok(ChainState {
            first: self.first.combine(left.first, right.first)?,
            second: self.second.combine(left.second, right.second)?,
            second_stopped: left.second_stopped || right.second_stopped,
        })
    }

    fn finish(&self, state: Self::State, sink: &mut dyn Sink<Self::Output>) -> Result<()> {
        let ChainState {
            first,
            mut second,
            second_stopped,
        } = state;
        // A stopped second stage receives nothing more, not even the flush
        if !second_stopped {
            let mut downstream = Downstream::new(&self.second, &mut second, &mut *sink);
            self.first.finish(first, &mut downstream)?;
            if let Some(e) = downstream.take_error() {
                return Err(e);
            }
        }
        self.second.finish(second, sink)
    }
}
