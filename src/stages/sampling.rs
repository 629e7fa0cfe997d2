//! Bounded reservoir-style sampling.

use crate::error::{PipelineError, Result};
use crate::random::{EntropyRandom, RandomFactory, RandomSource};
use crate::sink::Sink;
use crate::stage::Stage;
use std::marker::PhantomData;

/// Chance that an inspected element replaces a resident one
const ACCEPTANCE: f64 = 0.1;

const MIN_AUTO_SPAN: usize = 1024;

/// Span used when the caller does not pick one: at least 1024, otherwise
/// twice the sample size, without overflowing for huge `n`
pub fn default_span(n: usize) -> usize {
    if n < MIN_AUTO_SPAN / 2 {
        MIN_AUTO_SPAN
    } else if n < usize::MAX / 2 {
        n * 2
    } else {
        n + (usize::MAX - n) / 2
    }
}

/// Keeps an approximately uniform sample of `n` elements from the first
/// `max_span` elements of the input.
///
/// The first `n` elements fill the sample. Each of the next `max_span - n`
/// elements overwrites a random slot with probability 0.1, and the stage
/// stops reading after that. Parallel splits keep the arrival index of every
/// slot, so a merge discards right-hand slots that fall past the span. The
/// sample is emitted in slot order, which is not necessarily arrival order.
pub struct Sample<T, G = EntropyRandom> {
    n: usize,
    max_span: usize,
    random: G,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> Sample<T, EntropyRandom> {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            max_span: default_span(n),
            random: EntropyRandom,
            _marker: PhantomData,
        }
    }

    /// Sample `n` elements out of at most `max_span` inspected ones
    pub fn with_span(n: usize, max_span: usize) -> Result<Self> {
        if max_span == 0 {
            return Err(PipelineError::InvalidArgument {
                name: "max_span",
                reason: "must be greater than zero".into(),
            });
        }
        if max_span <= n {
            return Err(PipelineError::InvalidArgument {
                name: "max_span",
                reason: format!("must be greater than the sample size {n}, got {max_span}"),
            });
        }
        Ok(Self {
            n,
            max_span,
            random: EntropyRandom,
            _marker: PhantomData,
        })
    }
}

impl<T, G> Sample<T, G> {
    /// Draw randomness from `random` instead of OS entropy
    pub fn with_random<H: RandomFactory>(self, random: H) -> Sample<T, H> {
        Sample {
            n: self.n,
            max_span: self.max_span,
            random,
            _marker: PhantomData,
        }
    }

    /// Get the number of elements kept in the sample
    pub fn size(&self) -> usize {
        self.n
    }

    /// Get the number of leading elements that are candidates for the sample
    pub fn max_span(&self) -> usize {
        self.max_span
    }
}

pub struct SampleState<T, R> {
    /// Sampled elements, each tagged with its arrival index within this state
    slots: Vec<(usize, T)>,
    /// Elements integrated so far, including ignored ones
    seen: usize,
    random: R,
}

impl<T, G> Stage for Sample<T, G>
where
    T: Send,
    G: RandomFactory,
{
    type Input = T;
    type Output = T;
    type State = SampleState<T, G::Source>;

    fn name(&self) -> &str {
        "sample"
    }

    fn initializer(&self) -> Self::State {
        SampleState {
            slots: Vec::with_capacity(self.n.min(4096)),
            seen: 0,
            random: self.random.create(),
        }
    }

    fn integrate(&self, state: &mut Self::State, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        if self.n == 0 || state.seen >= self.max_span {
            return Ok(false);
        }
        let index = state.seen;
        state.seen += 1;
        if state.slots.len() < self.n {
            state.slots.push((index, element));
        } else if state.random.next_unit() < ACCEPTANCE {
            let slot = state.random.next_index(state.slots.len());
            state.slots[slot] = (index, element);
        }
        // Everything past the span is ignored, so there is no point reading it
        Ok(state.seen < self.max_span && !sink.is_rejecting())
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, mut left: Self::State, right: Self::State) -> Result<Self::State> {
        let offset = left.seen;
        left.slots.extend(
            right
                .slots
                .into_iter()
                .map(|(index, element)| (index.saturating_add(offset), element))
                .filter(|(index, _)| *index < self.max_span),
        );
        while left.slots.len() > self.n {
            let slot = left.random.next_index(left.slots.len());
            left.slots.swap_remove(slot);
        }
        left.seen = left.seen.saturating_add(right.seen);
        Ok(left)
    }

    fn finish(&self, state: Self::State, sink: &mut dyn Sink<T>) -> Result<()> {
        for (_, element) in state.slots {
            if !sink.push(element) {
                break;
            }
        }
        Ok(())
    }
}
