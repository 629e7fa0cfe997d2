//! Adapting a four-function reduction into a stage.

use crate::error::Result;
use crate::sink::Sink;
use crate::stage::{Integration, Stage};
use std::marker::PhantomData;

/// A mutable reduction over elements of type `T`.
///
/// `seed` creates an empty accumulator, `accumulate` folds one element in,
/// `combine` merges the accumulator of a left sub-range with that of the
/// sub-range to its right, and `finish` turns the accumulator into the
/// result.
pub trait Reducer<T>: Send + Sync {
    type Acc: Send;
    type Output;

    fn seed(&self) -> Self::Acc;

    fn accumulate(&self, acc: &mut Self::Acc, element: T);

    fn combine(&self, left: Self::Acc, right: Self::Acc) -> Self::Acc;

    fn finish(&self, acc: Self::Acc) -> Self::Output;
}

/// [`Reducer`] built from four closures
pub struct FnReducer<S, A, C, F> {
    seed: S,
    accumulate: A,
    combine: C,
    finish: F,
}

impl<S, A, C, F> FnReducer<S, A, C, F> {
    pub fn new(seed: S, accumulate: A, combine: C, finish: F) -> Self {
        Self {
            seed,
            accumulate,
            combine,
            finish,
        }
    }
}

impl<T, Acc, Out, S, A, C, F> Reducer<T> for FnReducer<S, A, C, F>
where
    Acc: Send,
    S: Fn() -> Acc + Send + Sync,
    A: Fn(&mut Acc, T) + Send + Sync,
    C: Fn(Acc, Acc) -> Acc + Send + Sync,
    F: Fn(Acc) -> Out + Send + Sync,
{
    type Acc = Acc;
    type Output = Out;

    fn seed(&self) -> Acc {
        (self.seed)()
    }

    fn accumulate(&self, acc: &mut Acc, element: T) {
        (self.accumulate)(acc, element)
    }

    fn combine(&self, left: Acc, right: Acc) -> Acc {
        (self.combine)(left, right)
    }

    fn finish(&self, acc: Acc) -> Out {
        (self.finish)(acc)
    }
}

/// Runs a [`Reducer`] over the whole input and pushes its single result
pub struct Reducing<T, R> {
    reducer: R,
    _marker: PhantomData<fn(T)>,
}

impl<T, R: Reducer<T>> Reducing<T, R> {
    pub fn new(reducer: R) -> Self {
        Self {
            reducer,
            _marker: PhantomData,
        }
    }
}

impl<T, R> Stage for Reducing<T, R>
where
    R: Reducer<T>,
{
    type Input = T;
    type Output = R::Output;
    type State = R::Acc;

    fn name(&self) -> &str {
        "reducing"
    }

    fn integration(&self) -> Integration {
        Integration::Greedy
    }

    fn initializer(&self) -> R::Acc {
        self.reducer.seed()
    }

    fn integrate(&self, acc: &mut R::Acc, element: T, _sink: &mut dyn Sink<R::Output>) -> Result<bool> {
        self.reducer.accumulate(acc, element);
        Ok(true)
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, left: R::Acc, right: R::Acc) -> Result<R::Acc> {
        Ok(self.reducer.combine(left, right))
    }

    fn finish(&self, acc: R::Acc, sink: &mut dyn Sink<R::Output>) -> Result<()> {
        sink.push(self.reducer.finish(acc));
        Ok(())
    }
}
