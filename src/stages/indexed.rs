//! Stages driven by each element's position in the input.
//!
//! Positions are counted per traversal from a configurable start index. None
//! of these stages combine partial state, because a split does not know how
//! many elements came before it.

use crate::error::{ensure_positive, Result};
use crate::sink::Sink;
use crate::stage::Stage;
use std::marker::PhantomData;

fn pair<T>(index: u64, element: T) -> (u64, T) {
    (index, element)
}

/// Maps every element together with its index
pub struct ZipWithIndex<T, R, M> {
    start_index: u64,
    mapper: M,
    _marker: PhantomData<fn(T) -> R>,
}

impl<T> ZipWithIndex<T, (u64, T), fn(u64, T) -> (u64, T)> {
    /// Emits `(index, element)` pairs starting at zero
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(start_index: u64) -> Self {
        Self::mapped(start_index, pair::<T> as fn(u64, T) -> (u64, T))
    }
}

impl<T> Default for ZipWithIndex<T, (u64, T), fn(u64, T) -> (u64, T)> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R, M> ZipWithIndex<T, R, M>
where
    M: Fn(u64, T) -> R,
{
    pub fn mapped(start_index: u64, mapper: M) -> Self {
        Self {
            start_index,
            mapper,
            _marker: PhantomData,
        }
    }
}

impl<T, R, M> Stage for ZipWithIndex<T, R, M>
where
    T: Send,
    M: Fn(u64, T) -> R + Send + Sync,
{
    type Input = T;
    type Output = R;
    type State = u64;

    fn name(&self) -> &str {
        "zip_with_index"
    }

    fn initializer(&self) -> u64 {
        self.start_index
    }

    fn integrate(&self, index: &mut u64, element: T, sink: &mut dyn Sink<R>) -> Result<bool> {
        let current = *index;
        *index += 1;
        Ok(sink.push((self.mapper)(current, element)))
    }
}

/// Keeps (or, in remove mode, drops) elements matching an index-aware
/// predicate
pub struct FilterWithIndex<T, P> {
    predicate: P,
    keep_matches: bool,
    start_index: u64,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T, P> FilterWithIndex<T, P>
where
    P: Fn(u64, &T) -> bool,
{
    /// Keep elements for which the predicate holds
    pub fn filter(predicate: P) -> Self {
        Self {
            predicate,
            keep_matches: true,
            start_index: 0,
            _marker: PhantomData,
        }
    }

    /// Drop elements for which the predicate holds
    pub fn remove(predicate: P) -> Self {
        Self {
            keep_matches: false,
            ..Self::filter(predicate)
        }
    }

    pub fn starting_at(mut self, start_index: u64) -> Self {
        self.start_index = start_index;
        self
    }
}

impl<T, P> Stage for FilterWithIndex<T, P>
where
    T: Send,
    P: Fn(u64, &T) -> bool + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = u64;

    fn name(&self) -> &str {
        if self.keep_matches {
            "filter_with_index"
        } else {
            "remove_with_index"
        }
    }

    fn initializer(&self) -> u64 {
        self.start_index
    }

    fn integrate(&self, index: &mut u64, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        let current = *index;
        *index += 1;
        if (self.predicate)(current, &element) == self.keep_matches {
            Ok(sink.push(element))
        } else {
            Ok(!sink.is_rejecting())
        }
    }
}

/// Shows every element and its index to a callback, passing it on unchanged
pub struct PeekWithIndex<T, C> {
    consumer: C,
    start_index: u64,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T, C> PeekWithIndex<T, C>
where
    C: Fn(u64, &T),
{
    pub fn new(consumer: C) -> Self {
        Self {
            consumer,
            start_index: 0,
            _marker: PhantomData,
        }
    }

    pub fn starting_at(mut self, start_index: u64) -> Self {
        self.start_index = start_index;
        self
    }
}

impl<T, C> Stage for PeekWithIndex<T, C>
where
    T: Send,
    C: Fn(u64, &T) + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = u64;

    fn name(&self) -> &str {
        "peek_with_index"
    }

    fn initializer(&self) -> u64 {
        self.start_index
    }

    fn integrate(&self, index: &mut u64, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        (self.consumer)(*index, &element);
        *index += 1;
        Ok(sink.push(element))
    }
}

/// Emits every `n`-th element, starting with the first
pub struct Nth<T> {
    n: u64,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> Nth<T> {
    pub fn new(n: usize) -> Result<Self> {
        Ok(Self {
            n: ensure_positive("n", n)? as u64,
            _marker: PhantomData,
        })
    }
}

impl<T: Send> Stage for Nth<T> {
    type Input = T;
    type Output = T;
    type State = u64;

    fn name(&self) -> &str {
        "nth"
    }

    fn initializer(&self) -> u64 {
        0
    }

    fn integrate(&self, seen: &mut u64, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        let position = *seen;
        *seen += 1;
        if position % self.n == 0 {
            Ok(sink.push(element))
        } else {
            Ok(!sink.is_rejecting())
        }
    }
}

/// Drops every `n`-th element (the `n`-th, `2n`-th, ...), keeping the rest
pub struct DropNth<T> {
    n: u64,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> DropNth<T> {
    pub fn new(n: usize) -> Result<Self> {
        Ok(Self {
            n: ensure_positive("n", n)? as u64,
            _marker: PhantomData,
        })
    }
}

impl<T: Send> Stage for DropNth<T> {
    type Input = T;
    type Output = T;
    type State = u64;

    fn name(&self) -> &str {
        "drop_nth"
    }

    fn initializer(&self) -> u64 {
        0
    }

    fn integrate(&self, seen: &mut u64, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        *seen += 1;
        if *seen % self.n != 0 {
            Ok(sink.push(element))
        } else {
            Ok(!sink.is_rejecting())
        }
    }
}
