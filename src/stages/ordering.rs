//! Order-aware stages: validation, monotonic filtering and run chunking.

use crate::error::{PipelineError, Result};
use crate::sink::Sink;
use crate::stage::Stage;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// Relation each element must keep with the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Increasing,
    IncreasingOrEqual,
    Decreasing,
    DecreasingOrEqual,
}

impl Order {
    /// Whether `next` may follow `prev`
    pub fn accepts<K: Ord + ?Sized>(self, prev: &K, next: &K) -> bool {
        self.accepts_ordering(prev.cmp(next))
    }

    /// Same as [`Order::accepts`] for an already computed `prev.cmp(next)`
    pub fn accepts_ordering(self, prev_to_next: Ordering) -> bool {
        match self {
            Order::Increasing => prev_to_next == Ordering::Less,
            Order::IncreasingOrEqual => prev_to_next != Ordering::Greater,
            Order::Decreasing => prev_to_next == Ordering::Greater,
            Order::DecreasingOrEqual => prev_to_next != Ordering::Less,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Order::Increasing => "increasing",
            Order::IncreasingOrEqual => "increasing or equal",
            Order::Decreasing => "decreasing",
            Order::DecreasingOrEqual => "decreasing or equal",
        };
        f.write_str(text)
    }
}

fn clone_key<T: Clone>(element: &T) -> T {
    element.clone()
}

/// Passes elements through unchanged and aborts the traversal with
/// [`PipelineError::OrderViolation`] at the first element whose key breaks
/// the required order.
///
/// Never combinable: the check spans the whole input in encounter order.
pub struct OrderValidator<T, K, F> {
    order: Order,
    key: F,
    name: String,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T> OrderValidator<T, T, fn(&T) -> T>
where
    T: Clone + Ord + Send,
{
    pub fn new(order: Order) -> Self {
        Self::by(order, clone_key::<T> as fn(&T) -> T)
    }
}

impl<T, K, F> OrderValidator<T, K, F>
where
    F: Fn(&T) -> K,
{
    pub fn by(order: Order, key: F) -> Self {
        Self {
            order,
            key,
            name: format!("ensure_{}", order).replace(' ', "_"),
            _marker: PhantomData,
        }
    }
}

/// Key of the previous element and the position of the next one
pub struct ValidatorState<K> {
    prev: Option<K>,
    position: u64,
}

impl<T, K, F> Stage for OrderValidator<T, K, F>
where
    K: Ord + Send,
    F: Fn(&T) -> K + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = ValidatorState<K>;

    fn name(&self) -> &str {
        &self.name
    }

    fn initializer(&self) -> Self::State {
        ValidatorState {
            prev: None,
            position: 0,
        }
    }

    fn integrate(&self, state: &mut Self::State, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        let key = (self.key)(&element);
        if let Some(prev) = &state.prev {
            if !self.order.accepts(prev, &key) {
                return Err(PipelineError::OrderViolation {
                    stage: self.name.clone(),
                    position: state.position,
                    expected: self.order,
                });
            }
        }
        state.prev = Some(key);
        state.position += 1;
        Ok(sink.push(element))
    }
}

/// Keeps only the elements that continue the order relative to the last
/// element kept; everything else is dropped.
pub struct Monotonic<T, C> {
    order: Order,
    compare: C,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Ord> Monotonic<T, fn(&T, &T) -> Ordering> {
    pub fn new(order: Order) -> Self {
        Self::with_comparator(order, T::cmp as fn(&T, &T) -> Ordering)
    }
}

impl<T, C> Monotonic<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn with_comparator(order: Order, compare: C) -> Self {
        Self {
            order,
            compare,
            _marker: PhantomData,
        }
    }
}

impl<T, C> Stage for Monotonic<T, C>
where
    T: Clone + Send,
    C: Fn(&T, &T) -> Ordering + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = Option<T>;

    fn name(&self) -> &str {
        "monotonic"
    }

    fn initializer(&self) -> Option<T> {
        None
    }

    fn integrate(&self, state: &mut Option<T>, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        let keep = match state {
            Some(last) => self.order.accepts_ordering((self.compare)(last, &element)),
            None => true,
        };
        if keep {
            *state = Some(element.clone());
            return Ok(sink.push(element));
        }
        Ok(!sink.is_rejecting())
    }
}

/// Splits the input into maximal runs in which every element keeps the
/// order relative to its predecessor. Each run is emitted as a `Vec`.
pub struct OrderedChunks<T, C> {
    order: Order,
    compare: C,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Ord> OrderedChunks<T, fn(&T, &T) -> Ordering> {
    pub fn new(order: Order) -> Self {
        Self::with_comparator(order, T::cmp as fn(&T, &T) -> Ordering)
    }
}

impl<T, C> OrderedChunks<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn with_comparator(order: Order, compare: C) -> Self {
        Self {
            order,
            compare,
            _marker: PhantomData,
        }
    }
}

impl<T, C> Stage for OrderedChunks<T, C>
where
    T: Send,
    C: Fn(&T, &T) -> Ordering + Send + Sync,
{
    type Input = T;
    type Output = Vec<T>;
    type State = Vec<T>;

    fn name(&self) -> &str {
        "ordered_chunks"
    }

    fn initializer(&self) -> Vec<T> {
        Vec::new()
    }

    fn integrate(&self, chunk: &mut Vec<T>, element: T, sink: &mut dyn Sink<Vec<T>>) -> Result<bool> {
        let continues = match chunk.last() {
            Some(prev) => self.order.accepts_ordering((self.compare)(prev, &element)),
            None => true,
        };
        if continues {
            chunk.push(element);
            return Ok(!sink.is_rejecting());
        }
        let full = std::mem::replace(chunk, vec![element]);
        Ok(sink.push(full))
    }

    fn finish(&self, chunk: Vec<T>, sink: &mut dyn Sink<Vec<T>>) -> Result<()> {
        if !chunk.is_empty() {
            sink.push(chunk);
        }
        Ok(())
    }
}

/// Splits the input into runs of elements with equal keys
pub struct EqualChunks<T, K, F> {
    key: F,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T> EqualChunks<T, T, fn(&T) -> T>
where
    T: Clone + PartialEq + Send,
{
    pub fn new() -> Self {
        Self::by(clone_key::<T> as fn(&T) -> T)
    }
}

impl<T> Default for EqualChunks<T, T, fn(&T) -> T>
where
    T: Clone + PartialEq + Send,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K, F> EqualChunks<T, K, F>
where
    F: Fn(&T) -> K,
{
    pub fn by(key: F) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }
}

/// Current run and the key shared by its elements
pub struct ChunkState<T, K> {
    key: Option<K>,
    chunk: Vec<T>,
}

impl<T, K, F> Stage for EqualChunks<T, K, F>
where
    T: Send,
    K: PartialEq + Send,
    F: Fn(&T) -> K + Send + Sync,
{
    type Input = T;
    type Output = Vec<T>;
    type State = ChunkState<T, K>;

    fn name(&self) -> &str {
        "equal_chunks"
    }

    fn initializer(&self) -> Self::State {
        ChunkState {
            key: None,
            chunk: Vec::new(),
        }
    }

    fn integrate(&self, state: &mut Self::State, element: T, sink: &mut dyn Sink<Vec<T>>) -> Result<bool> {
        let key = (self.key)(&element);
        if state.key.as_ref() == Some(&key) {
            state.chunk.push(element);
            return Ok(!sink.is_rejecting());
        }
        state.key = Some(key);
        let full = std::mem::replace(&mut state.chunk, vec![element]);
        if full.is_empty() {
            return Ok(!sink.is_rejecting());
        }
        Ok(sink.push(full))
    }

    fn finish(&self, state: Self::State, sink: &mut dyn Sink<Vec<T>>) -> Result<()> {
        if !state.chunk.is_empty() {
            sink.push(state.chunk);
        }
        Ok(())
    }
}
