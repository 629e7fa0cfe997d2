//! Fixed and sliding windows over the input.

use crate::buffer::BoundedDeque;
use crate::error::{ensure_positive, Result};
use crate::sink::Sink;
use crate::stage::Stage;
use std::marker::PhantomData;

fn window_only<T>(_index: u64, window: Vec<T>) -> Vec<T> {
    window
}

/// Non-overlapping windows of exactly `size` elements.
///
/// A trailing window with fewer than `size` elements is dropped. Each window
/// is handed to the mapper together with its index, counted from the start
/// index.
pub struct WindowFixed<T, R, M> {
    size: usize,
    start_index: u64,
    mapper: M,
    _marker: PhantomData<fn(T) -> R>,
}

impl<T> WindowFixed<T, Vec<T>, fn(u64, Vec<T>) -> Vec<T>> {
    pub fn new(size: usize) -> Result<Self> {
        Self::with_mapper(size, 0, window_only::<T> as fn(u64, Vec<T>) -> Vec<T>)
    }
}

impl<T, R, M> WindowFixed<T, R, M>
where
    M: Fn(u64, Vec<T>) -> R,
{
    pub fn with_mapper(size: usize, start_index: u64, mapper: M) -> Result<Self> {
        Ok(Self {
            size: ensure_positive("size", size)?,
            start_index,
            mapper,
            _marker: PhantomData,
        })
    }
}

pub struct FixedState<T> {
    window: Vec<T>,
    index: u64,
}

impl<T, R, M> Stage for WindowFixed<T, R, M>
where
    T: Send,
    M: Fn(u64, Vec<T>) -> R + Send + Sync,
{
    type Input = T;
    type Output = R;
    type State = FixedState<T>;

    fn name(&self) -> &str {
        "window_fixed"
    }

    fn initializer(&self) -> Self::State {
        FixedState {
            window: Vec::with_capacity(self.size.min(4096)),
            index: self.start_index,
        }
    }

    fn integrate(&self, state: &mut Self::State, element: T, sink: &mut dyn Sink<R>) -> Result<bool> {
        state.window.push(element);
        if state.window.len() < self.size {
            return Ok(!sink.is_rejecting());
        }

        let full = std::mem::replace(&mut state.window, Vec::with_capacity(self.size.min(4096)));
        let index = state.index;
        state.index += 1;
        Ok(sink.push((self.mapper)(index, full)))
    }
}

/// Overlapping windows of `size` elements, advancing one element at a time.
///
/// The first window is emitted once `size` elements have arrived, so input
/// shorter than `size` produces nothing.
pub struct WindowSliding<T, R, M> {
    size: usize,
    start_index: u64,
    mapper: M,
    _marker: PhantomData<fn(T) -> R>,
}

impl<T: Clone> WindowSliding<T, Vec<T>, fn(u64, Vec<T>) -> Vec<T>> {
    pub fn new(size: usize) -> Result<Self> {
        Self::with_mapper(size, 0, window_only::<T> as fn(u64, Vec<T>) -> Vec<T>)
    }
}

impl<T, R, M> WindowSliding<T, R, M>
where
    T: Clone,
    M: Fn(u64, Vec<T>) -> R,
{
    pub fn with_mapper(size: usize, start_index: u64, mapper: M) -> Result<Self> {
        Ok(Self {
            size: ensure_positive("size", size)?,
            start_index,
            mapper,
            _marker: PhantomData,
        })
    }
}

pub struct SlidingState<T> {
    window: BoundedDeque<T>,
    index: u64,
}

impl<T, R, M> Stage for WindowSliding<T, R, M>
where
    T: Clone + Send,
    M: Fn(u64, Vec<T>) -> R + Send + Sync,
{
    type Input = T;
    type Output = R;
    type State = SlidingState<T>;

    fn name(&self) -> &str {
        "window_sliding"
    }

    fn initializer(&self) -> Self::State {
        SlidingState {
            window: BoundedDeque::new(self.size),
            index: self.start_index,
        }
    }

    fn integrate(&self, state: &mut Self::State, element: T, sink: &mut dyn Sink<R>) -> Result<bool> {
        state.window.push_back(element);
        if !state.window.is_full() {
            return Ok(!sink.is_rejecting());
        }

        let index = state.index;
        state.index += 1;
        Ok(sink.push((self.mapper)(index, state.window.to_vec())))
    }
}
