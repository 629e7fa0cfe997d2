//! Stages that care about the tail of the input.

use crate::buffer::BoundedDeque;
use crate::error::Result;
use crate::sink::Sink;
use crate::stage::{Integration, Stage};
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

fn clone_key<T: Clone>(element: &T) -> T {
    element.clone()
}

/// Emits the last `n` elements, oldest first.
///
/// In unique mode an element whose key is already resident is ignored, so the
/// resident copy keeps its slot. The result is then the last `n` distinct keys
/// by their earliest occurrence still in the window.
pub struct LastN<T, K, F> {
    n: usize,
    key: Option<F>,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T> LastN<T, T, fn(&T) -> T>
where
    T: Clone + Eq + Hash,
{
    pub fn new(n: usize) -> Self {
        Self {
            n,
            key: None,
            _marker: PhantomData,
        }
    }

    /// Last `n` distinct elements
    pub fn unique(n: usize) -> Self {
        Self::unique_by(n, clone_key::<T> as fn(&T) -> T)
    }
}

impl<T, K, F> LastN<T, K, F>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    /// Last `n` elements with distinct `key(element)`
    pub fn unique_by(n: usize, key: F) -> Self {
        Self {
            n,
            key: Some(key),
            _marker: PhantomData,
        }
    }

    /// Check whether repeated keys are ignored
    pub fn is_unique(&self) -> bool {
        self.key.is_some()
    }
}

pub struct LastState<T, K> {
    recent: BoundedDeque<T>,
    /// Keys of the resident elements, unique mode only
    resident: HashSet<K>,
}

impl<T, K, F> Stage for LastN<T, K, F>
where
    T: Send,
    K: Eq + Hash + Send,
    F: Fn(&T) -> K + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = LastState<T, K>;

    fn name(&self) -> &str {
        if self.is_unique() {
            "last_unique"
        } else {
            "last"
        }
    }

    fn integration(&self) -> Integration {
        if self.n == 0 {
            Integration::ShortCircuit
        } else {
            Integration::Greedy
        }
    }

    fn initializer(&self) -> Self::State {
        LastState {
            recent: BoundedDeque::new(self.n),
            resident: HashSet::new(),
        }
    }

    fn integrate(&self, state: &mut Self::State, element: T, _sink: &mut dyn Sink<T>) -> Result<bool> {
        if self.n == 0 {
            return Ok(false);
        }

        let Some(key_of) = &self.key else {
            state.recent.push_back(element);
            return Ok(true);
        };

        let key = key_of(&element);
        if state.resident.contains(&key) {
            return Ok(true);
        }
        if let Some(evicted) = state.recent.push_back(element) {
            state.resident.remove(&key_of(&evicted));
        }
        state.resident.insert(key);
        Ok(true)
    }

    /// Only plain mode merges: a unique window depends on keys that may have
    /// been evicted on the left before they reappear on the right
    fn is_combinable(&self) -> bool {
        !self.is_unique()
    }

    fn combine(&self, mut left: Self::State, right: Self::State) -> Result<Self::State> {
        left.recent.extend_from(right.recent);
        Ok(left)
    }

    fn finish(&self, state: Self::State, sink: &mut dyn Sink<T>) -> Result<()> {
        for element in state.recent {
            if !sink.push(element) {
                break;
            }
        }
        Ok(())
    }
}

/// Emits everything except the last `n` elements.
///
/// At most `n` elements are held back at any time; each new arrival pushes
/// the oldest held one downstream.
pub struct DropLast<T> {
    n: usize,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> DropLast<T> {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            _marker: PhantomData,
        }
    }
}

impl<T: Send> Stage for DropLast<T> {
    type Input = T;
    type Output = T;
    type State = BoundedDeque<T>;

    fn name(&self) -> &str {
        "drop_last"
    }

    fn initializer(&self) -> Self::State {
        BoundedDeque::new(self.n)
    }

    fn integrate(&self, state: &mut Self::State, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        match state.push_back(element) {
            Some(released) => Ok(sink.push(released)),
            None => Ok(!sink.is_rejecting()),
        }
    }
}
