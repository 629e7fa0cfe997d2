use crate::error::Result;
use crate::sink::Sink;
use crate::stage::{Integration, Stage};
use std::cmp::Ordering;
use std::marker::PhantomData;

/// Which end of the key ordering to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

/// Emits the single element with the smallest or largest key.
///
/// Among elements with equal keys the first one wins. Empty input emits
/// nothing.
pub struct Extreme<T, K, F> {
    extremum: Extremum,
    key: F,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T, K, F> Extreme<T, K, F>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    pub fn min_by(key: F) -> Self {
        Self {
            extremum: Extremum::Min,
            key,
            _marker: PhantomData,
        }
    }

    pub fn max_by(key: F) -> Self {
        Self {
            extremum: Extremum::Max,
            key,
            _marker: PhantomData,
        }
    }

    /// Whether `candidate` strictly beats `current`
    fn beats(&self, candidate: &K, current: &K) -> bool {
        let wanted = match self.extremum {
            Extremum::Min => Ordering::Less,
            Extremum::Max => Ordering::Greater,
        };
        candidate.cmp(current) == wanted
    }
}

impl<T, K, F> Stage for Extreme<T, K, F>
where
    T: Send,
    K: Ord + Send,
    F: Fn(&T) -> K + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = Option<(K, T)>;

    fn name(&self) -> &str {
        match self.extremum {
            Extremum::Min => "min_by",
            Extremum::Max => "max_by",
        }
    }

    fn integration(&self) -> Integration {
        Integration::Greedy
    }

    fn initializer(&self) -> Self::State {
        None
    }

    fn integrate(&self, state: &mut Self::State, element: T, _sink: &mut dyn Sink<T>) -> Result<bool> {
        let key = (self.key)(&element);
        let replace = match state {
            Some((current, _)) => self.beats(&key, current),
            None => true,
        };
        if replace {
            *state = Some((key, element));
        }
        Ok(true)
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, left: Self::State, right: Self::State) -> Result<Self::State> {
        Ok(match (left, right) {
            (Some(l), Some(r)) => {
                if self.beats(&r.0, &l.0) {
                    Some(r)
                } else {
                    Some(l)
                }
            }
            (l, None) => l,
            (None, r) => r,
        })
    }

    fn finish(&self, state: Self::State, sink: &mut dyn Sink<T>) -> Result<()> {
        if let Some((_, element)) = state {
            sink.push(element);
        }
        Ok(())
    }
}
