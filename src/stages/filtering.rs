//! Stateless filters: by a mapped value, by key/value pairs, and by chance.

use crate::error::{PipelineError, Result};
use crate::random::{EntropyRandom, RandomFactory, RandomSource};
use crate::sink::Sink;
use crate::stage::Stage;
use std::marker::PhantomData;

fn equal<U: PartialEq>(mapped: &U, value: &U) -> bool {
    mapped == value
}

/// Keeps (or, in remove mode, drops) elements whose mapped value matches a
/// fixed value.
///
/// Matching defaults to equality; `filter_with` and `remove_with` take any
/// `(mapped, value)` predicate instead.
pub struct FilterBy<T, U, F, P> {
    mapper: F,
    value: U,
    predicate: P,
    keep_matches: bool,
    _marker: PhantomData<fn(&T)>,
}

impl<T, U, F> FilterBy<T, U, F, fn(&U, &U) -> bool>
where
    U: PartialEq,
    F: Fn(&T) -> U,
{
    /// Keep elements with `mapper(element) == value`
    pub fn filter(mapper: F, value: U) -> Self {
        Self::filter_with(mapper, value, equal::<U> as fn(&U, &U) -> bool)
    }

    /// Drop elements with `mapper(element) == value`
    pub fn remove(mapper: F, value: U) -> Self {
        Self::remove_with(mapper, value, equal::<U> as fn(&U, &U) -> bool)
    }
}

impl<T, U, F, P> FilterBy<T, U, F, P>
where
    F: Fn(&T) -> U,
    P: Fn(&U, &U) -> bool,
{
    pub fn filter_with(mapper: F, value: U, predicate: P) -> Self {
        Self {
            mapper,
            value,
            predicate,
            keep_matches: true,
            _marker: PhantomData,
        }
    }

    pub fn remove_with(mapper: F, value: U, predicate: P) -> Self {
        Self {
            keep_matches: false,
            ..Self::filter_with(mapper, value, predicate)
        }
    }
}

impl<T, U, F, P> Stage for FilterBy<T, U, F, P>
where
    T: Send,
    U: Send + Sync,
    F: Fn(&T) -> U + Send + Sync,
    P: Fn(&U, &U) -> bool + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = ();

    fn name(&self) -> &str {
        if self.keep_matches {
            "filter_by"
        } else {
            "remove_by"
        }
    }

    fn initializer(&self) {}

    fn integrate(&self, _: &mut (), element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        let matches = (self.predicate)(&(self.mapper)(&element), &self.value);
        if matches == self.keep_matches {
            Ok(sink.push(element))
        } else {
            Ok(!sink.is_rejecting())
        }
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, _: (), _: ()) -> Result<()> {
        Ok(())
    }
}

/// Keeps (or drops) `(key, value)` pairs matching a predicate over both halves
pub struct FilterEntries<K, V, P> {
    predicate: P,
    keep_matches: bool,
    _marker: PhantomData<fn(&K, &V)>,
}

impl<K, V, P> FilterEntries<K, V, P>
where
    P: Fn(&K, &V) -> bool,
{
    pub fn filter(predicate: P) -> Self {
        Self {
            predicate,
            keep_matches: true,
            _marker: PhantomData,
        }
    }

    pub fn remove(predicate: P) -> Self {
        Self {
            keep_matches: false,
            ..Self::filter(predicate)
        }
    }
}

impl<K, V, P> Stage for FilterEntries<K, V, P>
where
    K: Send,
    V: Send,
    P: Fn(&K, &V) -> bool + Send + Sync,
{
    type Input = (K, V);
    type Output = (K, V);
    type State = ();

    fn name(&self) -> &str {
        if self.keep_matches {
            "filter_entries"
        } else {
            "remove_entries"
        }
    }

    fn initializer(&self) {}

    fn integrate(&self, _: &mut (), entry: (K, V), sink: &mut dyn Sink<(K, V)>) -> Result<bool> {
        if (self.predicate)(&entry.0, &entry.1) == self.keep_matches {
            Ok(sink.push(entry))
        } else {
            Ok(!sink.is_rejecting())
        }
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, _: (), _: ()) -> Result<()> {
        Ok(())
    }
}

/// Keeps each element independently with a fixed probability
pub struct RandomFilter<T, G = EntropyRandom> {
    probability: f64,
    random: G,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> RandomFilter<T, EntropyRandom> {
    /// `probability` must lie in `[0, 1]`
    pub fn new(probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(PipelineError::InvalidArgument {
                name: "probability",
                reason: format!("must be within [0, 1], got {probability}"),
            });
        }
        Ok(Self {
            probability,
            random: EntropyRandom,
            _marker: PhantomData,
        })
    }
}

impl<T, G> RandomFilter<T, G> {
    pub fn with_random<H: RandomFactory>(self, random: H) -> RandomFilter<T, H> {
        RandomFilter {
            probability: self.probability,
            random,
            _marker: PhantomData,
        }
    }

    /// Get the chance that an element is kept
    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl<T, G> Stage for RandomFilter<T, G>
where
    T: Send,
    G: RandomFactory,
{
    type Input = T;
    type Output = T;
    type State = G::Source;

    fn name(&self) -> &str {
        "random_filter"
    }

    fn initializer(&self) -> G::Source {
        self.random.create()
    }

    fn integrate(&self, random: &mut G::Source, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        // next_unit is in [0, 1): probability 0 keeps nothing, 1 keeps everything
        if random.next_unit() < self.probability {
            Ok(sink.push(element))
        } else {
            Ok(!sink.is_rejecting())
        }
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, left: G::Source, _right: G::Source) -> Result<G::Source> {
        Ok(left)
    }
}
