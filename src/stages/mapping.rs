//! Element-wise mapping stages that only map some of their input, plus
//! zipping against a second sequence and the pass-through [`Identity`].

use crate::error::Result;
use crate::sink::Sink;
use crate::stage::{Integration, Stage};
use std::marker::PhantomData;

/// Passes every element through unchanged
pub struct Identity<T> {
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> Identity<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Identity<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> Stage for Identity<T> {
    type Input = T;
    type Output = T;
    type State = ();

    fn name(&self) -> &str {
        "identity"
    }

    fn initializer(&self) {}

    fn integrate(&self, _: &mut (), element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        Ok(sink.push(element))
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, _: (), _: ()) -> Result<()> {
        Ok(())
    }
}

/// Passes every element through, mapping a contiguous run of them.
///
/// The first `skip` elements pass unchanged, the next `limit` elements (all of
/// them when `limit` is `None`) go through `mapper`, and the rest pass
/// unchanged again.
pub struct SkipAndMap<T, F> {
    skip: usize,
    limit: Option<usize>,
    mapper: F,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T, F> SkipAndMap<T, F>
where
    F: Fn(T) -> T,
{
    /// Map only the first element
    pub fn first(mapper: F) -> Self {
        Self::skip_then_map_n(0, 1, mapper)
    }

    /// Map the first `n` elements
    pub fn map_n(n: usize, mapper: F) -> Self {
        Self::skip_then_map_n(0, n, mapper)
    }

    /// Map everything after the first `skip` elements
    pub fn skip_then_map(skip: usize, mapper: F) -> Self {
        Self {
            skip,
            limit: None,
            mapper,
            _marker: PhantomData,
        }
    }

    /// Map `n` elements after the first `skip`
    pub fn skip_then_map_n(skip: usize, n: usize, mapper: F) -> Self {
        Self {
            limit: Some(n),
            ..Self::skip_then_map(skip, mapper)
        }
    }
}

impl<T, F> Stage for SkipAndMap<T, F>
where
    T: Send,
    F: Fn(T) -> T + Send + Sync,
{
    type Input = T;
    type Output = T;
    /// Elements seen so far
    type State = usize;

    fn name(&self) -> &str {
        "skip_and_map"
    }

    fn initializer(&self) -> usize {
        0
    }

    fn integrate(&self, seen: &mut usize, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        let position = *seen;
        *seen = seen.saturating_add(1);
        let mapped = position
            .checked_sub(self.skip)
            .is_some_and(|offset| self.limit.map_or(true, |limit| offset < limit));
        if mapped {
            Ok(sink.push((self.mapper)(element)))
        } else {
            Ok(sink.push(element))
        }
    }
}

/// Maps elements until a predicate flips, then passes the rest unchanged.
///
/// In while mode mapping stops at the first element the predicate rejects; in
/// until mode it stops at the first element the predicate accepts. The element
/// that flips the predicate is itself passed unchanged.
pub struct MapWhile<T, F, P> {
    mapper: F,
    predicate: P,
    stop_on: bool,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T, F, P> MapWhile<T, F, P>
where
    F: Fn(T) -> T,
    P: Fn(&T) -> bool,
{
    /// Map while `predicate` holds
    pub fn new(mapper: F, predicate: P) -> Self {
        Self {
            mapper,
            predicate,
            stop_on: false,
            _marker: PhantomData,
        }
    }

    /// Map until `predicate` holds
    pub fn until(mapper: F, predicate: P) -> Self {
        Self {
            stop_on: true,
            ..Self::new(mapper, predicate)
        }
    }
}

impl<T, F, P> Stage for MapWhile<T, F, P>
where
    T: Send,
    F: Fn(T) -> T + Send + Sync,
    P: Fn(&T) -> bool + Send + Sync,
{
    type Input = T;
    type Output = T;
    /// Whether mapping is still on
    type State = bool;

    fn name(&self) -> &str {
        if self.stop_on {
            "map_until"
        } else {
            "map_while"
        }
    }

    fn initializer(&self) -> bool {
        true
    }

    fn integrate(&self, mapping: &mut bool, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        if *mapping && (self.predicate)(&element) == self.stop_on {
            *mapping = false;
        }
        if *mapping {
            Ok(sink.push((self.mapper)(element)))
        } else {
            Ok(sink.push(element))
        }
    }
}

/// Replaces elements matching a predicate with the elements of
/// `mapper(element)`; everything else passes through
pub struct FlatMapIf<T, I, F, P> {
    mapper: F,
    predicate: P,
    _marker: PhantomData<fn(T) -> I>,
}

impl<T, I, F, P> FlatMapIf<T, I, F, P>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> I,
    P: Fn(&T) -> bool,
{
    pub fn new(mapper: F, predicate: P) -> Self {
        Self {
            mapper,
            predicate,
            _marker: PhantomData,
        }
    }
}

impl<T, I, F, P> Stage for FlatMapIf<T, I, F, P>
where
    T: Send,
    I: IntoIterator<Item = T>,
    F: Fn(T) -> I + Send + Sync,
    P: Fn(&T) -> bool + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = ();

    fn name(&self) -> &str {
        "flat_map_if"
    }

    fn initializer(&self) {}

    fn integrate(&self, _: &mut (), element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        if !(self.predicate)(&element) {
            return Ok(sink.push(element));
        }
        for item in (self.mapper)(element) {
            if !sink.push(item) {
                return Ok(false);
            }
        }
        Ok(!sink.is_rejecting())
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, _: (), _: ()) -> Result<()> {
        Ok(())
    }
}

fn pair<T, U>(element: T, other: U) -> (T, U) {
    (element, other)
}

/// Pairs every element with the next value of a second sequence.
///
/// Each traversal iterates a fresh clone of `other`. The traversal stops when
/// `other` runs out, so the output is as long as the shorter of the two.
pub struct Zip<T, U, V, I, F> {
    other: I,
    mapper: F,
    _marker: PhantomData<fn(T, U) -> V>,
}

impl<T, U, I> Zip<T, U, (T, U), I, fn(T, U) -> (T, U)>
where
    I: IntoIterator<Item = U> + Clone,
{
    /// Emits `(element, other)` pairs
    pub fn new(other: I) -> Self {
        Self::with(other, pair::<T, U> as fn(T, U) -> (T, U))
    }
}

impl<T, U, V, I, F> Zip<T, U, V, I, F>
where
    I: IntoIterator<Item = U> + Clone,
    F: Fn(T, U) -> V,
{
    /// Combine each pair with `mapper`
    pub fn with(other: I, mapper: F) -> Self {
        Self {
            other,
            mapper,
            _marker: PhantomData,
        }
    }
}

impl<T, U, V, I, F> Stage for Zip<T, U, V, I, F>
where
    T: Send,
    I: IntoIterator<Item = U> + Clone + Send + Sync,
    I::IntoIter: Send,
    F: Fn(T, U) -> V + Send + Sync,
{
    type Input = T;
    type Output = V;
    type State = I::IntoIter;

    fn name(&self) -> &str {
        "zip"
    }

    fn integration(&self) -> Integration {
        Integration::Greedy
    }

    fn initializer(&self) -> I::IntoIter {
        self.other.clone().into_iter()
    }

    fn integrate(&self, other: &mut I::IntoIter, element: T, sink: &mut dyn Sink<V>) -> Result<bool> {
        match other.next() {
            Some(value) => Ok(sink.push((self.mapper)(element, value))),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, PipelineBuilder};

    #[test]
    fn test_identity_in_a_chain() {
        let stage = Identity::new().and_then(SkipAndMap::first(|x: i32| x + 1));
        assert!(!stage.is_combinable());
        let result = Pipeline::sequential().collect(&stage, vec![1, 1]).unwrap();
        assert_eq!(result, vec![2, 1]);

        let result = Pipeline::sequential()
            .collect_limited(&Identity::new(), 0..100, 3)
            .unwrap();
        assert_eq!(result, vec![0, 1, 2]);
    }

    #[test]
    fn test_map_first() {
        let result = Pipeline::sequential()
            .collect(&SkipAndMap::first(|x: i32| x * 10), 1..=4)
            .unwrap();
        assert_eq!(result, vec![10, 2, 3, 4]);
    }

    #[test]
    fn test_map_n() {
        let result = Pipeline::sequential()
            .collect(&SkipAndMap::map_n(3, |x: i32| -x), 1..=5)
            .unwrap();
        assert_eq!(result, vec![-1, -2, -3, 4, 5]);
    }

    #[test]
    fn test_skip_then_map() {
        let result = Pipeline::sequential()
            .collect(&SkipAndMap::skip_then_map(3, |x: i32| -x), 1..=5)
            .unwrap();
        assert_eq!(result, vec![1, 2, 3, -4, -5]);
    }

    #[test]
    fn test_skip_then_map_n() {
        let stage = SkipAndMap::skip_then_map_n(1, 2, |s: String| s.to_uppercase());
        let input = vec!["a", "b", "c", "d"].into_iter().map(String::from);
        let result = Pipeline::sequential().collect(&stage, input).unwrap();
        assert_eq!(result, vec!["a", "B", "C", "d"]);
    }

    #[test]
    fn test_map_zero_elements() {
        let result = Pipeline::sequential()
            .collect(&SkipAndMap::map_n(0, |x: i32| x + 100), 1..=3)
            .unwrap();
        assert_eq!(result, vec![1, 2, 3]);
    }

    #[test]
    fn test_map_while() {
        let stage = MapWhile::new(|x: i32| x * 10, |x: &i32| *x < 3);
        assert_eq!(stage.name(), "map_while");
        let result = Pipeline::sequential()
            .collect(&stage, vec![1, 2, 3, 1, 2])
            .unwrap();
        assert_eq!(result, vec![10, 20, 3, 1, 2]);
    }

    #[test]
    fn test_map_until() {
        let stage = MapWhile::until(|x: i32| x * 10, |x: &i32| *x == 3);
        assert_eq!(stage.name(), "map_until");
        let result = Pipeline::sequential()
            .collect(&stage, vec![1, 2, 3, 1, 2])
            .unwrap();
        assert_eq!(result, vec![10, 20, 3, 1, 2]);
    }

    #[test]
    fn test_flat_map_if() {
        let stage = FlatMapIf::new(|x: i32| vec![x; x as usize], |x: &i32| x % 2 == 0);
        let result = Pipeline::sequential().collect(&stage, 1..=4).unwrap();
        assert_eq!(result, vec![1, 2, 2, 3, 4, 4, 4, 4]);
    }

    #[test]
    fn test_flat_map_if_stops_mid_expansion() {
        let stage = FlatMapIf::new(|x: i32| 0..x, |_: &i32| true);
        let result = Pipeline::sequential()
            .collect_limited(&stage, vec![5, 5], 3)
            .unwrap();
        assert_eq!(result, vec![0, 1, 2]);
    }

    #[test]
    fn test_flat_map_if_in_parallel() {
        let pipeline = PipelineBuilder::new()
            .parallel()
            .min_split_len(8)
            .max_split_depth(3)
            .build()
            .unwrap();
        let stage = FlatMapIf::new(|x: u32| vec![x, x], |x: &u32| x % 10 == 0);
        let sequential = Pipeline::sequential().collect(&stage, 0..200).unwrap();
        let parallel = pipeline.collect(&stage, 0..200).unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(sequential.len(), 220);
    }

    #[test]
    fn test_zip_pairs() {
        let stage = Zip::new(vec!['a', 'b', 'c']);
        let result = Pipeline::sequential().collect(&stage, 1..=5).unwrap();
        assert_eq!(result, vec![(1, 'a'), (2, 'b'), (3, 'c')]);
    }

    #[test]
    fn test_zip_with_mapper_and_reuse() {
        let stage = Zip::with(10..13, |x: i32, y: i32| x + y);
        let pipeline = Pipeline::sequential();
        assert_eq!(pipeline.collect(&stage, 0..3).unwrap(), vec![10, 12, 14]);
        // Every traversal starts the second sequence over
        assert_eq!(pipeline.collect(&stage, 0..2).unwrap(), vec![10, 12]);
    }
}
