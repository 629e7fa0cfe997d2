//! Stages that buffer the whole input before emitting anything, plus
//! [`NCopies`] which multiplies elements as they stream by.

use crate::error::Result;
use crate::random::{shuffle, EntropyRandom, RandomFactory};
use crate::sink::Sink;
use crate::stage::{Integration, Stage};
use std::marker::PhantomData;

/// Whole-list operation applied once the input is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOp {
    Reverse,
    /// Element `i` moves to `(i + distance) mod len`; negative distances
    /// rotate towards the front
    Rotate(i64),
    Shuffle,
}

/// Collects the input into a list, applies a [`ListOp`] and emits the result
pub struct IntoList<T, G = EntropyRandom> {
    op: ListOp,
    random: G,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> IntoList<T, EntropyRandom> {
    pub fn new(op: ListOp) -> Self {
        Self {
            op,
            random: EntropyRandom,
            _marker: PhantomData,
        }
    }

    pub fn reverse() -> Self {
        Self::new(ListOp::Reverse)
    }

    pub fn rotate(distance: i64) -> Self {
        Self::new(ListOp::Rotate(distance))
    }

    pub fn shuffle() -> Self {
        Self::new(ListOp::Shuffle)
    }
}

impl<T, G> IntoList<T, G> {
    /// Shuffle with generators from `random`
    pub fn with_random<H: RandomFactory>(self, random: H) -> IntoList<T, H> {
        IntoList {
            op: self.op,
            random,
            _marker: PhantomData,
        }
    }
}

impl<T, G: RandomFactory> IntoList<T, G> {
    fn apply(&self, items: &mut [T]) {
        if items.is_empty() {
            return;
        }
        match self.op {
            ListOp::Reverse => items.reverse(),
            ListOp::Rotate(distance) => {
                let shift = distance.rem_euclid(items.len() as i64) as usize;
                items.rotate_right(shift);
            }
            ListOp::Shuffle => shuffle(items, &mut self.random.create()),
        }
    }
}

impl<T, G> Stage for IntoList<T, G>
where
    T: Send,
    G: RandomFactory,
{
    type Input = T;
    type Output = T;
    type State = Vec<T>;

    fn name(&self) -> &str {
        match self.op {
            ListOp::Reverse => "reverse",
            ListOp::Rotate(_) => "rotate",
            ListOp::Shuffle => "shuffle",
        }
    }

    fn integration(&self) -> Integration {
        Integration::Greedy
    }

    fn initializer(&self) -> Vec<T> {
        Vec::new()
    }

    fn integrate(&self, items: &mut Vec<T>, element: T, _sink: &mut dyn Sink<T>) -> Result<bool> {
        items.push(element);
        Ok(true)
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, mut left: Vec<T>, right: Vec<T>) -> Result<Vec<T>> {
        left.extend(right);
        Ok(left)
    }

    fn finish(&self, mut items: Vec<T>, sink: &mut dyn Sink<T>) -> Result<()> {
        self.apply(&mut items);
        for element in items {
            if !sink.push(element) {
                break;
            }
        }
        Ok(())
    }
}

/// Collects the whole input and emits it `n` times. `n == 0` empties the
/// stream.
pub struct Repeat<T> {
    n: usize,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> Repeat<T> {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            _marker: PhantomData,
        }
    }
}

impl<T: Clone + Send> Stage for Repeat<T> {
    type Input = T;
    type Output = T;
    type State = Vec<T>;

    fn name(&self) -> &str {
        "repeat"
    }

    fn integration(&self) -> Integration {
        if self.n == 0 {
            Integration::ShortCircuit
        } else {
            Integration::Greedy
        }
    }

    fn initializer(&self) -> Vec<T> {
        Vec::new()
    }

    fn integrate(&self, items: &mut Vec<T>, element: T, _sink: &mut dyn Sink<T>) -> Result<bool> {
        if self.n == 0 {
            return Ok(false);
        }
        items.push(element);
        Ok(true)
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, mut left: Vec<T>, right: Vec<T>) -> Result<Vec<T>> {
        left.extend(right);
        Ok(left)
    }

    fn finish(&self, items: Vec<T>, sink: &mut dyn Sink<T>) -> Result<()> {
        for _ in 0..self.n {
            for element in &items {
                if !sink.push(element.clone()) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

/// Emits every element `n` times in a row
pub struct NCopies<T> {
    n: usize,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> NCopies<T> {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            _marker: PhantomData,
        }
    }
}

impl<T: Clone + Send> Stage for NCopies<T> {
    type Input = T;
    type Output = T;
    type State = ();

    fn name(&self) -> &str {
        "n_copies"
    }

    fn initializer(&self) {}

    fn integrate(&self, _: &mut (), element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        if self.n == 0 {
            return Ok(!sink.is_rejecting());
        }
        for _ in 1..self.n {
            if !sink.push(element.clone()) {
                return Ok(false);
            }
        }
        Ok(sink.push(element))
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, _: (), _: ()) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, PipelineBuilder};
    use crate::random::SeededRandom;

    #[test]
    fn test_reverse() {
        let result = Pipeline::sequential()
            .collect(&IntoList::reverse(), 0..10)
            .unwrap();
        assert_eq!(result, (0..10).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_rotate() {
        let pipeline = Pipeline::sequential();
        assert_eq!(
            pipeline.collect(&IntoList::rotate(3), 0..10).unwrap(),
            vec![7, 8, 9, 0, 1, 2, 3, 4, 5, 6]
        );
        assert_eq!(
            pipeline.collect(&IntoList::rotate(-4), 0..10).unwrap(),
            vec![4, 5, 6, 7, 8, 9, 0, 1, 2, 3]
        );
        assert_eq!(
            pipeline.collect(&IntoList::rotate(23), 0..10).unwrap(),
            vec![7, 8, 9, 0, 1, 2, 3, 4, 5, 6]
        );
        assert!(pipeline.collect(&IntoList::rotate(5), Vec::<i32>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let stage = IntoList::shuffle().with_random(SeededRandom::new(8));
        let mut result = Pipeline::sequential().collect(&stage, 0..100).unwrap();
        assert_ne!(result, (0..100).collect::<Vec<_>>());
        result.sort_unstable();
        assert_eq!(result, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallel_reverse() {
        let pipeline = PipelineBuilder::new()
            .parallel()
            .min_split_len(10)
            .max_split_depth(3)
            .build()
            .unwrap();
        let result = pipeline.collect(&IntoList::reverse(), 0..200).unwrap();
        assert_eq!(result, (0..200).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_repeat() {
        let pipeline = Pipeline::sequential();
        assert_eq!(
            pipeline.collect(&Repeat::new(3), vec![1, 2]).unwrap(),
            vec![1, 2, 1, 2, 1, 2]
        );
        assert!(pipeline.collect(&Repeat::new(0), vec![1, 2]).unwrap().is_empty());
    }

    #[test]
    fn test_repeat_drains_under_rejection() {
        let result = Pipeline::sequential()
            .collect_limited(&Repeat::new(100), vec!['a', 'b'], 5)
            .unwrap();
        assert_eq!(result, vec!['a', 'b', 'a', 'b', 'a']);
    }

    #[test]
    fn test_n_copies() {
        let pipeline = Pipeline::sequential();
        assert_eq!(
            pipeline.collect(&NCopies::new(2), vec!["x", "y"]).unwrap(),
            vec!["x", "x", "y", "y"]
        );
        assert!(pipeline.collect(&NCopies::new(0), vec!["x"]).unwrap().is_empty());
    }

    #[test]
    fn test_n_copies_stops_early() {
        let result = Pipeline::sequential()
            .collect_limited(&NCopies::new(3), 0..u64::MAX, 4)
            .unwrap();
        assert_eq!(result, vec![0, 0, 0, 1]);
    }
}
