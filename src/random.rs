//! Uniform random sources for randomized stages.
//!
//! Every state of a randomized stage owns its own generator, created by a
//! [`RandomFactory`] when the state is initialized. Parallel splits therefore
//! never touch the same generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

/// A uniform random generator owned by a single stage state
pub trait RandomSource: Send {
    /// Uniform value in `[0, 1)`
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `[0, bound)`. `bound` must be positive.
    fn next_index(&mut self, bound: usize) -> usize;
}

impl<R> RandomSource for R
where
    R: Rng + Send,
{
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }
}

/// Hands out independent generators, one per stage state
pub trait RandomFactory: Send + Sync {
    type Source: RandomSource;

    fn create(&self) -> Self::Source;
}

/// Generators seeded from operating system entropy
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyRandom;

impl RandomFactory for EntropyRandom {
    type Source = StdRng;

    fn create(&self) -> StdRng {
        StdRng::from_entropy()
    }
}

/// Reproducible generators. The n-th generator handed out is seeded with
/// `seed + n`, so a sequential traversal always sees the same sequence.
#[derive(Debug)]
pub struct SeededRandom {
    seed: u64,
    issued: AtomicU64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            issued: AtomicU64::new(0),
        }
    }
}

impl RandomFactory for SeededRandom {
    type Source = StdRng;

    fn create(&self) -> StdRng {
        let offset = self.issued.fetch_add(1, Ordering::Relaxed);
        StdRng::seed_from_u64(self.seed.wrapping_add(offset))
    }
}

/// In-place Fisher-Yates shuffle
pub(crate) fn shuffle<T, R>(items: &mut [T], random: &mut R)
where
    R: RandomSource + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = random.next_index(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_range() {
        let mut random = SeededRandom::new(7).create();
        for _ in 0..1000 {
            let value = random.next_unit();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_index_range() {
        let mut random = EntropyRandom.create();
        for _ in 0..1000 {
            assert!(random.next_index(5) < 5);
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let first: Vec<usize> = {
            let mut random = SeededRandom::new(42).create();
            (0..16).map(|_| random.next_index(100)).collect()
        };
        let second: Vec<usize> = {
            let mut random = SeededRandom::new(42).create();
            (0..16).map(|_| random.next_index(100)).collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut random = SeededRandom::new(1).create();
        let mut items: Vec<u32> = (0..50).collect();
        shuffle(&mut items, &mut random);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }
}
