//! Frequency-threshold filters.
//!
//! [`AtLeast`] keeps elements whose key occurs at least `n` times and emits
//! them as soon as the threshold is reached. [`AtMost`] keeps elements whose
//! key occurs at most `n` times, which can only be decided once the whole
//! input has been seen.

use crate::error::Result;
use crate::sink::Sink;
use crate::stage::{Integration, Stage};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

fn clone_key<T: Clone>(element: &T) -> T {
    element.clone()
}

/// Keeps elements whose key occurs at least `n` times.
///
/// The first `n - 1` occurrences of a key are held back. When the `n`-th
/// occurrence arrives, the held elements are flushed in their original order
/// followed by the current one, and every later occurrence passes straight
/// through. `n == 0` and `n == 1` pass everything through immediately.
pub struct AtLeast<T, K, F> {
    n: usize,
    key: F,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T> AtLeast<T, T, fn(&T) -> T>
where
    T: Clone + Eq + Hash + Send,
{
    pub fn new(n: usize) -> Self {
        Self::by(n, clone_key::<T> as fn(&T) -> T)
    }
}

impl<T, K, F> AtLeast<T, K, F>
where
    F: Fn(&T) -> K,
{
    /// Count occurrences of `key(element)` instead of the element itself
    pub fn by(n: usize, key: F) -> Self {
        Self {
            n,
            key,
            _marker: PhantomData,
        }
    }
}

/// Progress of one key towards the threshold
pub enum Progress<T> {
    /// Occurrences seen so far, all below the threshold
    Pending(Vec<T>),
    /// Threshold reached; nothing is buffered any more
    Passed,
}

impl<T, K, F> Stage for AtLeast<T, K, F>
where
    T: Send,
    K: Eq + Hash + Send,
    F: Fn(&T) -> K + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = HashMap<K, Progress<T>>;

    fn name(&self) -> &str {
        "at_least"
    }

    fn initializer(&self) -> Self::State {
        HashMap::new()
    }

    fn integrate(&self, state: &mut Self::State, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        let key = (self.key)(&element);
        let progress = match state.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Progress::Pending(Vec::new())),
        };

        let buffered = match &mut *progress {
            Progress::Passed => return Ok(sink.push(element)),
            Progress::Pending(buffered) => buffered,
        };

        if buffered.len() + 1 < self.n {
            buffered.push(element);
            return Ok(!sink.is_rejecting());
        }

        let held = std::mem::take(buffered);
        *progress = Progress::Passed;
        for earlier in held {
            if !sink.push(earlier) {
                return Ok(false);
            }
        }
        Ok(sink.push(element))
    }
}

/// Keeps elements whose key occurs at most `n` times.
///
/// Nothing is emitted until the input is exhausted. At most `n` elements are
/// held per key; a key that exceeds `n` drops its buffer and only its count is
/// kept. The finisher emits the surviving elements in their original input
/// order.
pub struct AtMost<T, K, F> {
    n: usize,
    key: F,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T> AtMost<T, T, fn(&T) -> T>
where
    T: Clone + Eq + Hash + Send,
{
    pub fn new(n: usize) -> Self {
        Self::by(n, clone_key::<T> as fn(&T) -> T)
    }
}

impl<T, K, F> AtMost<T, K, F>
where
    F: Fn(&T) -> K,
{
    /// Count occurrences of `key(element)` instead of the element itself
    pub fn by(n: usize, key: F) -> Self {
        Self {
            n,
            key,
            _marker: PhantomData,
        }
    }
}

/// Occurrence count of one key and the elements held for it, tagged with
/// their arrival sequence number
pub struct Tally<T> {
    count: usize,
    held: Vec<(u64, T)>,
}

pub struct AtMostState<K, T> {
    tallies: HashMap<K, Tally<T>>,
    seen: u64,
}

impl<T, K, F> AtMost<T, K, F> {
    fn record(&self, tally: &mut Tally<T>, sequence: u64, element: T) {
        tally.count += 1;
        if tally.count <= self.n {
            tally.held.push((sequence, element));
        } else if !tally.held.is_empty() {
            tally.held = Vec::new();
        }
    }
}

impl<T, K, F> Stage for AtMost<T, K, F>
where
    T: Send,
    K: Eq + Hash + Send,
    F: Fn(&T) -> K + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = AtMostState<K, T>;

    fn name(&self) -> &str {
        "at_most"
    }

    fn integration(&self) -> Integration {
        Integration::Greedy
    }

    fn initializer(&self) -> Self::State {
        AtMostState {
            tallies: HashMap::new(),
            seen: 0,
        }
    }

    fn integrate(&self, state: &mut Self::State, element: T, _sink: &mut dyn Sink<T>) -> Result<bool> {
        let key = (self.key)(&element);
        let sequence = state.seen;
        state.seen += 1;
        let tally = state.tallies.entry(key).or_insert_with(|| Tally {
            count: 0,
            held: Vec::new(),
        });
        self.record(tally, sequence, element);
        Ok(true)
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, mut left: Self::State, right: Self::State) -> Result<Self::State> {
        let offset = left.seen;
        for (key, right_tally) in right.tallies {
            match left.tallies.entry(key) {
                Entry::Vacant(entry) => {
                    let shifted = right_tally
                        .held
                        .into_iter()
                        .map(|(sequence, element)| (sequence + offset, element))
                        .collect();
                    entry.insert(Tally {
                        count: right_tally.count,
                        held: shifted,
                    });
                }
                Entry::Occupied(mut entry) => {
                    let tally = entry.get_mut();
                    tally.count += right_tally.count;
                    if tally.count <= self.n {
                        tally.held.extend(
                            right_tally
                                .held
                                .into_iter()
                                .map(|(sequence, element)| (sequence + offset, element)),
                        );
                    } else {
                        tally.held = Vec::new();
                    }
                }
            }
        }
        left.seen += right.seen;
        Ok(left)
    }

    fn finish(&self, state: Self::State, sink: &mut dyn Sink<T>) -> Result<()> {
        let mut survivors: Vec<(u64, T)> = state
            .tallies
            .into_values()
            .filter(|tally| tally.count <= self.n)
            .flat_map(|tally| tally.held)
            .collect();
        survivors.sort_unstable_by_key(|(sequence, _)| *sequence);

        for (_, element) in survivors {
            if !sink.push(element) {
                break;
            }
        }
        Ok(())
    }
}
