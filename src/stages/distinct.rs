use crate::error::Result;
use crate::sink::Sink;
use crate::stage::Stage;
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

fn clone_key<T: Clone>(element: &T) -> T {
    element.clone()
}

/// Keeps the first element seen for every distinct key
pub struct DistinctBy<T, K, F> {
    key: F,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T, K, F> DistinctBy<T, K, F>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    pub fn new(key: F) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }
}

impl<T, K, F> Stage for DistinctBy<T, K, F>
where
    T: Send,
    K: Eq + Hash + Send,
    F: Fn(&T) -> K + Send + Sync,
{
    type Input = T;
    type Output = T;
    type State = HashSet<K>;

    fn name(&self) -> &str {
        "distinct_by"
    }

    fn initializer(&self) -> Self::State {
        HashSet::new()
    }

    fn integrate(&self, state: &mut Self::State, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        if state.insert((self.key)(&element)) {
            Ok(sink.push(element))
        } else {
            Ok(!sink.is_rejecting())
        }
    }
}

/// Drops elements whose key equals the key of the element right before them
pub struct RemoveDuplicates<T, K, F> {
    key: F,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T> RemoveDuplicates<T, T, fn(&T) -> T>
where
    T: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self::by(clone_key::<T> as fn(&T) -> T)
    }
}

impl<T> Default for RemoveDuplicates<T, T, fn(&T) -> T>
where
    T: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K, F> RemoveDuplicates<T, K, F>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    pub fn by(key: F) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }
}

impl<T, K, F> Stage for RemoveDuplicates<T, K, F>
where
    T: Send,
    K: PartialEq + Send,
    F: Fn(&T) -> K + Send + Sync,
{
    type Input = T;
    type Output = T;
    /// Key of the previous element
    type State = Option<K>;

    fn name(&self) -> &str {
        "remove_duplicates"
    }

    fn initializer(&self) -> Self::State {
        None
    }

    fn integrate(&self, state: &mut Self::State, element: T, sink: &mut dyn Sink<T>) -> Result<bool> {
        let key = (self.key)(&element);
        if state.as_ref() == Some(&key) {
            return Ok(true);
        }
        *state = Some(key);
        Ok(sink.push(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;

    #[test]
    fn test_distinct_by_keeps_first() {
        let words = vec!["one", "two", "three", "four", "five", "six"];
        let stage = DistinctBy::new(|s: &&str| s.len());
        let result = Pipeline::sequential().collect(&stage, words).unwrap();
        assert_eq!(result, vec!["one", "three", "four"]);
    }

    #[test]
    fn test_remove_consecutive_duplicates() {
        let input = vec![1, 1, 2, 2, 2, 3, 1, 1, 4];
        let result = Pipeline::sequential()
            .collect(&RemoveDuplicates::new(), input)
            .unwrap();
        assert_eq!(result, vec![1, 2, 3, 1, 4]);
    }

    #[test]
    fn test_remove_duplicates_by_key() {
        let input = vec!["Apple", "avocado", "Banana", "blueberry", "apricot"];
        let stage = RemoveDuplicates::by(|s: &&str| s.chars().next().map(|c| c.to_ascii_lowercase()));
        let result = Pipeline::sequential().collect(&stage, input).unwrap();
        assert_eq!(result, vec!["Apple", "Banana", "apricot"]);
    }

    #[test]
    fn test_distinct_stops_early() {
        let stage = DistinctBy::new(|x: &u64| x % 10);
        let result = Pipeline::sequential()
            .collect_limited(&stage, 0..u64::MAX, 3)
            .unwrap();
        assert_eq!(result, vec![0, 1, 2]);
    }
}
