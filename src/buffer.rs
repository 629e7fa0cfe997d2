use std::collections::VecDeque;

/// A deque holding at most `capacity` elements.
///
/// Pushing onto a full deque evicts the oldest element and hands it back to
/// the caller, so stages can keep side tables (membership sets, counters) in
/// sync with what is actually resident.
#[derive(Debug, Clone)]
pub struct BoundedDeque<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedDeque<T> {
    /// Create a deque with the given capacity. A capacity of zero holds
    /// nothing: every push is evicted straight away.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Append at the back, returning the evicted oldest element if the deque
    /// was full
    pub fn push_back(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.is_full() {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Remove and return the oldest element
    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Get the oldest element
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Get the newest element
    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    /// Get the number of buffered elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the deque holds nothing
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check whether the next push will evict
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Get the maximum number of elements kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Append every element of `other` after this deque's contents, keeping
    /// only the newest `capacity` elements overall
    pub fn extend_from(&mut self, other: BoundedDeque<T>) {
        for item in other.items {
            self.push_back(item);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> BoundedDeque<T> {
    /// Copy of the contents, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T> IntoIterator for BoundedDeque<T> {
    type Item = T;
    type IntoIter = std::collections::vec_deque::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut deque = BoundedDeque::new(3);
        assert_eq!(deque.push_back(1), None);
        assert_eq!(deque.push_back(2), None);
        assert_eq!(deque.len(), 2);
        assert!(!deque.is_full());
    }

    #[test]
    fn test_evicts_oldest() {
        let mut deque = BoundedDeque::new(3);
        for i in 1..=3 {
            deque.push_back(i);
        }
        assert_eq!(deque.push_back(4), Some(1));
        assert_eq!(deque.to_vec(), vec![2, 3, 4]);
        assert_eq!(deque.front(), Some(&2));
        assert_eq!(deque.back(), Some(&4));
    }

    #[test]
    fn test_zero_capacity_holds_nothing() {
        let mut deque = BoundedDeque::new(0);
        assert_eq!(deque.push_back("a"), Some("a"));
        assert!(deque.is_empty());
    }

    #[test]
    fn test_extend_keeps_newest() {
        let mut left = BoundedDeque::new(4);
        let mut right = BoundedDeque::new(4);
        for i in 0..3 {
            left.push_back(i);
        }
        for i in 3..6 {
            right.push_back(i);
        }
        left.extend_from(right);
        assert_eq!(left.into_iter().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_capacity() {
        let deque: BoundedDeque<i32> = BoundedDeque::new(42);
        assert_eq!(deque.capacity(), 42);
    }
}
