/// The receiving end of a stage.
///
/// A stage pushes its output here one element at a time. `push` reports
/// whether the element was accepted; once a sink starts rejecting it stays
/// rejecting for the rest of the traversal and further pushes are wasted work.
pub trait Sink<T> {
    /// Offer an element downstream. Returns `false` once the sink rejects.
    fn push(&mut self, item: T) -> bool;

    /// Whether the sink has stopped accepting elements
    fn is_rejecting(&self) -> bool;
}

impl<T, S> Sink<T> for &mut S
where
    S: Sink<T> + ?Sized,
{
    fn push(&mut self, item: T) -> bool {
        (**self).push(item)
    }

    fn is_rejecting(&self) -> bool {
        (**self).is_rejecting()
    }
}

/// Terminal sink collecting elements into a `Vec`, optionally bounded.
///
/// A bounded collector starts rejecting as soon as it holds `limit` elements,
/// which is how callers ask upstream stages to stop early.
#[derive(Debug, Clone)]
pub struct VecSink<T> {
    items: Vec<T>,
    limit: Option<usize>,
}

impl<T> VecSink<T> {
    /// Create an unbounded collector
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            limit: None,
        }
    }

    /// Create a collector that rejects after `limit` elements
    pub fn with_limit(limit: usize) -> Self {
        Self {
            items: Vec::with_capacity(limit.min(1024)),
            limit: Some(limit),
        }
    }

    /// Elements collected so far
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Get the number of collected elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether nothing has been collected yet
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the collector and return its elements
    pub fn into_inner(self) -> Vec<T> {
        self.items
    }

    fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.items.len() >= limit)
    }
}

impl<T> Default for VecSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sink<T> for VecSink<T> {
    fn push(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        !self.is_full()
    }

    fn is_rejecting(&self) -> bool {
        self.is_full()
    }
}

/// Sink that hands every element to a closure. The closure's return value
/// decides whether the sink keeps accepting.
pub struct FnSink<F> {
    consumer: F,
    rejecting: bool,
}

impl<F> FnSink<F> {
    /// Wrap `consumer`; it returns `false` to start rejecting
    pub fn new<T>(consumer: F) -> Self
    where
        F: FnMut(T) -> bool,
    {
        Self {
            consumer,
            rejecting: false,
        }
    }
}

impl<T, F> Sink<T> for FnSink<F>
where
    F: FnMut(T) -> bool,
{
    fn push(&mut self, item: T) -> bool {
        if self.rejecting {
            return false;
        }
        if !(self.consumer)(item) {
            self.rejecting = true;
        }
        !self.rejecting
    }

    fn is_rejecting(&self) -> bool {
        self.rejecting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_sink_accepts_everything() {
        let mut sink = VecSink::new();
        for i in 0..100 {
            assert!(sink.push(i));
        }
        assert!(!sink.is_rejecting());
        assert_eq!(sink.len(), 100);
    }

    #[test]
    fn test_bounded_sink_rejects_at_limit() {
        let mut sink = VecSink::with_limit(2);
        assert!(sink.push(1));
        // The second element fills the sink, so the push reports rejection
        assert!(!sink.push(2));
        assert!(sink.is_rejecting());
        assert!(!sink.push(3));
        assert_eq!(sink.into_inner(), vec![1, 2]);
    }

    #[test]
    fn test_zero_limit_rejects_immediately() {
        let mut sink: VecSink<i32> = VecSink::with_limit(0);
        assert!(sink.is_rejecting());
        assert!(!sink.push(1));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fn_sink_latches_rejection() {
        let mut seen = Vec::new();
        let mut sink = FnSink::new(|item: i32| {
            seen.push(item);
            item < 3
        });
        assert!(sink.push(1));
        assert!(!sink.push(3));
        assert!(!sink.push(1));
        assert!(sink.is_rejecting());
        drop(sink);
        assert_eq!(seen, vec![1, 3]);
    }
}
