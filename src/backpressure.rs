use crate::sink::Sink;

/// Rejection state of a downstream sink for one traversal.
///
/// `Rejecting` is terminal: once a sink has refused an element, nothing
/// brings it back to `Accepting` within the same traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backpressure {
    #[default]
    Accepting,
    Rejecting,
}

impl Backpressure {
    /// Fold in the outcome of a push or a rejection query
    pub fn observe(self, rejecting: bool) -> Self {
        match self {
            Backpressure::Accepting if rejecting => Backpressure::Rejecting,
            state => state,
        }
    }

    /// Check whether rejection has been observed
    pub fn is_rejecting(self) -> bool {
        self == Backpressure::Rejecting
    }
}

/// Wraps the terminal sink of a traversal and latches its rejection.
///
/// After the wrapped sink refuses once, every later push is dropped without
/// reaching it, so the terminal sink never sees traffic after it said stop.
pub struct Gate<'a, T> {
    inner: &'a mut dyn Sink<T>,
    state: Backpressure,
    accepted: u64,
}

impl<'a, T> Gate<'a, T> {
    pub fn new(inner: &'a mut dyn Sink<T>) -> Self {
        let state = Backpressure::Accepting.observe(inner.is_rejecting());
        Self {
            inner,
            state,
            accepted: 0,
        }
    }

    /// Current rejection state
    pub fn state(&self) -> Backpressure {
        self.state
    }

    /// Number of elements handed to the wrapped sink
    pub fn accepted(&self) -> u64 {
        self.accepted
    }
}

impl<T> Sink<T> for Gate<'_, T> {
    fn push(&mut self, item: T) -> bool {
        if self.state.is_rejecting() {
            return false;
        }
        self.accepted += 1;
        let accepted = self.inner.push(item);
        self.state = self
            .state
            .observe(!accepted || self.inner.is_rejecting());
        !self.state.is_rejecting()
    }

    fn is_rejecting(&self) -> bool {
        self.state.is_rejecting() || self.inner.is_rejecting()
    }
}
