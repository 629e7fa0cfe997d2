use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A simple percentile tracker that maintains a sliding window of measurements
#[derive(Debug, Clone)]
pub struct PercentileTracker {
    measurements: Arc<Mutex<VecDeque<u64>>>,
    window_size: usize,
}

impl PercentileTracker {
    /// Create a new percentile tracker with a specified window size
    pub fn new(window_size: usize) -> Self {
        Self {
            measurements: Arc::new(Mutex::new(VecDeque::with_capacity(window_size))),
            window_size,
        }
    }

    /// Record a measurement (in nanoseconds)
    pub fn record(&self, nanos: u64) {
        let mut measurements = self.measurements.lock();
        if measurements.len() >= self.window_size {
            measurements.pop_front();
        }
        measurements.push_back(nanos);
    }

    /// Median in microseconds
    pub fn p50_us(&self) -> f64 {
        self.percentile(0.50)
    }

    /// 99th percentile in microseconds
    pub fn p99_us(&self) -> f64 {
        self.percentile(0.99)
    }

    fn percentile(&self, p: f64) -> f64 {
        let measurements = self.measurements.lock();
        if measurements.is_empty() {
            return 0.0;
        }

        let mut sorted: Vec<_> = measurements.iter().copied().collect();
        sorted.sort_unstable();

        let idx = ((sorted.len() as f64 * p).ceil() as usize).saturating_sub(1);
        sorted[idx] as f64 / 1000.0
    }

    /// Get the count of recorded measurements
    pub fn count(&self) -> usize {
        self.measurements.lock().len()
    }
}

/// Counters for the traversals run by one [`Pipeline`](crate::Pipeline).
///
/// Cheap to clone; clones share the same counters, so a handle taken before a
/// traversal observes what the traversal records. Parallel splits record
/// from their own threads.
#[derive(Debug, Clone)]
pub struct TraversalMetrics {
    /// Elements handed to a stage integrator
    integrated: Arc<AtomicU64>,
    /// Elements accepted by the terminal sink
    emitted: Arc<AtomicU64>,
    /// Traversals started
    traversals: Arc<AtomicU64>,
    /// Leaf splits evaluated by the parallel engine
    splits: Arc<AtomicU64>,
    /// Combiner invocations
    merges: Arc<AtomicU64>,
    /// Wall time of each leaf split
    split_latency: PercentileTracker,
    start_time: Instant,
}

impl TraversalMetrics {
    pub fn new() -> Self {
        Self {
            integrated: Arc::new(AtomicU64::new(0)),
            emitted: Arc::new(AtomicU64::new(0)),
            traversals: Arc::new(AtomicU64::new(0)),
            splits: Arc::new(AtomicU64::new(0)),
            merges: Arc::new(AtomicU64::new(0)),
            split_latency: PercentileTracker::new(1000),
            start_time: Instant::now(),
        }
    }

    /// Record elements handed to an integrator
    pub fn record_integrated(&self, count: u64) {
        self.integrated.fetch_add(count, Ordering::Relaxed);
    }

    /// Record elements accepted by the terminal sink
    pub fn record_emitted(&self, count: u64) {
        self.emitted.fetch_add(count, Ordering::Relaxed);
    }

    /// Record the start of a traversal
    pub fn record_traversal(&self) {
        self.traversals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished leaf split and how long it took
    pub fn record_split(&self, elapsed: Duration) {
        self.splits.fetch_add(1, Ordering::Relaxed);
        self.split_latency.record(elapsed.as_nanos() as u64);
    }

    /// Record one combine of sibling splits
    pub fn record_merge(&self) {
        self.merges.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of elements integrated
    pub fn total_integrated(&self) -> u64 {
        self.integrated.load(Ordering::Relaxed)
    }

    /// Get the total number of elements emitted
    pub fn total_emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Get the number of traversals run
    pub fn total_traversals(&self) -> u64 {
        self.traversals.load(Ordering::Relaxed)
    }

    /// Get the number of leaf splits evaluated
    pub fn total_splits(&self) -> u64 {
        self.splits.load(Ordering::Relaxed)
    }

    /// Get the number of merges performed
    pub fn total_merges(&self) -> u64 {
        self.merges.load(Ordering::Relaxed)
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_integrated: self.total_integrated(),
            total_emitted: self.total_emitted(),
            total_traversals: self.total_traversals(),
            total_splits: self.total_splits(),
            total_merges: self.total_merges(),
            split_p50_us: self.split_latency.p50_us(),
            split_p99_us: self.split_latency.p99_us(),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for TraversalMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub total_integrated: u64,
    pub total_emitted: u64,
    pub total_traversals: u64,
    pub total_splits: u64,
    pub total_merges: u64,
    pub split_p50_us: f64,
    pub split_p99_us: f64,
    pub elapsed: Duration,
}

impl MetricsSnapshot {
    /// Format metrics as a human-readable string
    pub fn format(&self) -> String {
        format!(
            "Traversals: {}, Integrated: {}, Emitted: {}, Splits: {}, Merges: {}, \
             Split P50: {:.2}µs, P99: {:.2}µs, Elapsed: {:.2}s",
            self.total_traversals,
            self.total_integrated,
            self.total_emitted,
            self.total_splits,
            self.total_merges,
            self.split_p50_us,
            self.split_p99_us,
            self.elapsed.as_secs_f64()
        )
    }
}
