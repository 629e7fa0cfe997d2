//! Stateful intermediate stages for push-based sequence pipelines.
//!
//! A [`Stage`] is a small state machine: it creates fresh state, folds input
//! elements into it while pushing output into a downstream [`Sink`], merges
//! partial states from parallel splits, and flushes what it still holds once
//! the input is exhausted. A [`Pipeline`] drives stages either sequentially or
//! by recursively splitting the input across scoped threads.
//!
//! # Features
//!
//! - Uniform four-operation stage protocol with greedy and short-circuit integration
//! - Cooperative early termination through sink rejection
//! - Fork-join parallel traversal with ordered, left-to-right merging
//! - Frequency filters, reservoir sampling, last-N tracking, windows, order
//!   validation, index-aware stages, text segmentation and more in [`stages`]
//! - Traversal metrics: integrated and emitted counts, split latency percentiles
//!
//! # Example
//!
//! ```
//! use stream_stages::stages::{AtLeast, LastN};
//! use stream_stages::{Pipeline, Stage};
//!
//! # fn main() -> stream_stages::Result<()> {
//! // keep repeated values, then remember the last four of them
//! let stage = AtLeast::new(2).and_then(LastN::new(4));
//! let result = Pipeline::sequential().collect(&stage, vec![1, 2, 1, 3, 2, 4, 3, 3])?;
//! assert_eq!(result, vec![2, 3, 3, 3]);
//! # Ok(())
//! # }
//! ```

pub mod backpressure;
pub mod buffer;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod random;
pub mod sink;
pub mod stage;
pub mod stages;

// Re-exports for convenience
pub use backpressure::{Backpressure, Gate};
pub use buffer::BoundedDeque;
pub use error::{PipelineError, Result};
pub use metrics::{MetricsSnapshot, TraversalMetrics};
pub use pipeline::{ExecutionMode, Pipeline, PipelineBuilder};
pub use random::{EntropyRandom, RandomFactory, RandomSource, SeededRandom};
pub use sink::{FnSink, Sink, VecSink};
pub use stage::{Chain, ChainState, Integration, Stage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
