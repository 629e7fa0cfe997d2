//! Ready-made stages.
//!
//! Each module holds one family of algorithms. Everything is re-exported here,
//! so `stream_stages::stages::AtLeast` and friends are the usual entry points.

pub mod buffered;
pub mod collecting;
pub mod distinct;
pub mod extreme;
pub mod filtering;
pub mod frequency;
pub mod indexed;
pub mod lasting;
pub mod mapping;
pub mod ordering;
pub mod sampling;
pub mod segment;
pub mod window;

pub use buffered::{IntoList, ListOp, NCopies, Repeat};
pub use collecting::{FnReducer, Reducer, Reducing};
pub use distinct::{DistinctBy, RemoveDuplicates};
pub use extreme::{Extreme, Extremum};
pub use filtering::{FilterBy, FilterEntries, RandomFilter};
pub use frequency::{AtLeast, AtMost};
pub use indexed::{DropNth, FilterWithIndex, Nth, PeekWithIndex, ZipWithIndex};
pub use lasting::{DropLast, LastN};
pub use mapping::{FlatMapIf, Identity, MapWhile, SkipAndMap, Zip};
pub use ordering::{EqualChunks, Monotonic, Order, OrderValidator, OrderedChunks};
pub use sampling::Sample;
pub use segment::{Boundary, Segmenter, Segmenting, UnicodeSegmenter};
pub use window::{WindowFixed, WindowSliding};
