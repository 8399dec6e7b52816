//! Mention collector: sequential strategy execution, dedup, ordering.
//!
//! Runs the requested strategies one after another on a shared session,
//! merges their output first-wins by canonical permalink, then filters to
//! the time window, sorts newest first and truncates.

pub mod dedup;
pub mod ordering;
pub mod permalink;
pub mod pipeline;
pub mod progress;

pub use pipeline::Collector;
pub use progress::{ProgressCallback, ProgressEvent};
