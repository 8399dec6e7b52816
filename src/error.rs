//! Error types for the mention tracker.

use mention_search::CollectError;

/// Top-level error type for the tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// CSV export error.
    #[error("export error: {0}")]
    Export(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Mention collection error.
    #[error("search error: {0}")]
    Search(#[from] CollectError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TrackerError>;
