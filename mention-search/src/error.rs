//! Error types for the mention-search crate.
//!
//! Strategy errors are recorded on the [`crate::SearchResult`] rather than
//! propagated, so their messages are written to be shown to users as-is.

/// Errors that can occur while collecting mentions.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// An HTTP request failed (connection, timeout, non-success status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The source refused the request: rate limiting, CAPTCHA or bot wall.
    #[error("blocked: {0}")]
    Blocked(String),

    /// A response could not be parsed into mentions.
    #[error("parse error: {0}")]
    Parse(String),

    /// The strategy ran but found nothing.
    #[error("no results: {0}")]
    Empty(String),

    /// The page renderer (headless browser) failed.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid collector configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The search request itself is unusable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Convenience type alias for mention-search results.
pub type Result<T> = std::result::Result<T, CollectError>;
