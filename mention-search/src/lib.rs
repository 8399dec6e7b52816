//! # mention-search
//!
//! Collects recent Reddit mentions of a search term without API keys.
//!
//! Reddit throttles and bot-walls anonymous clients, so no single way of
//! asking is reliable. This crate tries several in priority order and keeps
//! whatever each one finds.
//!
//! ## Design
//!
//! - Public `search.json` endpoint first, paginated via the listing cursor
//! - Headless browser render of the search page when the API is blocked or empty
//! - Optional sweep of a fixed subreddit list to top up thin result sets
//! - One session per search: a single User-Agent, cookie jar and request pacer
//! - First-wins dedup on canonical permalinks, newest-first ordering
//! - Graceful degradation: a failing strategy is reported, never fatal
//!
//! ## Security
//!
//! - No credentials are needed or stored
//! - Search terms are logged only at trace level
//! - Requests are paced with jitter and never issued concurrently

pub mod collector;
pub mod config;
pub mod error;
pub mod http;
pub mod pacing;
pub mod render;
pub mod strategies;
pub mod strategy;
pub mod types;

pub use collector::{Collector, ProgressCallback, ProgressEvent};
pub use config::{BrowserConfig, CollectorConfig, RendererBackend};
pub use error::{CollectError, Result};
pub use render::PageRenderer;
pub use strategy::MentionStrategy;
pub use types::{
    Mention, MentionKind, SearchRequest, SearchResult, SortOrder, StrategyKind, StrategyReport,
    StrategyStatus, TimeWindow,
};

/// Collect mentions for `request` using every built-in strategy.
///
/// Builds a [`Collector`] from `config` and runs the request's strategies in
/// order. Strategy failures are reported in [`SearchResult::strategies`]
/// rather than returned as errors.
///
/// # Errors
///
/// Returns [`CollectError::Config`] for an invalid `config`,
/// [`CollectError::InvalidRequest`] for an invalid `request`, or
/// [`CollectError::Http`] if the HTTP client cannot be built.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> mention_search::Result<()> {
/// let request = mention_search::SearchRequest::new("acme corp");
/// let config = mention_search::CollectorConfig::default();
/// let result = mention_search::search_mentions(&request, config).await?;
/// for mention in &result.mentions {
///     println!("r/{}: {}", mention.subreddit, mention.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_mentions(request: &SearchRequest, config: CollectorConfig) -> Result<SearchResult> {
    let collector = Collector::from_config(config)?;
    collector.collect(request).await
}
