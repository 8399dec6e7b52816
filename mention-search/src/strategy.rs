//! Trait definition for pluggable mention sources.
//!
//! Each acquisition method (JSON API, headless browser, subreddit sweep)
//! implements [`MentionStrategy`] so the collector can run them in a
//! configurable priority order and swap in test doubles.

use crate::error::CollectError;
use crate::http::Session;
use crate::types::{Mention, SearchRequest, StrategyKind};
use async_trait::async_trait;

/// A pluggable mention source.
///
/// Implementors handle their own:
///
/// - URL construction with query encoding
/// - requests through the shared, paced [`Session`]
/// - parsing into [`Mention`] values
/// - mapping blocks, CAPTCHAs and parse failures to [`CollectError`]
///
/// Strategies run one after another on the same session, never concurrently.
#[async_trait]
pub trait MentionStrategy: Send + Sync {
    /// Which [`StrategyKind`] this implementation represents.
    fn kind(&self) -> StrategyKind;

    /// Collect mentions for `request`.
    ///
    /// Returning `Ok` with an empty vector is allowed; the collector records
    /// it as a failed strategy.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError`] if requests fail, the source blocks us, or
    /// responses cannot be parsed.
    async fn collect(
        &self,
        request: &SearchRequest,
        session: &mut Session,
    ) -> Result<Vec<Mention>, CollectError>;

    /// Reason to skip this strategy given how many unique mentions are held.
    ///
    /// `None` means run it. Most strategies always run.
    fn skip_reason(&self, request: &SearchRequest, collected: usize) -> Option<String> {
        let _ = (request, collected);
        None
    }
}
