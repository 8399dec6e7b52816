//! Targeted per-subreddit search, used to top up thin result sets.
//!
//! Runs `restrict_sr=on` searches over a fixed list of business, tech and
//! news subreddits. Each subreddit is one paced request. A failing subreddit
//! is logged and skipped; the sweep fails only when every one fails.

use crate::error::CollectError;
use crate::http::Session;
use crate::strategy::MentionStrategy;
use crate::types::{Mention, SearchRequest, StrategyKind};
use async_trait::async_trait;

use super::listing::Listing;

/// Sweep over the configured subreddit list.
pub struct SubredditSweepStrategy;

impl SubredditSweepStrategy {
    /// Per-subreddit `limit`: a quarter of the request budget spread over the
    /// list, at least 1 and at most `page_size`.
    fn per_subreddit_limit(max_results: usize, subreddits: usize, page_size: usize) -> usize {
        (max_results / 4 / subreddits.max(1)).clamp(1, page_size.max(1))
    }
}

/// Accepts `rust`, `r/rust` and `/r/rust/`; rejects anything that is not a
/// plain subreddit name.
fn clean_subreddit_name(raw: &str) -> Option<&str> {
    let name = raw.trim().trim_matches('/');
    let name = name.strip_prefix("r/").unwrap_or(name);
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

#[async_trait]
impl MentionStrategy for SubredditSweepStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SubredditSweep
    }

    fn skip_reason(&self, request: &SearchRequest, collected: usize) -> Option<String> {
        let threshold = request.max_results / 2;
        (collected >= threshold).then(|| {
            format!("earlier strategies already found {collected} mentions (threshold {threshold})")
        })
    }

    async fn collect(
        &self,
        request: &SearchRequest,
        session: &mut Session,
    ) -> Result<Vec<Mention>, CollectError> {
        let subreddits: Vec<String> = session
            .config()
            .subreddits
            .iter()
            .filter_map(|s| clean_subreddit_name(s))
            .map(str::to_owned)
            .collect();
        if subreddits.is_empty() {
            return Err(CollectError::Config("no subreddits configured".into()));
        }

        let time_filter = request.window.reddit_time_filter();
        let limit = Self::per_subreddit_limit(
            request.max_results,
            subreddits.len(),
            session.config().page_size,
        )
        .to_string();

        let mut mentions = Vec::new();
        let mut failures = 0usize;
        let mut last_error: Option<CollectError> = None;

        for subreddit in &subreddits {
            let url = session.endpoint(
                &format!("/r/{subreddit}/search.json"),
                &[
                    ("q", request.term.as_str()),
                    ("restrict_sr", "on"),
                    ("sort", request.sort.as_str()),
                    ("t", time_filter),
                    ("limit", limit.as_str()),
                    ("raw_json", "1"),
                ],
            )?;

            match session.get_json::<Listing>(url).await {
                Ok(listing) => {
                    let (found, _) = listing.into_mentions(StrategyKind::SubredditSweep);
                    tracing::debug!(%subreddit, count = found.len(), "subreddit searched");
                    mentions.extend(found);
                }
                Err(err) => {
                    tracing::debug!(%subreddit, error = %err, "subreddit search failed");
                    failures += 1;
                    last_error = Some(err);
                }
            }
        }

        if mentions.is_empty() {
            if failures == subreddits.len() {
                if let Some(err) = last_error {
                    return Err(err);
                }
            }
            return Err(CollectError::Empty(format!(
                "no matches in {} subreddits",
                subreddits.len()
            )));
        }
        Ok(mentions)
    }
}
