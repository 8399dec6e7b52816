//! Core types: mentions, strategies, requests and results.

use crate::error::CollectError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of mentions a search keeps after dedup and sorting.
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Default trailing window length in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Whether a mention is a submission or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionKind {
    /// A link or self post.
    Post,
    /// A comment under a post.
    Comment,
}

impl MentionKind {
    /// Returns the lowercase label used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for MentionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered occurrence of the search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// Reddit fullname-less id (`abc123`), or a synthetic id for scraped posts.
    pub id: String,
    /// Post or comment.
    pub kind: MentionKind,
    /// Subreddit name without the `r/` prefix.
    pub subreddit: String,
    /// Author handle, when the source exposes one.
    pub author: Option<String>,
    /// Creation time, when the source exposes one.
    pub created_at: Option<DateTime<Utc>>,
    /// Absolute permalink on reddit.com. Dedup key.
    pub permalink: String,
    /// Post title (for comments, the title of the parent post if known).
    pub title: String,
    /// Text snippet: self text or comment body, possibly empty.
    pub snippet: String,
    /// Net upvotes.
    pub score: Option<i64>,
    /// Number of comments on the post.
    pub num_comments: Option<u64>,
    /// Fraction of votes that are upvotes, `0.0..=1.0`.
    pub upvote_ratio: Option<f64>,
    /// Link target of a post. For self posts this is the post itself.
    pub url: Option<String>,
    /// Link domain, `self.<subreddit>` for self posts.
    pub domain: Option<String>,
    /// Whether the post is a text post.
    pub is_self: Option<bool>,
    /// The strategy that produced this mention.
    pub strategy: StrategyKind,
}

/// One data-acquisition method, listed in default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Reddit's public `search.json` endpoint.
    JsonApi,
    /// The rendered search page, scraped from a headless browser.
    Browser,
    /// Per-subreddit `search.json` queries over a fixed subreddit list.
    SubredditSweep,
}

impl StrategyKind {
    /// Returns the stable kebab-case name of this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JsonApi => "json-api",
            Self::Browser => "browser",
            Self::SubredditSweep => "subreddit-sweep",
        }
    }

    /// Returns all strategies in their default priority order.
    pub fn all() -> &'static [StrategyKind] {
        &[Self::JsonApi, Self::Browser, Self::SubredditSweep]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "json-api" | "api" => Ok(Self::JsonApi),
            "browser" | "headless" => Ok(Self::Browser),
            "sweep" | "subreddits" | "subreddit-sweep" => Ok(Self::SubredditSweep),
            other => Err(CollectError::InvalidRequest(format!(
                "unknown strategy '{other}' (expected json-api, browser or subreddit-sweep)"
            ))),
        }
    }
}

/// Sort order passed to Reddit search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Reddit's relevance ranking.
    #[default]
    Relevance,
    /// Currently trending.
    Hot,
    /// Newest first.
    New,
    /// Highest score first.
    Top,
    /// Most comments first.
    Comments,
}

impl SortOrder {
    /// Returns the value of Reddit's `sort` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Hot => "hot",
            Self::New => "new",
            Self::Top => "top",
            Self::Comments => "comments",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "hot" => Ok(Self::Hot),
            "new" => Ok(Self::New),
            "top" => Ok(Self::Top),
            "comments" => Ok(Self::Comments),
            other => Err(CollectError::InvalidRequest(format!(
                "unknown sort order '{other}'"
            ))),
        }
    }
}

/// Inclusive UTC time range a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Earliest accepted creation time.
    pub since: DateTime<Utc>,
    /// Latest accepted creation time.
    pub until: DateTime<Utc>,
}

impl TimeWindow {
    /// The `days` days leading up to now.
    ///
    /// A span reaching past the earliest representable instant starts there.
    pub fn trailing_days(days: i64) -> Self {
        let until = Utc::now();
        let since = Duration::try_days(days)
            .and_then(|span| until.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { since, until }
    }

    /// An explicit range. Not validated here; see [`SearchRequest::validate`].
    pub fn between(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self { since, until }
    }

    /// Returns `true` if `at` falls inside the window (both ends inclusive).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.since <= at && at <= self.until
    }

    /// Smallest Reddit `t=` bucket that still reaches back to `since`.
    pub fn reddit_time_filter(&self) -> &'static str {
        self.time_filter_at(Utc::now())
    }

    /// Same as [`reddit_time_filter`](Self::reddit_time_filter) with an explicit "now".
    ///
    /// Five minutes of slack absorb the gap between building the window and
    /// sending the request.
    pub fn time_filter_at(&self, now: DateTime<Utc>) -> &'static str {
        let span = now - self.since - Duration::minutes(5);
        if span <= Duration::hours(1) {
            "hour"
        } else if span <= Duration::days(1) {
            "day"
        } else if span <= Duration::days(7) {
            "week"
        } else if span <= Duration::days(31) {
            "month"
        } else if span <= Duration::days(366) {
            "year"
        } else {
            "all"
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::trailing_days(DEFAULT_WINDOW_DAYS)
    }
}

/// What to search for, over which window, and with which strategies.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Free-text search term; Reddit search syntax (quotes, `OR`) passes through.
    pub term: String,
    /// Accepted creation-time range.
    pub window: TimeWindow,
    /// Strategies to attempt, highest priority first.
    pub strategies: Vec<StrategyKind>,
    /// Reddit sort order.
    pub sort: SortOrder,
    /// Maximum number of mentions kept in the result.
    pub max_results: usize,
}

impl SearchRequest {
    /// A request for `term` over the trailing 7 days using every strategy.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            window: TimeWindow::default(),
            strategies: StrategyKind::all().to_vec(),
            sort: SortOrder::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<StrategyKind>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Rejects requests that cannot produce a meaningful search.
    ///
    /// An empty strategy list is allowed: the result is simply empty.
    pub fn validate(&self) -> Result<(), CollectError> {
        if self.term.trim().is_empty() {
            return Err(CollectError::InvalidRequest("search term is empty".into()));
        }
        if self.max_results == 0 {
            return Err(CollectError::InvalidRequest(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.window.since > self.window.until {
            return Err(CollectError::InvalidRequest(
                "time window starts after it ends".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of one strategy within a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyStatus {
    /// The strategy returned mentions.
    Succeeded {
        /// Mentions the strategy returned.
        found: usize,
        /// Of those, mentions not already held from a higher-priority strategy.
        kept: usize,
    },
    /// The strategy errored, was blocked, or found nothing.
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
    /// The strategy was not run.
    Skipped {
        /// Why it was not run.
        reason: String,
    },
}

impl StrategyStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for StrategyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded { found, kept } => write!(f, "ok ({found} found, {kept} new)"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// Per-strategy line of a [`SearchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyReport {
    pub strategy: StrategyKind,
    pub status: StrategyStatus,
}

/// Deduplicated mentions plus what each strategy did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The term that was searched.
    pub term: String,
    /// The window mentions were filtered to.
    pub window: TimeWindow,
    /// Mentions, newest first, unique by permalink.
    pub mentions: Vec<Mention>,
    /// One entry per requested strategy, in request order.
    pub strategies: Vec<StrategyReport>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Returns `true` when no strategy succeeded.
    ///
    /// Skipped strategies do not count as successes.
    pub fn all_failed(&self) -> bool {
        !self.strategies.iter().any(|r| r.status.is_success())
    }

    /// Status recorded for `kind`, if it was requested.
    pub fn status_of(&self, kind: StrategyKind) -> Option<&StrategyStatus> {
        self.strategies
            .iter()
            .find(|r| r.strategy == kind)
            .map(|r| &r.status)
    }
}
