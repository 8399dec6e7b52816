//! Reddit listing JSON (`search.json`) and its conversion to [`Mention`]s.

use crate::types::{Mention, MentionKind, StrategyKind};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Host used to absolutise relative permalinks.
pub(crate) const REDDIT_ORIGIN: &str = "https://www.reddit.com";

/// Snippets longer than this many characters are cut.
const SNIPPET_CHARS: usize = 500;

/// Top-level `{"kind": "Listing", "data": {...}}` envelope.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListingData {
    pub children: Vec<Thing>,
    /// Cursor for the next page; `None` on the last page.
    pub after: Option<String>,
}

/// One listing child: `t3` is a post, `t1` a comment.
#[derive(Debug, Deserialize)]
pub struct Thing {
    pub kind: String,
    #[serde(default)]
    pub data: ThingData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThingData {
    pub id: String,
    pub title: Option<String>,
    pub link_title: Option<String>,
    pub selftext: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
    pub subreddit: String,
    pub score: Option<i64>,
    pub num_comments: Option<u64>,
    pub created_utc: Option<f64>,
    pub permalink: String,
    pub upvote_ratio: Option<f64>,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub is_self: Option<bool>,
}

impl Listing {
    /// Convert every post/comment child into a mention, skipping other kinds
    /// and children without a permalink.
    pub fn into_mentions(self, strategy: StrategyKind) -> (Vec<Mention>, Option<String>) {
        let ListingData { children, after } = self.data;
        let mentions = children
            .into_iter()
            .filter_map(|thing| thing.into_mention(strategy))
            .collect();
        (mentions, after)
    }
}

impl Thing {
    fn into_mention(self, strategy: StrategyKind) -> Option<Mention> {
        let kind = match self.kind.as_str() {
            "t3" => MentionKind::Post,
            "t1" => MentionKind::Comment,
            _ => return None,
        };
        let data = self.data;
        if data.permalink.trim().is_empty() {
            return None;
        }

        let text = match kind {
            MentionKind::Post => data.selftext,
            MentionKind::Comment => data.body,
        };
        let title = data.title.or(data.link_title).unwrap_or_default();

        Some(Mention {
            id: data.id,
            kind,
            subreddit: data.subreddit,
            author: data.author.filter(|a| !a.is_empty()),
            created_at: data.created_utc.and_then(timestamp_from_epoch),
            permalink: absolute_permalink(&data.permalink),
            title,
            snippet: truncate_snippet(text.as_deref().unwrap_or_default()),
            score: data.score,
            num_comments: data.num_comments,
            upvote_ratio: data.upvote_ratio.filter(|r| r.is_finite()),
            url: data.url.filter(|u| !u.trim().is_empty()),
            domain: data.domain.filter(|d| !d.is_empty()),
            is_self: data.is_self,
            strategy,
        })
    }
}

/// Reddit reports `created_utc` as fractional epoch seconds.
fn timestamp_from_epoch(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

/// Prefix relative permalinks (`/r/...`) with the Reddit origin.
pub(crate) fn absolute_permalink(permalink: &str) -> String {
    let trimmed = permalink.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.starts_with('/') {
        format!("{REDDIT_ORIGIN}{trimmed}")
    } else {
        format!("{REDDIT_ORIGIN}/{trimmed}")
    }
}

pub(crate) fn truncate_snippet(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
