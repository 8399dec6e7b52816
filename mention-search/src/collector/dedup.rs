//! First-wins mention deduplication by canonical permalink.
//!
//! Strategies are run highest priority first, so the first copy of a
//! permalink always comes from the best source. Later copies are dropped
//! whole; fields are never merged across copies.

use std::collections::HashSet;

use crate::types::Mention;

use super::permalink::canonical_permalink;

/// Insertion-ordered set of mentions keyed by canonical permalink.
#[derive(Debug, Default)]
pub struct MentionSet {
    seen: HashSet<String>,
    mentions: Vec<Mention>,
}

impl MentionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `mention` unless its permalink is already held.
    ///
    /// Returns `true` if it was added.
    pub fn insert(&mut self, mention: Mention) -> bool {
        let key = canonical_permalink(&mention.permalink);
        if !self.seen.insert(key) {
            return false;
        }
        self.mentions.push(mention);
        true
    }

    /// Insert every mention in order, returning how many were new.
    pub fn extend(&mut self, mentions: impl IntoIterator<Item = Mention>) -> usize {
        let mut added = 0;
        for mention in mentions {
            if self.insert(mention) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Held mentions in insertion order.
    pub fn into_vec(self) -> Vec<Mention> {
        self.mentions
    }
}

/// Deduplicate a list of mentions, keeping the first of each permalink.
pub fn deduplicate(mentions: Vec<Mention>) -> Vec<Mention> {
    let mut set = MentionSet::new();
    set.extend(mentions);
    set.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MentionKind, StrategyKind};

    fn make_mention(permalink: &str, strategy: StrategyKind, score: i64) -> Mention {
        Mention {
            id: format!("{strategy}-{score}"),
            kind: MentionKind::Post,
            subreddit: "test".into(),
            author: None,
            created_at: None,
            permalink: permalink.to_string(),
            title: format!("from {strategy}"),
            snippet: String::new(),
            score: Some(score),
            num_comments: None,
            upvote_ratio: None,
            url: None,
            domain: None,
            is_self: None,
            strategy,
        }
    }

    #[test]
    fn unique_permalinks_pass_through() {
        let mentions = vec![
            make_mention("https://www.reddit.com/r/a/comments/1/x/", StrategyKind::JsonApi, 1),
            make_mention("https://www.reddit.com/r/a/comments/2/y/", StrategyKind::JsonApi, 2),
        ];
        assert_eq!(deduplicate(mentions).len(), 2);
    }

    #[test]
    fn first_copy_wins_without_merging() {
        let mentions = vec![
            make_mention("https://www.reddit.com/r/a/comments/1/x/", StrategyKind::JsonApi, 5),
            make_mention("https://old.reddit.com/r/A/comments/1/x", StrategyKind::Browser, 900),
        ];
        let deduped = deduplicate(mentions);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].strategy, StrategyKind::JsonApi);
        assert_eq!(deduped[0].score, Some(5));
    }

    #[test]
    fn insertion_order_preserved() {
        let mentions = vec![
            make_mention("/r/a/comments/3/z/", StrategyKind::JsonApi, 3),
            make_mention("/r/a/comments/1/x/", StrategyKind::JsonApi, 1),
            make_mention("/r/a/comments/3/z/", StrategyKind::Browser, 9),
            make_mention("/r/a/comments/2/y/", StrategyKind::Browser, 2),
        ];
        let scores: Vec<Option<i64>> = deduplicate(mentions).iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn extend_counts_new_only() {
        let mut set = MentionSet::new();
        let first = set.extend(vec![
            make_mention("/r/a/comments/1/x/", StrategyKind::JsonApi, 1),
            make_mention("/r/a/comments/2/y/", StrategyKind::JsonApi, 2),
        ]);
        let second = set.extend(vec![
            make_mention("https://reddit.com/r/a/comments/2/y", StrategyKind::Browser, 2),
            make_mention("/r/a/comments/4/w/", StrategyKind::Browser, 4),
        ]);
        assert_eq!(first, 2);
        assert_eq!(second, 1);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(deduplicate(vec![]).is_empty());
        assert!(MentionSet::new().is_empty());
    }
}
