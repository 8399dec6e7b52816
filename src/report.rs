//! Plain-text summary of a search result.

use chrono::NaiveDate;
use mention_search::{Mention, SearchResult, StrategyReport};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Number of subreddits listed in the summary.
const TOP_SUBREDDITS: usize = 10;

/// Number of recent mentions listed in the summary.
const RECENT_MENTIONS: usize = 10;

/// Aggregate statistics over a [`SearchResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub term: String,
    pub total: usize,
    /// Mean score over mentions that carry one; 0.0 when none do.
    pub average_score: f64,
    pub total_comments: u64,
    pub unique_subreddits: usize,
    /// Mentions per UTC day, oldest first. Undated mentions are not counted.
    pub daily_counts: BTreeMap<NaiveDate, usize>,
    /// Most mentioned subreddits, highest count first, ties by name.
    pub top_subreddits: Vec<(String, usize)>,
    pub strategies: Vec<StrategyReport>,
    /// Up to ten newest mentions: `(date, subreddit, title)`.
    pub recent: Vec<(Option<NaiveDate>, String, String)>,
}

impl Summary {
    pub fn from_result(result: &SearchResult) -> Self {
        let mentions = &result.mentions;

        let scores: Vec<i64> = mentions.iter().filter_map(|m| m.score).collect();
        let average_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64
        };

        let mut daily_counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for at in mentions.iter().filter_map(|m| m.created_at) {
            *daily_counts.entry(at.date_naive()).or_default() += 1;
        }

        let subreddit_counts = count_subreddits(mentions);
        let unique_subreddits = subreddit_counts.len();
        let mut top_subreddits: Vec<(String, usize)> = subreddit_counts.into_iter().collect();
        top_subreddits.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_subreddits.truncate(TOP_SUBREDDITS);

        Self {
            term: result.term.clone(),
            total: mentions.len(),
            average_score,
            total_comments: mentions.iter().filter_map(|m| m.num_comments).sum(),
            unique_subreddits,
            daily_counts,
            top_subreddits,
            strategies: result.strategies.clone(),
            recent: mentions
                .iter()
                .take(RECENT_MENTIONS)
                .map(|m| {
                    (
                        m.created_at.map(|at| at.date_naive()),
                        m.subreddit.clone(),
                        m.title.clone(),
                    )
                })
                .collect(),
        }
    }
}

/// Case-insensitive subreddit counts keyed by the first spelling seen.
fn count_subreddits(mentions: &[Mention]) -> HashMap<String, usize> {
    let mut names: HashMap<String, String> = HashMap::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for mention in mentions.iter().filter(|m| !m.subreddit.is_empty()) {
        let name = names
            .entry(mention.subreddit.to_lowercase())
            .or_insert_with(|| mention.subreddit.clone());
        *counts.entry(name.clone()).or_default() += 1;
    }
    counts
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results for '{}'", self.term)?;
        writeln!(f, "  Total mentions:  {}", self.total)?;
        writeln!(f, "  Average score:   {:.1}", self.average_score)?;
        writeln!(f, "  Total comments:  {}", self.total_comments)?;
        writeln!(f, "  Subreddits:      {}", self.unique_subreddits)?;

        if !self.daily_counts.is_empty() {
            writeln!(f)?;
            writeln!(f, "Mentions per day")?;
            for (day, count) in &self.daily_counts {
                writeln!(f, "  {day}  {count}")?;
            }
        }

        if !self.top_subreddits.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top subreddits")?;
            for (name, count) in &self.top_subreddits {
                writeln!(f, "  r/{name:<24} {count}")?;
            }
        }

        if !self.recent.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recent mentions")?;
            for (day, subreddit, title) in &self.recent {
                let day = day.map_or_else(|| "----------".to_string(), |d| d.to_string());
                writeln!(f, "  {day}  r/{subreddit}  {title}")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Strategies")?;
        if self.strategies.is_empty() {
            writeln!(f, "  (none requested)")?;
        }
        for report in &self.strategies {
            writeln!(f, "  {:<16} {}", report.strategy.name(), report.status)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::{TimeZone, Utc};
    use mention_search::{MentionKind, StrategyKind, StrategyStatus, TimeWindow};

    fn mention(id: &str, subreddit: &str, day: u32, score: Option<i64>, comments: u64) -> Mention {
        Mention {
            id: id.into(),
            kind: MentionKind::Post,
            subreddit: subreddit.into(),
            author: None,
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap()),
            permalink: format!("/r/{subreddit}/comments/{id}/"),
            title: format!("title {id}"),
            snippet: String::new(),
            score,
            num_comments: Some(comments),
            upvote_ratio: None,
            url: None,
            domain: None,
            is_self: None,
            strategy: StrategyKind::JsonApi,
        }
    }

    fn result(mentions: Vec<Mention>) -> SearchResult {
        SearchResult {
            term: "acme".into(),
            window: TimeWindow::default(),
            mentions,
            strategies: vec![
                StrategyReport {
                    strategy: StrategyKind::JsonApi,
                    status: StrategyStatus::Succeeded { found: 4, kept: 4 },
                },
                StrategyReport {
                    strategy: StrategyKind::SubredditSweep,
                    status: StrategyStatus::Skipped {
                        reason: "enough mentions".into(),
                    },
                },
            ],
        }
    }

    #[test]
    fn aggregates() {
        let summary = Summary::from_result(&result(vec![
            mention("a", "stocks", 3, Some(10), 4),
            mention("b", "Stocks", 3, Some(20), 1),
            mention("c", "news", 2, None, 0),
            mention("d", "business", 1, Some(0), 5),
        ]));
        assert_eq!(summary.total, 4);
        assert!((summary.average_score - 10.0).abs() < f64::EPSILON);
        assert_eq!(summary.total_comments, 10);
        assert_eq!(summary.unique_subreddits, 3);
        let days: Vec<usize> = summary.daily_counts.values().copied().collect();
        assert_eq!(days, vec![1, 1, 2]);
        assert_eq!(
            summary.top_subreddits,
            vec![
                ("stocks".to_string(), 2),
                ("business".to_string(), 1),
                ("news".to_string(), 1),
            ]
        );
    }

    #[test]
    fn average_of_extreme_scores_does_not_overflow() {
        let summary = Summary::from_result(&result(vec![
            mention("a", "news", 1, Some(i64::MAX), 0),
            mention("b", "news", 2, Some(i64::MAX), 0),
        ]));
        assert!((summary.average_score - i64::MAX as f64).abs() <= 1.0e4);
    }

    #[test]
    fn empty_result() {
        let summary = Summary::from_result(&result(vec![]));
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_score, 0.0);
        assert!(summary.daily_counts.is_empty());
        let text = summary.to_string();
        assert!(text.contains("Total mentions:  0"));
        assert!(!text.contains("Top subreddits"));
    }

    #[test]
    fn display_lists_strategies() {
        let text = Summary::from_result(&result(vec![mention("a", "news", 1, Some(3), 0)])).to_string();
        assert!(text.contains("Results for 'acme'"));
        assert!(text.contains("r/news"));
        assert!(text.contains("json-api"));
        assert!(text.contains("ok (4 found, 4 new)"));
        assert!(text.contains("skipped: enough mentions"));
    }
}
