//! Window filtering, newest-first ordering, and truncation.

use std::cmp::Ordering;

use crate::types::{Mention, TimeWindow};

/// Produce the final mention list for a result.
///
/// 1. Drop mentions whose timestamp falls outside `window`. Mentions without
///    a timestamp are kept.
/// 2. Sort newest first; undated mentions go last. The sort is stable, so
///    ties keep collection (priority) order.
/// 3. Truncate to `max_results`.
pub fn finalize(mentions: Vec<Mention>, window: &TimeWindow, max_results: usize) -> Vec<Mention> {
    let mut kept: Vec<Mention> = mentions
        .into_iter()
        .filter(|m| m.created_at.is_none_or(|at| window.contains(at)))
        .collect();

    kept.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    kept.truncate(max_results);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MentionKind, StrategyKind};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
    }

    fn mention(id: &str, created_at: Option<DateTime<Utc>>) -> Mention {
        Mention {
            id: id.into(),
            kind: MentionKind::Post,
            subreddit: "s".into(),
            author: None,
            created_at,
            permalink: format!("/r/s/comments/{id}/"),
            title: id.into(),
            snippet: String::new(),
            score: None,
            num_comments: None,
            upvote_ratio: None,
            url: None,
            domain: None,
            is_self: None,
            strategy: StrategyKind::JsonApi,
        }
    }

    fn window() -> TimeWindow {
        TimeWindow::between(at(1), at(8))
    }

    fn ids(mentions: &[Mention]) -> Vec<&str> {
        mentions.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn newest_first_undated_last() {
        let out = finalize(
            vec![
                mention("undated", None),
                mention("old", Some(at(2))),
                mention("new", Some(at(7))),
            ],
            &window(),
            10,
        );
        assert_eq!(ids(&out), vec!["new", "old", "undated"]);
    }

    #[test]
    fn out_of_window_dropped() {
        let out = finalize(
            vec![
                mention("before", Some(at(1) - Duration::seconds(1))),
                mention("inside", Some(at(4))),
                mention("after", Some(at(9))),
            ],
            &window(),
            10,
        );
        assert_eq!(ids(&out), vec!["inside"]);
    }

    #[test]
    fn ties_keep_collection_order() {
        let out = finalize(
            vec![
                mention("first", Some(at(3))),
                mention("second", Some(at(3))),
                mention("u1", None),
                mention("u2", None),
            ],
            &window(),
            10,
        );
        assert_eq!(ids(&out), vec!["first", "second", "u1", "u2"]);
    }

    #[test]
    fn truncates_after_sorting() {
        let out = finalize(
            vec![
                mention("a", Some(at(2))),
                mention("b", Some(at(6))),
                mention("c", Some(at(4))),
            ],
            &window(),
            2,
        );
        assert_eq!(ids(&out), vec!["b", "c"]);
    }
}
