//! Turning configured defaults plus command-line overrides into a search.

use crate::config::{SearchDefaults, TrackerConfig};
use crate::error::{Result, TrackerError};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use mention_search::{
    Collector, ProgressCallback, SearchRequest, SearchResult, SortOrder, StrategyKind, TimeWindow,
};

/// Per-invocation overrides of [`SearchDefaults`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOverrides {
    /// Trailing window in days. Ignored when `since` is set.
    pub days: Option<i64>,
    /// First UTC day included.
    pub since: Option<NaiveDate>,
    /// Last UTC day included. Defaults to now.
    pub until: Option<NaiveDate>,
    pub max_results: Option<usize>,
    pub sort: Option<SortOrder>,
    /// Empty means use the configured strategy list.
    pub strategies: Vec<StrategyKind>,
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    start_of_day(day) + Duration::days(1) - Duration::seconds(1)
}

/// Resolve the search window at `now`.
///
/// # Errors
///
/// Returns [`TrackerError::Config`] for a non-positive day count or a range
/// whose start is after its end.
pub fn resolve_window(
    defaults: &SearchDefaults,
    overrides: &SearchOverrides,
    now: DateTime<Utc>,
) -> Result<TimeWindow> {
    let until = overrides.until.map_or(now, end_of_day);
    let since = match overrides.since {
        Some(day) => start_of_day(day),
        None => {
            let days = overrides.days.unwrap_or(defaults.days);
            if days <= 0 {
                return Err(TrackerError::Config(format!(
                    "days must be greater than 0, got {days}"
                )));
            }
            Duration::try_days(days)
                .and_then(|span| until.checked_sub_signed(span))
                .ok_or_else(|| {
                    TrackerError::Config(format!("days out of range: {days}"))
                })?
        }
    };
    if since > until {
        return Err(TrackerError::Config(format!(
            "since ({}) is after until ({})",
            since.date_naive(),
            until.date_naive()
        )));
    }
    Ok(TimeWindow::between(since, until))
}

/// Build the request for `term` from `defaults` and `overrides`.
///
/// # Errors
///
/// Returns [`TrackerError::Config`] if the window cannot be resolved, or
/// [`TrackerError::Search`] if the resulting request is invalid.
pub fn build_request(
    term: &str,
    defaults: &SearchDefaults,
    overrides: &SearchOverrides,
    now: DateTime<Utc>,
) -> Result<SearchRequest> {
    let strategies = if overrides.strategies.is_empty() {
        defaults.strategies.clone()
    } else {
        overrides.strategies.clone()
    };
    let request = SearchRequest::new(term.trim())
        .with_window(resolve_window(defaults, overrides, now)?)
        .with_sort(overrides.sort.unwrap_or(defaults.sort))
        .with_max_results(overrides.max_results.unwrap_or(defaults.max_results))
        .with_strategies(strategies);
    request.validate()?;
    Ok(request)
}

/// Run `request` with every built-in strategy configured from `config`.
///
/// # Errors
///
/// Returns [`TrackerError::Search`] if the collector cannot be built or the
/// request is rejected. Individual strategy failures are not errors.
pub async fn run_search(
    config: &TrackerConfig,
    request: &SearchRequest,
    progress: Option<&ProgressCallback>,
) -> Result<SearchResult> {
    let collector = Collector::from_config(config.collector.clone())?;
    let result = collector.collect_with_progress(request, progress).await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn default_window_is_trailing_days() {
        let window = resolve_window(&SearchDefaults::default(), &SearchOverrides::default(), now())
            .unwrap();
        assert_eq!(window.until, now());
        assert_eq!(window.since, now() - Duration::days(7));
    }

    #[test]
    fn days_override() {
        let overrides = SearchOverrides {
            days: Some(2),
            ..Default::default()
        };
        let window = resolve_window(&SearchDefaults::default(), &overrides, now()).unwrap();
        assert_eq!(window.since, now() - Duration::days(2));
    }

    #[test]
    fn explicit_range_covers_whole_days() {
        let overrides = SearchOverrides {
            since: Some(day(1)),
            until: Some(day(3)),
            ..Default::default()
        };
        let window = resolve_window(&SearchDefaults::default(), &overrides, now()).unwrap();
        assert_eq!(window.since, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(window.until, Utc.with_ymd_and_hms(2024, 5, 3, 23, 59, 59).unwrap());
    }

    #[test]
    fn inverted_range_rejected() {
        let overrides = SearchOverrides {
            since: Some(day(5)),
            until: Some(day(3)),
            ..Default::default()
        };
        let err = resolve_window(&SearchDefaults::default(), &overrides, now()).unwrap_err();
        assert!(err.to_string().contains("after"));
    }

    #[test]
    fn non_positive_days_rejected() {
        let overrides = SearchOverrides {
            days: Some(0),
            ..Default::default()
        };
        assert!(resolve_window(&SearchDefaults::default(), &overrides, now()).is_err());
    }

    #[test]
    fn huge_day_count_is_an_error() {
        let overrides = SearchOverrides {
            days: Some(1_000_000_000),
            ..Default::default()
        };
        let err = resolve_window(&SearchDefaults::default(), &overrides, now()).unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
        assert!(err.to_string().contains("out of range"));

        let defaults = SearchDefaults {
            days: i64::MAX,
            ..Default::default()
        };
        assert!(resolve_window(&defaults, &SearchOverrides::default(), now()).is_err());
    }

    #[test]
    fn request_uses_overrides_then_defaults() {
        let overrides = SearchOverrides {
            max_results: Some(25),
            strategies: vec![StrategyKind::Browser],
            ..Default::default()
        };
        let request = build_request(" acme ", &SearchDefaults::default(), &overrides, now()).unwrap();
        assert_eq!(request.term, "acme");
        assert_eq!(request.max_results, 25);
        assert_eq!(request.sort, SortOrder::Relevance);
        assert_eq!(request.strategies, vec![StrategyKind::Browser]);

        let request =
            build_request("acme", &SearchDefaults::default(), &SearchOverrides::default(), now())
                .unwrap();
        assert_eq!(request.strategies, StrategyKind::all().to_vec());
        assert_eq!(request.max_results, 200);
    }

    #[test]
    fn empty_term_rejected() {
        let err = build_request("   ", &SearchDefaults::default(), &SearchOverrides::default(), now())
            .unwrap_err();
        assert!(matches!(err, TrackerError::Search(_)));
    }
}
