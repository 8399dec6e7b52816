//! Sequential multi-strategy collection.
//!
//! Strategies run in the request's priority order on one shared [`Session`],
//! so a single User-Agent, cookie jar and pacer cover the whole search.

use crate::config::CollectorConfig;
use crate::error::CollectError;
use crate::http::Session;
use crate::render::renderer_from_config;
use crate::strategies::{BrowserStrategy, JsonApiStrategy, SubredditSweepStrategy};
use crate::strategy::MentionStrategy;
use crate::types::{SearchRequest, SearchResult, StrategyKind, StrategyReport, StrategyStatus};

use super::dedup::MentionSet;
use super::ordering::finalize;
use super::progress::{ProgressCallback, ProgressEvent};

/// Runs registered strategies for a [`SearchRequest`] and merges their output.
pub struct Collector {
    config: CollectorConfig,
    strategies: Vec<Box<dyn MentionStrategy>>,
}

impl Collector {
    /// Build a collector with every built-in strategy registered.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Config`] if `config` is invalid or the
    /// configured page renderer cannot be constructed.
    pub fn from_config(config: CollectorConfig) -> Result<Self, CollectError> {
        config.validate()?;
        let renderer = renderer_from_config(&config.browser)?;
        let strategies: Vec<Box<dyn MentionStrategy>> = vec![
            Box::new(JsonApiStrategy),
            Box::new(BrowserStrategy::new(renderer)),
            Box::new(SubredditSweepStrategy),
        ];
        Ok(Self { config, strategies })
    }

    /// Build a collector with a caller-supplied strategy set.
    ///
    /// When two strategies report the same [`StrategyKind`], the first wins.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Config`] if `config` is invalid.
    pub fn with_strategies(
        config: CollectorConfig,
        strategies: Vec<Box<dyn MentionStrategy>>,
    ) -> Result<Self, CollectError> {
        config.validate()?;
        Ok(Self { config, strategies })
    }

    fn strategy(&self, kind: StrategyKind) -> Option<&dyn MentionStrategy> {
        self.strategies
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.as_ref())
    }

    /// Collect mentions for `request`.
    ///
    /// # Errors
    ///
    /// Only an invalid request or a failure to build the HTTP session is an
    /// error. Strategy failures are reported per strategy in
    /// [`SearchResult::strategies`].
    pub async fn collect(&self, request: &SearchRequest) -> Result<SearchResult, CollectError> {
        self.collect_with_progress(request, None).await
    }

    /// Collect mentions for `request`, reporting progress to `progress`.
    ///
    /// # Pipeline
    ///
    /// 1. Validate the request and open one [`Session`]
    /// 2. Run each requested strategy in order, unless it is a repeat, the
    ///    result set is already full with `stop_when_satisfied`, or the
    ///    strategy asks to be skipped
    /// 3. Merge output first-wins by canonical permalink
    /// 4. Drop out-of-window mentions, sort newest first, truncate
    ///
    /// # Errors
    ///
    /// Same as [`Collector::collect`].
    pub async fn collect_with_progress(
        &self,
        request: &SearchRequest,
        progress: Option<&ProgressCallback>,
    ) -> Result<SearchResult, CollectError> {
        request.validate()?;
        let mut session = Session::new(&self.config)?;
        let emit = |event: ProgressEvent| {
            if let Some(callback) = progress {
                callback(event);
            }
        };

        tracing::trace!(term = %request.term, "collecting mentions");
        tracing::debug!(
            strategies = request.strategies.len(),
            max_results = request.max_results,
            time_filter = request.window.reddit_time_filter(),
            "search started"
        );

        let total = request.strategies.len();
        let mut held = MentionSet::new();
        let mut reports: Vec<StrategyReport> = Vec::with_capacity(total);

        for (index, &kind) in request.strategies.iter().enumerate() {
            emit(ProgressEvent::StrategyStarted {
                strategy: kind,
                position: index + 1,
                total,
            });

            let status = self.run_strategy(kind, request, &mut session, &mut held, &reports).await;
            tracing::debug!(strategy = %kind, status = %status, collected = held.len(), "strategy done");

            emit(ProgressEvent::StrategyFinished {
                strategy: kind,
                status: status.clone(),
                collected: held.len(),
            });
            reports.push(StrategyReport { strategy: kind, status });
        }

        let mentions = finalize(held.into_vec(), &request.window, request.max_results);
        let result = SearchResult {
            term: request.term.clone(),
            window: request.window,
            mentions,
            strategies: reports,
        };

        if result.all_failed() && !result.strategies.is_empty() {
            tracing::warn!("every strategy failed; returning an empty result");
        }
        tracing::info!(
            mentions = result.len(),
            requests = session.requests_sent(),
            "search finished"
        );

        emit(ProgressEvent::Finished {
            mentions: result.len(),
        });
        Ok(result)
    }

    async fn run_strategy(
        &self,
        kind: StrategyKind,
        request: &SearchRequest,
        session: &mut Session,
        held: &mut MentionSet,
        reports: &[StrategyReport],
    ) -> StrategyStatus {
        if reports.iter().any(|r| r.strategy == kind) {
            return StrategyStatus::Skipped {
                reason: "already ran earlier in this search".into(),
            };
        }

        if self.config.stop_when_satisfied && held.len() >= request.max_results {
            return StrategyStatus::Skipped {
                reason: format!("already holding {} mentions", held.len()),
            };
        }

        let Some(strategy) = self.strategy(kind) else {
            tracing::warn!(strategy = %kind, "strategy requested but not registered");
            return StrategyStatus::Failed {
                reason: "strategy not available".into(),
            };
        };

        if let Some(reason) = strategy.skip_reason(request, held.len()) {
            return StrategyStatus::Skipped { reason };
        }

        match strategy.collect(request, session).await {
            Ok(mentions) if mentions.is_empty() => {
                let err = CollectError::Empty(format!("{kind} returned no mentions"));
                tracing::warn!(strategy = %kind, error = %err, "strategy found nothing");
                StrategyStatus::Failed {
                    reason: err.to_string(),
                }
            }
            Ok(mentions) => {
                let found = mentions.len();
                let kept = held.extend(mentions);
                StrategyStatus::Succeeded { found, kept }
            }
            Err(err) => {
                tracing::warn!(strategy = %kind, error = %err, "strategy failed");
                StrategyStatus::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
