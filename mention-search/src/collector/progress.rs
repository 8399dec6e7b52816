//! Progress events emitted while a search runs.
//!
//! Decouples the collector from presentation (CLI spinner, logs, tests).

use crate::types::{StrategyKind, StrategyStatus};

/// Progress events emitted by [`super::Collector::collect_with_progress`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A strategy is about to run.
    StrategyStarted {
        strategy: StrategyKind,
        /// 1-based position in the request's strategy list.
        position: usize,
        /// Number of strategies in the request.
        total: usize,
    },

    /// A strategy finished, failed, or was skipped.
    StrategyFinished {
        strategy: StrategyKind,
        status: StrategyStatus,
        /// Unique mentions held after this strategy.
        collected: usize,
    },

    /// The search is complete.
    Finished {
        /// Mentions in the final result after window filtering and truncation.
        mentions: usize,
    },
}

impl ProgressEvent {
    /// Rough completion fraction in `0.0..=1.0`, for progress bars.
    pub fn fraction(&self) -> Option<f32> {
        match self {
            Self::StrategyStarted { position, total, .. } if *total > 0 => {
                Some((*position as f32 - 1.0) / *total as f32)
            }
            Self::Finished { .. } => Some(1.0),
            _ => None,
        }
    }
}

/// Callback type for receiving progress events.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;
