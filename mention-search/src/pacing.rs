//! Fixed inter-request pacing.
//!
//! Every request of a search goes through one [`RequestPacer`], which keeps
//! consecutive requests at least `min` apart, plus random jitter up to `max`.
//! The policy never adapts to responses.

use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Spaces out consecutive requests of a single search.
#[derive(Debug)]
pub struct RequestPacer {
    min_ms: u64,
    max_ms: u64,
    last_request: Option<Instant>,
}

impl RequestPacer {
    /// Create a pacer from a `(min, max)` millisecond range.
    ///
    /// An inverted range is clamped so that `max == min`.
    pub fn new(range_ms: (u64, u64)) -> Self {
        let (min_ms, max_ms) = range_ms;
        Self {
            min_ms,
            max_ms: max_ms.max(min_ms),
            last_request: None,
        }
    }

    /// Draw the gap to enforce before the next request.
    pub fn next_delay(&self) -> Duration {
        if self.max_ms == self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    /// Wait until the next request may be sent, then mark it as sent.
    ///
    /// The first request of a search is never delayed.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let gap = self.next_delay();
            let elapsed = last.elapsed();
            if elapsed < gap {
                tokio::time::sleep(gap - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}
