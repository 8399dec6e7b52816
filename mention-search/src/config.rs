//! Collector configuration with sensible defaults.
//!
//! [`CollectorConfig`] controls where requests go, how long they may take,
//! how far apart they are spaced, and how the browser fallback renders pages.
//! The defaults are tuned for polite, low-volume scraping.

use crate::error::CollectError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Subreddits the sweep strategy searches one by one.
pub const DEFAULT_SUBREDDITS: &[&str] = &[
    "technology",
    "business",
    "news",
    "worldnews",
    "stocks",
    "investing",
    "entrepreneur",
    "startups",
    "tech",
    "gadgets",
];

/// Reddit caps listing pages at 100 children.
pub const MAX_PAGE_SIZE: usize = 100;

/// Configuration for a mention collector.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Missing TOML fields fall back to
/// the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Origin for JSON and search-page requests. Overridable for tests and mirrors.
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Delay range in milliseconds `(min, max)` enforced between consecutive
    /// requests of one search. The minimum always applies; the remainder is jitter.
    pub request_delay_ms: (u64, u64),
    /// Custom User-Agent string. If `None`, one is picked from a built-in list
    /// of browser User-Agents for each search.
    pub user_agent: Option<String>,
    /// Maximum `search.json` pages the JSON strategy follows via `after`.
    pub max_pages: usize,
    /// Requested children per listing page (1..=100).
    pub page_size: usize,
    /// Subreddits searched by the sweep strategy.
    pub subreddits: Vec<String>,
    /// Skip remaining strategies once `max_results` unique mentions are held.
    pub stop_when_satisfied: bool,
    /// Headless rendering for the browser strategy.
    pub browser: BrowserConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".into(),
            timeout_seconds: 10,
            request_delay_ms: (500, 1000),
            user_agent: None,
            max_pages: 2,
            page_size: MAX_PAGE_SIZE,
            subreddits: DEFAULT_SUBREDDITS.iter().map(|s| (*s).to_owned()).collect(),
            stop_when_satisfied: false,
            browser: BrowserConfig::default(),
        }
    }
}

impl CollectorConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `base_url` must be an absolute http(s) URL
    /// - `timeout_seconds` must be greater than 0
    /// - `max_pages` must be greater than 0
    /// - `page_size` must be within `1..=100`
    /// - `request_delay_ms.0` must be <= `request_delay_ms.1`
    /// - browser timeout must be greater than 0
    pub fn validate(&self) -> Result<(), CollectError> {
        match url::Url::parse(&self.base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => {
                return Err(CollectError::Config(format!(
                    "base_url '{}' is not an http(s) URL",
                    self.base_url
                )));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(CollectError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_pages == 0 {
            return Err(CollectError::Config(
                "max_pages must be greater than 0".into(),
            ));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(CollectError::Config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.request_delay_ms.0 > self.request_delay_ms.1 {
            return Err(CollectError::Config(
                "request_delay_ms min must be <= max".into(),
            ));
        }
        if self.browser.timeout_seconds == 0 {
            return Err(CollectError::Config(
                "browser.timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// `base_url` without a trailing slash.
    pub(crate) fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Which headless rendering backend the browser strategy uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererBackend {
    /// Spawn a local headless Chrome/Chromium and dump its DOM.
    #[default]
    Chrome,
    /// POST to a Browserless-compatible `/content` endpoint.
    Browserless,
}

/// Settings for the headless page renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub backend: RendererBackend,
    /// Chrome executable. If `None`, common names are looked up on `PATH`.
    pub chrome_binary: Option<PathBuf>,
    /// Base URL of the rendering service when `backend = "browserless"`.
    pub browserless_url: String,
    /// Optional access token appended as `?token=`.
    pub browserless_token: Option<String>,
    /// Milliseconds of page time granted for scripts and lazy loading.
    pub render_budget_ms: u64,
    /// Wall-clock limit for one render, in seconds.
    pub timeout_seconds: u64,
    /// Viewport `(width, height)`.
    pub window_size: (u32, u32),
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            backend: RendererBackend::Chrome,
            chrome_binary: None,
            browserless_url: "http://localhost:3000".into(),
            browserless_token: None,
            render_budget_ms: 6000,
            timeout_seconds: 30,
            window_size: (1920, 1080),
        }
    }
}
