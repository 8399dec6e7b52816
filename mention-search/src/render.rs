//! Headless page rendering for the browser strategy.
//!
//! Reddit's search page is built client-side, so a plain GET returns an
//! empty shell. A [`PageRenderer`] returns the DOM after scripts have run.

use crate::config::{BrowserConfig, RendererBackend};
use crate::error::CollectError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Executable names looked up on `PATH` when no Chrome binary is configured.
const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Produces the post-JavaScript DOM of a page.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Load `url` presenting `user_agent` and return the rendered HTML.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Render`] if the browser cannot be started, times
    /// out, or returns nothing.
    async fn render(&self, url: &Url, user_agent: &str) -> Result<String, CollectError>;
}

/// Build the renderer selected in `config`.
///
/// # Errors
///
/// Returns [`CollectError::Config`] if the Browserless client cannot be built.
pub fn renderer_from_config(config: &BrowserConfig) -> Result<Box<dyn PageRenderer>, CollectError> {
    match config.backend {
        RendererBackend::Chrome => Ok(Box::new(ChromeRenderer::new(config))),
        RendererBackend::Browserless => Ok(Box::new(BrowserlessRenderer::new(config)?)),
    }
}

/// Local headless Chrome/Chromium, one process per render.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    binary: Option<PathBuf>,
    render_budget_ms: u64,
    timeout: Duration,
    window_size: (u32, u32),
}

impl ChromeRenderer {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            binary: config.chrome_binary.clone(),
            render_budget_ms: config.render_budget_ms,
            timeout: Duration::from_secs(config.timeout_seconds),
            window_size: config.window_size,
        }
    }

    /// The configured binary, else the first Chrome-like executable on `PATH`.
    fn resolve_binary(&self) -> Result<PathBuf, CollectError> {
        if let Some(ref explicit) = self.binary {
            return Ok(explicit.clone());
        }
        CHROME_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| {
                CollectError::Render(format!(
                    "no Chrome executable found on PATH (tried {})",
                    CHROME_CANDIDATES.join(", ")
                ))
            })
    }

    /// Command-line arguments for one headless render of `url`.
    pub fn args(&self, url: &Url, user_agent: &str) -> Vec<String> {
        let (width, height) = self.window_size;
        vec![
            "--headless=new".into(),
            "--disable-gpu".into(),
            "--no-sandbox".into(),
            "--disable-dev-shm-usage".into(),
            "--hide-scrollbars".into(),
            "--mute-audio".into(),
            format!("--window-size={width},{height}"),
            format!("--user-agent={user_agent}"),
            format!("--virtual-time-budget={}", self.render_budget_ms),
            "--dump-dom".into(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    fn name(&self) -> &'static str {
        "chrome"
    }

    async fn render(&self, url: &Url, user_agent: &str) -> Result<String, CollectError> {
        let binary = self.resolve_binary()?;
        tracing::debug!(binary = %binary.display(), "starting headless chrome");

        let mut command = tokio::process::Command::new(&binary);
        command.args(self.args(url, user_agent)).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                CollectError::Render(format!(
                    "headless chrome timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                CollectError::Render(format!("failed to execute {}: {e}", binary.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first_line = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
            return Err(CollectError::Render(format!(
                "{} exited with {}: {first_line}",
                binary.display(),
                output.status
            )));
        }

        let dom = String::from_utf8_lossy(&output.stdout).into_owned();
        if dom.trim().is_empty() {
            return Err(CollectError::Render("headless chrome returned an empty DOM".into()));
        }
        tracing::trace!(bytes = dom.len(), "DOM dumped");
        Ok(dom)
    }
}

/// A Browserless-compatible rendering service (`POST /content`).
pub struct BrowserlessRenderer {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessRenderer {
    /// # Errors
    ///
    /// Returns [`CollectError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &BrowserConfig) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CollectError::Config(format!("failed to build renderer client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.browserless_url.trim_end_matches('/').to_string(),
            token: config.browserless_token.clone(),
        })
    }

    fn endpoint(&self) -> String {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }
}

#[async_trait]
impl PageRenderer for BrowserlessRenderer {
    fn name(&self) -> &'static str {
        "browserless"
    }

    async fn render(&self, url: &Url, user_agent: &str) -> Result<String, CollectError> {
        let body = serde_json::json!({
            "url": url.as_str(),
            "userAgent": user_agent,
            "gotoOptions": { "waitUntil": "networkidle2" },
        });

        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| CollectError::Render(format!("rendering service unreachable: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CollectError::Render(format!(
                "rendering service returned {}: {}",
                status.as_u16(),
                message.trim()
            )));
        }

        resp.text()
            .await
            .map_err(|e| CollectError::Render(format!("rendering service response read failed: {e}")))
    }
}
