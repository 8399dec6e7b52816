//! Per-search HTTP session with User-Agent rotation and pacing.
//!
//! A [`Session`] owns one [`reqwest::Client`] (with a cookie store, so it
//! behaves like a single browser visit) and one [`RequestPacer`]. Every
//! outgoing request of a search, including headless page renders, is
//! paced through it.

use crate::config::CollectorConfig;
use crate::error::CollectError;
use crate::pacing::RequestPacer;
use rand::seq::SliceRandom;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Realistic browser User-Agent strings; one is picked per session.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Lowercase phrases Reddit and its CDN put on bot walls.
const BLOCK_MARKERS: &[&str] = &[
    "whoa there, pardner",
    "you've been blocked by network security",
    "please complete the captcha",
    "are you a robot",
    "too many requests",
];

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Build a [`reqwest::Client`] for Reddit requests.
///
/// # Errors
///
/// Returns [`CollectError::Http`] if the client cannot be constructed.
pub fn build_client(config: &CollectorConfig, user_agent: &str) -> Result<reqwest::Client, CollectError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| CollectError::Http(format!("failed to build HTTP client: {e}")))
}

/// Returns the matching marker if `body` looks like a bot wall or CAPTCHA page.
pub fn detect_block_page(body: &str) -> Option<&'static str> {
    let lower = body.to_lowercase();
    BLOCK_MARKERS.iter().copied().find(|m| lower.contains(m))
}

/// Map a non-success status to a strategy error.
fn status_error(status: StatusCode, url: &Url) -> CollectError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            CollectError::Blocked(format!("HTTP 429 rate limited on {}", url.path()))
        }
        StatusCode::FORBIDDEN => CollectError::Blocked(format!("HTTP 403 forbidden on {}", url.path())),
        other => CollectError::Http(format!("HTTP {} on {}", other.as_u16(), url.path())),
    }
}

/// HTTP state shared by all strategies of one search.
#[derive(Debug)]
pub struct Session {
    client: reqwest::Client,
    user_agent: String,
    pacer: RequestPacer,
    config: CollectorConfig,
    requests_sent: usize,
}

impl Session {
    /// Start a fresh session: new client, new cookie jar, new pacing clock.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &CollectorConfig) -> Result<Self, CollectError> {
        let user_agent = match config.user_agent {
            Some(ref custom) => custom.clone(),
            None => random_user_agent().to_owned(),
        };
        let client = build_client(config, &user_agent)?;
        Ok(Self {
            client,
            user_agent,
            pacer: RequestPacer::new(config.request_delay_ms),
            config: config.clone(),
            requests_sent: 0,
        })
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// The User-Agent this session presents; renderers reuse it.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Number of paced requests made so far.
    pub fn requests_sent(&self) -> usize {
        self.requests_sent
    }

    /// Block until the next request may go out, and count it.
    pub async fn pace(&mut self) {
        self.pacer.wait().await;
        self.requests_sent += 1;
    }

    /// Build `{base_url}{path}` with the given query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Config`] if the result is not a valid URL.
    pub fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, CollectError> {
        let raw = format!("{}{path}", self.config.origin());
        Url::parse_with_params(&raw, params)
            .map_err(|e| CollectError::Config(format!("invalid endpoint URL {raw}: {e}")))
    }

    /// Paced GET that expects a JSON body.
    ///
    /// # Errors
    ///
    /// - [`CollectError::Blocked`] on 403/429 or an HTML bot wall where JSON was expected
    /// - [`CollectError::Http`] on transport errors and other non-success statuses
    /// - [`CollectError::Parse`] if the body is not the expected JSON shape
    pub async fn get_json<T: DeserializeOwned>(&mut self, url: Url) -> Result<T, CollectError> {
        self.pace().await;
        tracing::trace!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| CollectError::Http(format!("request to {} failed: {e}", url.path())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, &url));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CollectError::Http(format!("response read failed: {e}")))?;

        tracing::trace!(bytes = body.len(), "response received");

        if body.trim_start().starts_with('<') {
            let marker = detect_block_page(&body).unwrap_or("HTML instead of JSON");
            return Err(CollectError::Blocked(format!(
                "{} returned a web page ({marker})",
                url.path()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| CollectError::Parse(format!("unexpected JSON from {}: {e}", url.path())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> CollectorConfig {
        CollectorConfig {
            base_url,
            request_delay_ms: (0, 0),
            user_agent: Some("TestBot/1.0".into()),
            ..Default::default()
        }
    }

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        let config = CollectorConfig::default();
        assert!(build_client(&config, random_user_agent()).is_ok());
    }

    #[test]
    fn session_uses_custom_ua() {
        let session = Session::new(&test_config("http://localhost".into())).expect("session");
        assert_eq!(session.user_agent(), "TestBot/1.0");
        assert_eq!(session.requests_sent(), 0);
    }

    #[test]
    fn endpoint_encodes_params() {
        let session = Session::new(&test_config("https://www.reddit.com/".into())).expect("session");
        let url = session
            .endpoint("/search.json", &[("q", "\"Acme Corp\" OR Acme"), ("t", "week")])
            .expect("url");
        assert_eq!(url.path(), "/search.json");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("q".into(), "\"Acme Corp\" OR Acme".into()));
        assert_eq!(pairs[1], ("t".into(), "week".into()));
    }

    #[test]
    fn detect_block_page_matches_known_walls() {
        assert_eq!(
            detect_block_page("<h1>Whoa there, pardner!</h1>"),
            Some("whoa there, pardner")
        );
        assert!(detect_block_page("<html><body>search results</body></html>").is_none());
    }

    #[tokio::test]
    async fn get_json_parses_body_and_sends_ua() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", "acme"))
            .and(header("user-agent", "TestBot/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = Session::new(&test_config(server.uri())).expect("session");
        let url = session.endpoint("/search.json", &[("q", "acme")]).expect("url");
        let value: serde_json::Value = session.get_json(url).await.expect("json");
        assert_eq!(value["ok"], true);
        assert_eq!(session.requests_sent(), 1);
    }

    #[tokio::test]
    async fn get_json_maps_429_to_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let mut session = Session::new(&test_config(server.uri())).expect("session");
        let url = session.endpoint("/search.json", &[]).expect("url");
        let err = session.get_json::<serde_json::Value>(url).await.unwrap_err();
        assert!(matches!(err, CollectError::Blocked(_)), "got {err}");
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn get_json_maps_500_to_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut session = Session::new(&test_config(server.uri())).expect("session");
        let url = session.endpoint("/search.json", &[]).expect("url");
        let err = session.get_json::<serde_json::Value>(url).await.unwrap_err();
        assert!(matches!(err, CollectError::Http(_)), "got {err}");
    }

    #[tokio::test]
    async fn get_json_treats_html_as_block() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>Whoa there, pardner!</body></html>"),
            )
            .mount(&server)
            .await;

        let mut session = Session::new(&test_config(server.uri())).expect("session");
        let url = session.endpoint("/search.json", &[]).expect("url");
        let err = session.get_json::<serde_json::Value>(url).await.unwrap_err();
        assert!(matches!(err, CollectError::Blocked(_)), "got {err}");
        assert!(err.to_string().contains("pardner"));
    }
}
