//! Reddit's public `search.json` endpoint, the primary strategy.
//!
//! Cheap, structured, and usually unblocked for low request rates. Follows
//! the listing's `after` cursor for up to `max_pages` pages.

use crate::error::CollectError;
use crate::http::Session;
use crate::strategy::MentionStrategy;
use crate::types::{Mention, SearchRequest, StrategyKind};
use async_trait::async_trait;

use super::listing::Listing;

/// Site-wide JSON search.
pub struct JsonApiStrategy;

#[async_trait]
impl MentionStrategy for JsonApiStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::JsonApi
    }

    async fn collect(
        &self,
        request: &SearchRequest,
        session: &mut Session,
    ) -> Result<Vec<Mention>, CollectError> {
        let time_filter = request.window.reddit_time_filter();
        let max_pages = session.config().max_pages;
        let limit = session
            .config()
            .page_size
            .min(request.max_results)
            .max(1)
            .to_string();

        let mut mentions: Vec<Mention> = Vec::new();
        let mut after: Option<String> = None;

        for page in 0..max_pages {
            let mut params = vec![
                ("q", request.term.as_str()),
                ("sort", request.sort.as_str()),
                ("t", time_filter),
                ("limit", limit.as_str()),
                ("type", "link"),
                ("raw_json", "1"),
            ];
            if let Some(ref cursor) = after {
                params.push(("after", cursor.as_str()));
            }
            let url = session.endpoint("/search.json", &params)?;

            let listing: Listing = match session.get_json(url).await {
                Ok(listing) => listing,
                // Keep what earlier pages returned.
                Err(err) if page > 0 => {
                    tracing::debug!(page, error = %err, "search.json paging stopped");
                    break;
                }
                Err(err) => return Err(err),
            };

            let (page_mentions, next) = listing.into_mentions(StrategyKind::JsonApi);
            tracing::debug!(page, count = page_mentions.len(), "search.json page parsed");
            let page_was_empty = page_mentions.is_empty();
            mentions.extend(page_mentions);

            after = next;
            if after.is_none() || page_was_empty || mentions.len() >= request.max_results {
                break;
            }
        }

        if mentions.is_empty() {
            return Err(CollectError::Empty("search.json returned no posts".into()));
        }
        Ok(mentions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectorConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_session(base_url: String) -> Session {
        let config = CollectorConfig {
            base_url,
            request_delay_ms: (0, 0),
            user_agent: Some("TestBot/1.0".into()),
            ..Default::default()
        };
        Session::new(&config).expect("session")
    }

    fn post(id: &str) -> serde_json::Value {
        json!({"kind": "t3", "data": {
            "id": id,
            "title": format!("Post {id}"),
            "subreddit": "technology",
            "score": 1,
            "num_comments": 0,
            "created_utc": 1714564800.0,
            "permalink": format!("/r/technology/comments/{id}/post/")
        }})
    }

    fn listing(children: Vec<serde_json::Value>, after: Option<&str>) -> serde_json::Value {
        json!({"kind": "Listing", "data": {"children": children, "after": after}})
    }

    #[tokio::test]
    async fn sends_expected_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", "Acme Corp"))
            .and(query_param("sort", "new"))
            .and(query_param("t", "week"))
            .and(query_param("type", "link"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![post("a1")], None)))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = test_session(server.uri());
        let request = SearchRequest::new("Acme Corp")
            .with_sort(crate::types::SortOrder::New)
            .with_max_results(25);
        let mentions = JsonApiStrategy
            .collect(&request, &mut session)
            .await
            .expect("mentions");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].strategy, StrategyKind::JsonApi);
    }

    #[tokio::test]
    async fn follows_after_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("after", "t3_a2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![post("b1")], None)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(listing(vec![post("a1"), post("a2")], Some("t3_a2"))),
            )
            .mount(&server)
            .await;

        let mut session = test_session(server.uri());
        let mentions = JsonApiStrategy
            .collect(&SearchRequest::new("acme"), &mut session)
            .await
            .expect("mentions");
        let ids: Vec<&str> = mentions.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1"]);
        assert_eq!(session.requests_sent(), 2);
    }

    #[tokio::test]
    async fn stops_at_max_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(listing(vec![post("a1")], Some("t3_more"))),
            )
            .expect(2)
            .mount(&server)
            .await;

        let mut session = test_session(server.uri());
        let mentions = JsonApiStrategy
            .collect(&SearchRequest::new("acme"), &mut session)
            .await
            .expect("mentions");
        assert_eq!(mentions.len(), 2);
    }

    #[tokio::test]
    async fn failed_second_page_keeps_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("after", "t3_a1"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(listing(vec![post("a1")], Some("t3_a1"))),
            )
            .mount(&server)
            .await;

        let mut session = test_session(server.uri());
        let mentions = JsonApiStrategy
            .collect(&SearchRequest::new("acme"), &mut session)
            .await
            .expect("first page kept");
        assert_eq!(mentions.len(), 1);
    }

    #[tokio::test]
    async fn empty_listing_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![], None)))
            .mount(&server)
            .await;

        let mut session = test_session(server.uri());
        let err = JsonApiStrategy
            .collect(&SearchRequest::new("acme"), &mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::Empty(_)), "got {err}");
    }

    #[tokio::test]
    async fn rate_limit_on_first_page_is_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let mut session = test_session(server.uri());
        let err = JsonApiStrategy
            .collect(&SearchRequest::new("acme"), &mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::Blocked(_)), "got {err}");
    }

    #[tokio::test]
    #[ignore] // Live test: run with `cargo test -- --ignored`
    async fn live_json_search() {
        let mut session = Session::new(&CollectorConfig::default()).expect("session");
        let mentions = JsonApiStrategy
            .collect(&SearchRequest::new("rust programming").with_max_results(10), &mut session)
            .await
            .expect("live search should work");
        assert!(!mentions.is_empty());
    }
}
