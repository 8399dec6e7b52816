//! Headless-browser fallback: render Reddit's search page and scrape it.
//!
//! Slower and more fragile than the JSON endpoint, but it sees what a
//! logged-out visitor sees when the API is rate-limited. Understands
//! `shreddit-post` custom elements, the `search-telemetry-tracker` result
//! units of the SDUI search page, and `data-testid` post containers from the
//! older redesign.

use crate::collector::dedup::deduplicate;
use crate::error::CollectError;
use crate::http::{detect_block_page, Session};
use crate::render::PageRenderer;
use crate::strategy::MentionStrategy;
use crate::types::{Mention, MentionKind, SearchRequest, StrategyKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use super::listing::{absolute_permalink, truncate_snippet};

/// Browser-automation strategy backed by a [`PageRenderer`].
pub struct BrowserStrategy {
    renderer: Box<dyn PageRenderer>,
}

impl BrowserStrategy {
    pub fn new(renderer: Box<dyn PageRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl MentionStrategy for BrowserStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Browser
    }

    async fn collect(
        &self,
        request: &SearchRequest,
        session: &mut Session,
    ) -> Result<Vec<Mention>, CollectError> {
        let url = session.endpoint(
            "/search/",
            &[
                ("q", request.term.as_str()),
                ("type", "link"),
                ("sort", request.sort.as_str()),
                ("t", request.window.reddit_time_filter()),
            ],
        )?;

        session.pace().await;
        tracing::debug!(renderer = self.renderer.name(), "rendering search page");
        let html = self.renderer.render(&url, session.user_agent()).await?;

        let mentions = parse_search_page(&html, request.max_results)?;
        if mentions.is_empty() {
            if let Some(marker) = detect_block_page(&html) {
                return Err(CollectError::Blocked(format!(
                    "search page shows a bot wall ({marker})"
                )));
            }
            return Err(CollectError::Empty("rendered search page had no posts".into()));
        }
        Ok(mentions)
    }
}

fn selector(css: &str) -> Result<Selector, CollectError> {
    Selector::parse(css).map_err(|e| CollectError::Parse(format!("invalid selector {css}: {e:?}")))
}

/// Parse a rendered search page into mentions.
///
/// Extracted as a separate function for testability with fixture HTML.
pub(crate) fn parse_search_page(html: &str, max_results: usize) -> Result<Vec<Mention>, CollectError> {
    let document = Html::parse_document(html);

    let mut mentions = parse_shreddit_posts(&document)?;
    mentions.extend(parse_post_containers(&document)?);
    // Layouts can nest, so the same post may be matched twice.
    let mut mentions = deduplicate(mentions);
    mentions.truncate(max_results);

    tracing::debug!(count = mentions.len(), "search page parsed");
    Ok(mentions)
}

/// Current layout: everything lives in attributes of `<shreddit-post>`.
fn parse_shreddit_posts(document: &Html) -> Result<Vec<Mention>, CollectError> {
    let post_sel = selector("shreddit-post")?;
    let mut mentions = Vec::new();

    for post in document.select(&post_sel) {
        let attrs = post.value();
        let Some(permalink) = attrs.attr("permalink").filter(|p| !p.trim().is_empty()) else {
            continue;
        };
        let permalink = absolute_permalink(permalink);

        let id = attrs
            .attr("id")
            .map(|id| id.trim_start_matches("t3_").to_string())
            .filter(|id| !id.is_empty())
            .or_else(|| post_id_from_permalink(&permalink))
            .unwrap_or_else(|| permalink.clone());

        let subreddit = attrs
            .attr("subreddit-prefixed-name")
            .or_else(|| attrs.attr("subreddit-name"))
            .map(strip_subreddit_prefix)
            .or_else(|| subreddit_from_permalink(&permalink))
            .unwrap_or_default();

        mentions.push(Mention {
            id,
            kind: MentionKind::Post,
            subreddit,
            author: attrs.attr("author").map(str::to_string).filter(|a| !a.is_empty()),
            created_at: attrs.attr("created-timestamp").and_then(parse_timestamp),
            title: attrs.attr("post-title").unwrap_or_default().trim().to_string(),
            snippet: String::new(),
            score: attrs.attr("score").and_then(parse_abbreviated),
            num_comments: attrs.attr("comment-count").and_then(parse_count),
            upvote_ratio: None,
            url: attrs
                .attr("content-href")
                .filter(|h| !h.trim().is_empty())
                .map(absolute_permalink),
            domain: attrs.attr("domain").map(str::to_string).filter(|d| !d.is_empty()),
            is_self: attrs.attr("post-type").map(|t| t == "text"),
            permalink,
            strategy: StrategyKind::Browser,
        });
    }

    Ok(mentions)
}

/// Older redesign and the SDUI search layout: containers with nested
/// labelled elements.
fn parse_post_containers(document: &Html) -> Result<Vec<Mention>, CollectError> {
    let container_sel = selector(
        r#"[data-testid="post-container"], [data-testid="search-post-unit"], search-telemetry-tracker[data-testid="search-sdui-post"]"#,
    )?;
    let link_sel = selector(r#"a[data-testid="post-title"], a[data-testid="post-title-text"]"#)?;
    let heading_sel = selector("h3")?;
    let subreddit_sel = selector(r#"[data-testid="subreddit-name"]"#)?;
    let author_sel = selector(r#"[data-testid="post_author_link"]"#)?;
    let score_sel = selector(r#"[data-testid="post-vote-count-unvoted"]"#)?;
    let comments_sel = selector(r#"[data-testid="post-comment-count"]"#)?;
    let time_sel = selector("time[datetime], faceplate-timeago[ts]")?;
    let body_sel = selector(r#"[data-testid="post-body-text"], [data-click-id="text"]"#)?;

    let mut mentions = Vec::new();

    for container in document.select(&container_sel) {
        let Some(link) = container.select(&link_sel).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href").filter(|h| !h.trim().is_empty()) else {
            continue;
        };
        let permalink = absolute_permalink(href);

        let title = first_text(container, &heading_sel).unwrap_or_else(|| element_text(link));
        if title.is_empty() {
            continue;
        }

        let subreddit = first_text(container, &subreddit_sel)
            .map(|s| strip_subreddit_prefix(&s))
            .or_else(|| subreddit_from_permalink(&permalink))
            .unwrap_or_default();

        let created_at = container.select(&time_sel).next().and_then(|el| {
            let attrs = el.value();
            attrs
                .attr("datetime")
                .or_else(|| attrs.attr("ts"))
                .and_then(parse_timestamp)
        });

        mentions.push(Mention {
            id: post_id_from_permalink(&permalink).unwrap_or_else(|| permalink.clone()),
            kind: MentionKind::Post,
            subreddit,
            author: first_text(container, &author_sel)
                .map(|a| a.trim_start_matches("u/").to_string()),
            created_at,
            title,
            snippet: first_text(container, &body_sel)
                .map(|t| truncate_snippet(&t))
                .unwrap_or_default(),
            score: first_text(container, &score_sel).and_then(|s| parse_abbreviated(&s)),
            num_comments: first_text(container, &comments_sel).and_then(|s| parse_count(&s)),
            upvote_ratio: None,
            url: None,
            domain: None,
            is_self: None,
            permalink,
            strategy: StrategyKind::Browser,
        });
    }

    Ok(mentions)
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn strip_subreddit_prefix(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix("r/").unwrap_or(name).to_string()
}

/// `/r/<sub>/comments/<id>/...` → `<sub>`.
fn subreddit_from_permalink(permalink: &str) -> Option<String> {
    let mut segments = permalink.split('/').skip_while(|s| *s != "r");
    segments.next()?;
    segments.next().filter(|s| !s.is_empty()).map(str::to_string)
}

/// `/r/<sub>/comments/<id>/...` → `<id>`.
fn post_id_from_permalink(permalink: &str) -> Option<String> {
    let mut segments = permalink.split('/').skip_while(|s| *s != "comments");
    segments.next()?;
    segments.next().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Accepts RFC 3339 and the `+0000` offset form Reddit uses in attributes.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse counters like `42`, `1,234`, `1.2k`, `3.4M`, `-5`.
///
/// Text before the first number is ignored; returns `None` when there is no
/// number (e.g. `Vote` or `•`).
pub(crate) fn parse_abbreviated(text: &str) -> Option<i64> {
    let cleaned = text.trim().to_lowercase().replace(',', "");
    let start = cleaned.find(|c: char| c.is_ascii_digit() || c == '-')?;
    let rest = &cleaned[start..];
    let end = rest
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (c == '-' && i == 0)))
        .map_or(rest.len(), |(i, _)| i);
    let number: f64 = rest[..end].parse().ok()?;
    let multiplier = match rest[end..].chars().next() {
        Some('k') => 1_000.0,
        Some('m') => 1_000_000.0,
        _ => 1.0,
    };
    Some((number * multiplier).round() as i64)
}

/// Like [`parse_abbreviated`] but for counts that cannot be negative.
pub(crate) fn parse_count(text: &str) -> Option<u64> {
    parse_abbreviated(text).map(|n| n.max(0) as u64)
}
