//! Permalink canonicalisation for mention deduplication.
//!
//! The same post can arrive as `/r/x/comments/id/slug/`,
//! `https://old.reddit.com/r/X/comments/id/slug?utm_source=share`, or with a
//! fragment. All of these must compare equal.

use url::Url;

/// Host every Reddit mirror is folded onto.
const CANONICAL_HOST: &str = "www.reddit.com";

/// Reddit hosts that serve the same content.
const REDDIT_HOSTS: &[&str] = &[
    "reddit.com",
    "www.reddit.com",
    "old.reddit.com",
    "new.reddit.com",
    "np.reddit.com",
    "m.reddit.com",
    "i.reddit.com",
];

/// Canonicalise a permalink for dedup comparison.
///
/// Applies the following transformations:
///
/// 1. Relative paths (`/r/...`) are resolved against `https://www.reddit.com`.
/// 2. Scheme becomes `https`; Reddit mirror hosts fold to `www.reddit.com`.
/// 3. Default ports, query string and fragment are removed.
/// 4. Trailing slashes are removed (unless the path is exactly `"/"`).
/// 5. On Reddit hosts the path is lowercased; other hosts keep their path.
///
/// If the input cannot be parsed as a URL, it is returned trimmed.
///
/// # Examples
///
/// ```
/// use mention_search::collector::permalink::canonical_permalink;
///
/// let a = canonical_permalink("https://old.reddit.com/r/Rust/comments/abc/hello/?utm_source=share#c");
/// let b = canonical_permalink("/r/rust/comments/abc/hello");
/// assert_eq!(a, b);
/// ```
pub fn canonical_permalink(raw: &str) -> String {
    let trimmed = raw.trim();
    let absolute = if trimmed.starts_with('/') {
        format!("https://{CANONICAL_HOST}{trimmed}")
    } else {
        trimmed.to_string()
    };

    let Ok(mut parsed) = Url::parse(&absolute) else {
        return trimmed.to_string();
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return trimmed.to_string();
    }

    let _ = parsed.set_scheme("https");
    let _ = parsed.set_port(None);
    parsed.set_query(None);
    parsed.set_fragment(None);

    let is_reddit = parsed
        .host_str()
        .is_some_and(|host| REDDIT_HOSTS.contains(&host));
    if is_reddit {
        let _ = parsed.set_host(Some(CANONICAL_HOST));
    }

    let mut path = parsed.path().to_string();
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    if is_reddit {
        path = path.to_lowercase();
    }
    parsed.set_path(&path);

    parsed.to_string()
}
