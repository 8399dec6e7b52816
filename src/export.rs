//! CSV export of collected mentions.

use crate::error::{Result, TrackerError};
use chrono::NaiveDate;
use mention_search::Mention;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Column order of exported files.
pub const CSV_HEADER: [&str; 15] = [
    "id",
    "kind",
    "subreddit",
    "author",
    "created_utc",
    "title",
    "snippet",
    "score",
    "num_comments",
    "upvote_ratio",
    "is_self",
    "domain",
    "url",
    "permalink",
    "strategy",
];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if first {
            first = false;
        } else {
            w.write_all(b",")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    writeln!(w)
}

fn mention_row(mention: &Mention) -> [String; 15] {
    [
        mention.id.clone(),
        mention.kind.as_str().to_string(),
        mention.subreddit.clone(),
        mention.author.clone().unwrap_or_default(),
        mention
            .created_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default(),
        mention.title.clone(),
        mention.snippet.clone(),
        mention.score.map(|s| s.to_string()).unwrap_or_default(),
        mention
            .num_comments
            .map(|n| n.to_string())
            .unwrap_or_default(),
        mention
            .upvote_ratio
            .map(|r| r.to_string())
            .unwrap_or_default(),
        mention.is_self.map(|b| b.to_string()).unwrap_or_default(),
        mention.domain.clone().unwrap_or_default(),
        mention.url.clone().unwrap_or_default(),
        mention.permalink.clone(),
        mention.strategy.name().to_string(),
    ]
}

/// Write a header row and one row per mention.
///
/// Missing optional fields are written as empty cells.
///
/// # Errors
///
/// Returns [`TrackerError::Io`] if the writer fails.
pub fn write_csv<W: Write>(mut writer: W, mentions: &[Mention]) -> Result<()> {
    write_row(&mut writer, &CSV_HEADER)?;
    for mention in mentions {
        write_row(&mut writer, &mention_row(mention))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `mentions` to a CSV file at `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`TrackerError::Export`] if the file cannot be created or written.
pub fn write_csv_file(path: &Path, mentions: &[Mention]) -> Result<()> {
    let export_err = |e: io::Error| TrackerError::Export(format!("{}: {e}", path.display()));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(export_err)?;
    }
    let file = std::fs::File::create(path).map_err(export_err)?;
    write_csv(BufWriter::new(file), mentions).map_err(|e| match e {
        TrackerError::Io(io) => export_err(io),
        other => other,
    })?;
    tracing::info!(path = %path.display(), rows = mentions.len(), "CSV written");
    Ok(())
}

/// Default export file name: `reddit_mentions_<term>_<YYYYMMDD>.csv`.
///
/// The term is reduced to ASCII letters, digits, `-` and `_`; whitespace
/// becomes `_` and anything else is dropped.
pub fn default_file_name(term: &str, date: NaiveDate) -> String {
    let mut sanitized = String::with_capacity(term.len());
    for c in term.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            sanitized.push(c);
        } else if c.is_whitespace() && !sanitized.ends_with('_') {
            sanitized.push('_');
        }
    }
    if sanitized.is_empty() {
        sanitized.push_str("search");
    }
    format!("reddit_mentions_{sanitized}_{}.csv", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::{TimeZone, Utc};
    use mention_search::{MentionKind, StrategyKind};

    fn sample() -> Mention {
        Mention {
            id: "abc".into(),
            kind: MentionKind::Post,
            subreddit: "technology".into(),
            author: Some("poster".into()),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            permalink: "https://www.reddit.com/r/technology/comments/abc/x/".into(),
            title: "Acme, \"the\" widget".into(),
            snippet: "line one\nline two".into(),
            score: Some(42),
            num_comments: None,
            upvote_ratio: Some(0.87),
            url: Some("https://acme.example/a,b?x=\"y\"".into()),
            domain: Some("acme.example".into()),
            is_self: Some(false),
            strategy: StrategyKind::JsonApi,
        }
    }

    fn render(mentions: &[Mention]) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, mentions).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_only_for_empty_input() {
        assert_eq!(
            render(&[]),
            "id,kind,subreddit,author,created_utc,title,snippet,score,num_comments,\
             upvote_ratio,is_self,domain,url,permalink,strategy\n"
        );
    }

    #[test]
    fn fields_quoted_when_needed() {
        let out = render(&[sample()]);
        let row = out.split_once('\n').unwrap().1;
        assert_eq!(
            row,
            "abc,post,technology,poster,2024-05-01T12:00:00+00:00,\
             \"Acme, \"\"the\"\" widget\",\"line one\nline two\",42,,0.87,false,acme.example,\
             \"https://acme.example/a,b?x=\"\"y\"\"\",\
             https://www.reddit.com/r/technology/comments/abc/x/,json-api\n"
        );
    }

    #[test]
    fn missing_fields_are_empty_cells() {
        let mut mention = sample();
        mention.author = None;
        mention.created_at = None;
        mention.score = None;
        mention.title = "plain".into();
        mention.snippet = String::new();
        mention.upvote_ratio = None;
        mention.is_self = None;
        mention.domain = None;
        mention.url = None;
        let out = render(&[mention]);
        let row = out.lines().nth(1).unwrap();
        assert!(row.starts_with("abc,post,technology,,,plain,,,,,,,,https://"));
    }

    #[test]
    fn file_name_sanitized() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            default_file_name("Acme Corp", date),
            "reddit_mentions_Acme_Corp_20240501.csv"
        );
        assert_eq!(
            default_file_name("  a/b: c  ", date),
            "reddit_mentions_ab_c_20240501.csv"
        );
        assert_eq!(default_file_name("???", date), "reddit_mentions_search_20240501.csv");
    }
}
