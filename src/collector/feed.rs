//! RSS/Atom entry extraction.
//!
//! Feed bodies are parsed with `feed-rs`; this module turns the first
//! [`MAX_ENTRIES_PER_FEED`] entries into [`Article`]s. Deduplication is left
//! to the [`Collector`](super::Collector), which owns the per-run id set.

use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;

use super::dates::{parse_timestamp, resolve_published};
use crate::error::PulseError;
use crate::models::Article;
use crate::utils::{strip_tags, truncate_chars};

/// Entries read from a single feed.
pub const MAX_ENTRIES_PER_FEED: usize = 20;

/// Character cap for an article excerpt.
pub const MAX_SUMMARY_CHARS: usize = 500;

/// Parse a feed body and build one [`Article`] per usable entry.
///
/// Entries without a title or link are skipped. The entry cap applies before
/// skipping, so a feed yields at most 20 articles even if some are unusable.
///
/// # Arguments
///
/// * `body` - Raw RSS or Atom bytes
/// * `feed_name` - Recorded as each article's `source`
/// * `topic` - Recorded as each article's `topic`
/// * `fetched_at` - Publication time for entries that carry no usable date
///
/// # Returns
///
/// The feed's articles in document order, or [`PulseError::Feed`] when the
/// body is not a feed at all.
pub fn parse_articles(
    body: &[u8],
    feed_name: &str,
    topic: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<Article>, PulseError> {
    let feed = parser::Builder::new()
        .timestamp_parser(parse_timestamp)
        .build()
        .parse(body)?;

    let articles = feed
        .entries
        .iter()
        .take(MAX_ENTRIES_PER_FEED)
        .filter_map(|entry| {
            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();
            let link = entry_link(entry);
            if title.is_empty() || link.is_empty() {
                return None;
            }
            Some(Article::new(
                title,
                link,
                feed_name,
                resolve_published(entry, fetched_at),
                extract_summary(entry),
                topic,
            ))
        })
        .collect();

    Ok(articles)
}

fn entry_link(entry: &Entry) -> String {
    entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default()
}

/// First non-empty of summary, media description and content body,
/// tag-stripped and cut to [`MAX_SUMMARY_CHARS`].
pub fn extract_summary(entry: &Entry) -> String {
    let summary = entry.summary.as_ref().map(|t| t.content.as_str());
    let description = entry
        .media
        .iter()
        .find_map(|m| m.description.as_ref().map(|t| t.content.as_str()));
    let content = entry.content.as_ref().and_then(|c| c.body.as_deref());

    [summary, description, content]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
        .map(|raw| truncate_chars(&strip_tags(raw), MAX_SUMMARY_CHARS))
        .unwrap_or_default()
}
