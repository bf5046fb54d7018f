//! Publish-date resolution for feed entries.
//!
//! Resolution is a chain of independent attempts where the first success wins:
//!
//! 1. the entry's structured `published` date, then `updated`
//! 2. for raw date strings, [`parse_timestamp`] runs the parsers in
//!    [`STRING_PARSERS`] in order (feed-rs calls it for every date it meets)
//! 3. the fetch time
//!
//! The chain is total: [`resolve_published`] always returns a timestamp.

use chrono::{DateTime, NaiveDateTime, Utc};
use feed_rs::model::Entry;
use once_cell::sync::Lazy;
use regex::Regex;

type StringParser = fn(&str) -> Option<DateTime<Utc>>;

/// Raw-string parsers, tried in order.
const STRING_PARSERS: &[StringParser] = &[
    rfc2822,
    rfc3339,
    rfc822_with_offset,
    iso_with_offset,
    iso_zulu,
    rfc822_naive,
];

static ZONE_ABBREV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[A-Z]{3,4}$").expect("zone pattern is valid"));

/// Pick the published timestamp for an entry, falling back to `fetched_at`.
pub fn resolve_published(entry: &Entry, fetched_at: DateTime<Utc>) -> DateTime<Utc> {
    [entry.published, entry.updated]
        .into_iter()
        .flatten()
        .next()
        .unwrap_or(fetched_at)
}

/// Parse a raw feed date string.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    STRING_PARSERS.iter().find_map(|parse| parse(text))
}

fn rfc2822(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.with_timezone(&Utc))
}

fn rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

fn rfc822_with_offset(s: &str) -> Option<DateTime<Utc>> {
    with_offset(&strip_zone_abbrev(s), "%a, %d %b %Y %H:%M:%S %z")
}

fn iso_with_offset(s: &str) -> Option<DateTime<Utc>> {
    with_offset(&strip_zone_abbrev(s), "%Y-%m-%dT%H:%M:%S%z")
}

fn iso_zulu(s: &str) -> Option<DateTime<Utc>> {
    naive_as_utc(&strip_zone_abbrev(s), "%Y-%m-%dT%H:%M:%SZ")
}

fn rfc822_naive(s: &str) -> Option<DateTime<Utc>> {
    naive_as_utc(&strip_zone_abbrev(s), "%a, %d %b %Y %H:%M:%S")
}

fn with_offset(s: &str, fmt: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, fmt)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn naive_as_utc(s: &str, fmt: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, fmt).ok().map(|n| n.and_utc())
}

/// Drop a trailing zone abbreviation such as ` EST` or ` CEST`.
fn strip_zone_abbrev(s: &str) -> String {
    ZONE_ABBREV_RE.replace(s, "").into_owned()
}
