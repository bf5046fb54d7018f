//! Utility functions for text cleanup, date display and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Markup stripping and character-safe truncation for feed excerpts
//! - Absolute and relative date formatting for the rendered page
//! - String truncation for logging and JSON truncation detection
//! - File system validation for the output directory

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::PulseError;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Remove markup tags with a plain `<...>` pattern.
///
/// This is not an HTML parser: entities stay encoded and a stray `<` without
/// a closing `>` is kept as text.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Keep at most `max` characters of `s`, never splitting a character.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Format a timestamp as `Jan 02, 2024 at 03:04 PM` (UTC).
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %d, %Y at %I:%M %p").to_string()
}

/// Human readable age of `dt` relative to `now`.
///
/// Tiers are `just now` (under a minute, including timestamps in the
/// future), `N min ago`, `Nh ago` and `Nd ago`; counts are truncated.
pub fn time_ago(dt: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = (*now - *dt).num_seconds();
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        format!("{} min ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let kept = truncate_chars(s, max);
    if kept.len() == s.len() {
        kept
    } else {
        format!("{}…(+{} bytes)", kept, s.len() - kept.len())
    }
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// A model response cut off by the token limit fails with an EOF error.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), PulseError> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("no markup"), "no markup");
        assert_eq!(strip_tags("a < b"), "a < b");
        assert_eq!(strip_tags(r#"<a href="x">link</a> &amp; more"#), "link &amp; more");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars(&"a".repeat(600), 500).len(), 500);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(&at(2024, 1, 2, 15, 4, 5)), "Jan 02, 2024 at 03:04 PM");
        assert_eq!(format_date(&at(2024, 12, 25, 0, 30, 0)), "Dec 25, 2024 at 12:30 AM");
    }

    #[test]
    fn test_time_ago_tiers() {
        let now = at(2024, 1, 10, 12, 0, 0);
        assert_eq!(time_ago(&(now - Duration::seconds(59)), &now), "just now");
        assert_eq!(time_ago(&(now - Duration::seconds(60)), &now), "1 min ago");
        assert_eq!(time_ago(&(now - Duration::seconds(3_599)), &now), "59 min ago");
        assert_eq!(time_ago(&(now - Duration::hours(1)), &now), "1h ago");
        assert_eq!(time_ago(&(now - Duration::minutes(23 * 60 + 59)), &now), "23h ago");
        assert_eq!(time_ago(&(now - Duration::hours(24)), &now), "1d ago");
        assert_eq!(time_ago(&(now - Duration::hours(71)), &now), "2d ago");
    }

    #[test]
    fn test_time_ago_future_is_just_now() {
        let now = at(2024, 1, 10, 12, 0, 0);
        assert_eq!(time_ago(&(now + Duration::hours(2)), &now), "just now");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_looks_truncated() {
        let json_eof = r#"{"field": "value"#;
        let err = serde_json::from_str::<serde_json::Value>(json_eof).unwrap_err();
        assert!(looks_truncated(&err));

        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(!looks_truncated(&err));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs").join("site");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(stdfs::read_dir(&nested).unwrap().count(), 0);
    }
}
