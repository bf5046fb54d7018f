//! JSON snapshot of the rendered site.
//!
//! # Output Structure
//!
//! ```text
//! {
//!   "generated_at": "2024-01-02T15:04:05.123+00:00",
//!   "total_articles": 12,
//!   "topics": [
//!     {"name": "Lakers", "articles": [{"id": "…", "title": "…", "original_title": "…",
//!       "summary": "…", "key_points": ["…"], "link": "…", "source": "…",
//!       "published": "2024-01-02T15:04:05+00:00", "topic": "Lakers"}]}
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::PulseError;
use crate::models::{SummarizedArticle, TopicGroup};

pub const SNAPSHOT_FILE: &str = "news.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct NewsSnapshot {
    pub generated_at: String,
    pub total_articles: usize,
    pub topics: Vec<TopicSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopicSnapshot {
    pub name: String,
    pub articles: Vec<ArticleSnapshot>,
}

/// One article as published: the rewrite plus the original's metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleSnapshot {
    pub id: String,
    pub title: String,
    pub original_title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub link: String,
    pub source: String,
    /// RFC 3339 / ISO-8601 timestamp.
    pub published: String,
    pub topic: String,
}

impl From<&SummarizedArticle> for ArticleSnapshot {
    fn from(article: &SummarizedArticle) -> Self {
        let original = &article.original;
        Self {
            id: original.id.clone(),
            title: article.ai_title.clone(),
            original_title: original.title.clone(),
            summary: article.ai_summary.clone(),
            key_points: article.key_points.clone(),
            link: original.link.clone(),
            source: original.source.clone(),
            published: original.published.to_rfc3339(),
            topic: original.topic.clone(),
        }
    }
}

impl NewsSnapshot {
    /// Build the snapshot written to `news.json`.
    ///
    /// # Arguments
    ///
    /// * `topics` - Summarized topics in display order
    /// * `generated_at` - Stored as an RFC 3339 string
    /// * `total_articles` - Sum of article counts over all topics
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let snapshot = NewsSnapshot::new(&topics, Utc::now(), total_articles(&topics));
    /// write_snapshot(&snapshot, Path::new("docs")).await?;
    /// ```
    pub fn new(
        topics: &[TopicGroup<SummarizedArticle>],
        generated_at: DateTime<Utc>,
        total_articles: usize,
    ) -> Self {
        Self {
            generated_at: generated_at.to_rfc3339(),
            total_articles,
            topics: topics
                .iter()
                .map(|topic| TopicSnapshot {
                    name: topic.name.clone(),
                    articles: topic.articles.iter().map(ArticleSnapshot::from).collect(),
                })
                .collect(),
        }
    }
}

/// Write `news.json` into `output_dir`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_snapshot(snapshot: &NewsSnapshot, output_dir: &Path) -> Result<(), PulseError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let path = output_dir.join(SNAPSHOT_FILE);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use chrono::TimeZone;

    fn summarized() -> SummarizedArticle {
        let published = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap();
        SummarizedArticle {
            original: Article::new("Lakers win", "http://x/1", "ESPN", published, "Orig", "NBA"),
            ai_title: "Lakers cruise".to_string(),
            ai_summary: "They won big.".to_string(),
            key_points: vec!["Defense".to_string(), "Bench".to_string()],
        }
    }

    #[tokio::test]
    async fn test_snapshot_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let article = summarized();
        let topics = vec![
            TopicGroup::new("NBA", vec![article.clone()]),
            TopicGroup::new("Empty", Vec::new()),
        ];
        let generated_at = Utc::now();

        write_snapshot(&NewsSnapshot::new(&topics, generated_at, 1), dir.path())
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join(SNAPSHOT_FILE)).unwrap();
        let back: NewsSnapshot = serde_json::from_str(&raw).unwrap();

        assert_eq!(back.total_articles, 1);
        assert_eq!(back.topics.len(), 2);
        assert_eq!(back.topics[1].name, "Empty");
        let a = &back.topics[0].articles[0];
        assert_eq!(a.id, article.original.id);
        assert_eq!(a.title, "Lakers cruise");
        assert_eq!(a.original_title, "Lakers win");
        assert_eq!(a.summary, "They won big.");
        assert_eq!(a.key_points, vec!["Defense", "Bench"]);
        assert_eq!(a.link, "http://x/1");
        assert_eq!(a.source, "ESPN");
        assert_eq!(a.topic, "NBA");

        let published = DateTime::parse_from_rfc3339(&a.published).unwrap();
        assert_eq!(published.timestamp(), article.original.published.timestamp());
        let generated = DateTime::parse_from_rfc3339(&back.generated_at).unwrap();
        assert_eq!(generated.timestamp(), generated_at.timestamp());
    }

    #[test]
    fn test_snapshot_field_names() {
        let topics = vec![TopicGroup::new("NBA", vec![summarized()])];
        let value = serde_json::to_value(NewsSnapshot::new(&topics, Utc::now(), 1)).unwrap();
        let article = &value["topics"][0]["articles"][0];
        for key in [
            "id", "title", "original_title", "summary", "key_points", "link", "source", "published", "topic",
        ] {
            assert!(article.get(key).is_some(), "missing {key}");
        }
        assert_eq!(article["published"], "2024-01-02T15:04:05+00:00");
    }
}
