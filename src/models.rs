//! Data models passed between the pipeline stages.
//!
//! - [`Article`]: a news item as collected from a feed or the search API
//! - [`SummarizedArticle`]: the LLM-rewritten view of one [`Article`]
//! - [`TopicGroup`]: one topic's ordered list of items
//!
//! Stages hand each other `Vec<TopicGroup<T>>` rather than a map so that the
//! topic order of the configuration file survives all the way to the page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the title+link digest.
const FINGERPRINT_LEN: usize = 12;

/// A collected news item.
///
/// Articles are immutable once built; the `id` is derived from the title and
/// link by [`fingerprint`] and is what the collector deduplicates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Short content fingerprint of `title + link`.
    pub id: String,
    pub title: String,
    pub link: String,
    /// Feed or provider display name.
    pub source: String,
    /// Publish time, or the fetch time when the entry carried no usable date.
    pub published: DateTime<Utc>,
    /// Plain-text excerpt, at most 500 characters.
    pub summary: String,
    /// Name of the topic that collected this article.
    pub topic: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        source: impl Into<String>,
        published: DateTime<Utc>,
        summary: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let link = link.into();
        Self {
            id: fingerprint(&title, &link),
            title,
            link,
            source: source.into(),
            published,
            summary: summary.into(),
            topic: topic.into(),
        }
    }
}

/// Derive the deduplication key for a title/link pair.
///
/// SHA-256 over `title` immediately followed by `link`, hex encoded and cut to
/// 12 characters. Distinct pairs collide only if their truncated digests do,
/// and concatenation means `("ab", "c")` and `("a", "bc")` share an id.
pub fn fingerprint(title: &str, link: &str) -> String {
    let digest = Sha256::digest(format!("{title}{link}").as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// An [`Article`] after the summarization stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizedArticle {
    /// The article this rewrite was produced from.
    pub original: Article,
    pub ai_title: String,
    pub ai_summary: String,
    pub key_points: Vec<String>,
}

impl SummarizedArticle {
    /// Wrap an article without any rewrite: original title and summary, no key points.
    ///
    /// This is the degrade path for every summarization failure, and the whole
    /// stage when summarization is skipped.
    pub fn passthrough(article: &Article) -> Self {
        Self {
            original: article.clone(),
            ai_title: article.title.clone(),
            ai_summary: article.summary.clone(),
            key_points: Vec::new(),
        }
    }
}

/// One topic's items, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicGroup<T> {
    pub name: String,
    pub articles: Vec<T>,
}

impl<T> TopicGroup<T> {
    pub fn new(name: impl Into<String>, articles: Vec<T>) -> Self {
        Self {
            name: name.into(),
            articles,
        }
    }
}

/// Total number of items across all topics.
pub fn total_articles<T>(topics: &[TopicGroup<T>]) -> usize {
    topics.iter().map(|t| t.articles.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, link: &str) -> Article {
        Article::new(title, link, "ESPN", Utc::now(), "Summary", "NBA")
    }

    #[test]
    fn test_fingerprint_is_stable_for_same_title_and_link() {
        let a = sample("Lakers win", "http://x/1");
        let b = Article::new(
            "Lakers win",
            "http://x/1",
            "Other source",
            Utc::now() - chrono::Duration::days(3),
            "Different summary",
            "Other topic",
        );
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, fingerprint("Lakers win", "http://x/1"));
    }

    #[test]
    fn test_fingerprint_differs_when_either_field_differs() {
        let base = fingerprint("Lakers win", "http://x/1");
        assert_ne!(base, fingerprint("Lakers lose", "http://x/1"));
        assert_ne!(base, fingerprint("Lakers win", "http://x/2"));
    }

    #[test]
    fn test_fingerprint_shape() {
        let id = fingerprint("Title", "https://example.com");
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_passthrough_keeps_original_content() {
        let article = sample("Lakers win", "http://x/1");
        let summarized = SummarizedArticle::passthrough(&article);
        assert_eq!(summarized.ai_title, article.title);
        assert_eq!(summarized.ai_summary, article.summary);
        assert!(summarized.key_points.is_empty());
        assert_eq!(summarized.original, article);
    }

    #[test]
    fn test_total_articles() {
        let topics = vec![
            TopicGroup::new("NBA", vec![sample("a", "1"), sample("b", "2")]),
            TopicGroup::new("Lakers", vec![sample("c", "3")]),
            TopicGroup::new("Empty", Vec::<Article>::new()),
        ];
        assert_eq!(total_articles(&topics), 3);
    }
}
