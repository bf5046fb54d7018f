//! Topic configuration loaded from YAML.
//!
//! ```yaml
//! topics:
//!   - name: Lakers
//!     keywords: ["Lakers", "LeBron James"]
//!     rss_feeds:
//!       - url: https://www.espn.com/espn/rss/nba/news
//!         name: ESPN NBA
//! settings:
//!   max_articles_per_topic: 10
//!   keep_days: 2
//! ```

use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::PulseError;

const DEFAULT_MAX_ARTICLES_PER_TOPIC: usize = 10;
const DEFAULT_KEEP_DAYS: i64 = 2;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicsConfig {
    #[serde(default)]
    pub topics: Vec<TopicConfig>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub rss_feeds: Vec<FeedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "unknown")]
    pub name: String,
}

/// Global collection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Length cap applied to each topic's final list.
    #[serde(default = "default_max_articles")]
    pub max_articles_per_topic: usize,
    /// Recency window; older articles are dropped.
    #[serde(default = "default_keep_days")]
    pub keep_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_articles_per_topic: DEFAULT_MAX_ARTICLES_PER_TOPIC,
            keep_days: DEFAULT_KEEP_DAYS,
        }
    }
}

fn unknown() -> String {
    "Unknown".to_string()
}

fn default_max_articles() -> usize {
    DEFAULT_MAX_ARTICLES_PER_TOPIC
}

fn default_keep_days() -> i64 {
    DEFAULT_KEEP_DAYS
}

impl TopicsConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, PulseError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Load the topics file.
///
/// A missing, unreadable or malformed file is logged and yields an empty
/// topic set with default settings; the run then reports zero articles.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_topics(path: &Path) -> TopicsConfig {
    let yaml = match fs::read_to_string(path).await {
        Ok(yaml) => yaml,
        Err(e) => {
            error!(error = %e, "Topics file not readable");
            return TopicsConfig::default();
        }
    };

    match TopicsConfig::from_yaml(&yaml) {
        Ok(config) => {
            info!(topics = config.topics.len(), "Loaded topics configuration");
            config
        }
        Err(e) => {
            error!(error = %e, "Topics file is not valid YAML");
            TopicsConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
topics:
  - name: Lakers
    keywords: ["Lakers", "LeBron"]
    rss_feeds:
      - url: https://example.com/feed.xml
        name: Example
settings:
  max_articles_per_topic: 5
  keep_days: 3
"#;
        let config = TopicsConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.topics.len(), 1);
        assert_eq!(config.topics[0].name, "Lakers");
        assert_eq!(config.topics[0].keywords, vec!["Lakers", "LeBron"]);
        assert_eq!(config.topics[0].rss_feeds[0].name, "Example");
        assert_eq!(config.settings.max_articles_per_topic, 5);
        assert_eq!(config.settings.keep_days, 3);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let yaml = r#"
topics:
  - rss_feeds:
      - url: https://example.com/feed.xml
"#;
        let config = TopicsConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.topics[0].name, "Unknown");
        assert!(config.topics[0].keywords.is_empty());
        assert_eq!(config.topics[0].rss_feeds[0].name, "Unknown");
        assert_eq!(config.settings.max_articles_per_topic, 10);
        assert_eq!(config.settings.keep_days, 2);
    }

    #[test]
    fn test_partial_settings() {
        let yaml = "settings:\n  keep_days: 7\n";
        let config = TopicsConfig::from_yaml(yaml).unwrap();
        assert!(config.topics.is_empty());
        assert_eq!(config.settings.keep_days, 7);
        assert_eq!(config.settings.max_articles_per_topic, 10);
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_topics(&dir.path().join("nope.yaml")).await;
        assert!(config.topics.is_empty());
        assert_eq!(config.settings.max_articles_per_topic, 10);
    }

    #[tokio::test]
    async fn test_malformed_file_yields_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topics.yaml");
        std::fs::write(&path, "topics: [unclosed").unwrap();
        let config = load_topics(&path).await;
        assert!(config.topics.is_empty());
    }
}
