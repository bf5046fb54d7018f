//! Collector stage: fetch, deduplicate, filter and rank articles per topic.
//!
//! For each configured topic, in file order:
//!
//! 1. Fetch every feed in listed order; failures are logged and contribute nothing
//! 2. If fewer than [`FALLBACK_THRESHOLD`] articles were found and the topic has
//!    keywords, fall back to the NewsAPI keyword search
//! 3. Drop articles older than `keep_days`, sort newest first, cap the list
//!
//! Every article passes through the collector's dedup set, which lives for
//! one [`Collector`] only.

pub mod dates;
pub mod feed;
pub mod newsapi;

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Settings, TopicConfig, TopicsConfig};
use crate::error::PulseError;
use crate::models::{Article, TopicGroup};

/// A topic with fewer feed articles than this triggers the search fallback.
pub const FALLBACK_THRESHOLD: usize = 5;

const HTTP_TIMEOUT: StdDuration = StdDuration::from_secs(30);
const USER_AGENT: &str = concat!("info_pulse/", env!("CARGO_PKG_VERSION"));

pub struct Collector {
    config: TopicsConfig,
    news_api_key: Option<String>,
    news_api_url: String,
    http: reqwest::Client,
    seen_ids: HashSet<String>,
}

impl fmt::Debug for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("topics", &self.config.topics.len())
            .field("settings", &self.config.settings)
            .field("news_api_url", &self.news_api_url)
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "<redacted>"))
            .field("seen_ids", &self.seen_ids.len())
            .finish()
    }
}

impl Collector {
    /// Build a collector with its own HTTP client and an empty dedup set.
    ///
    /// # Arguments
    ///
    /// * `config` - Topics to collect, in the order they are processed
    /// * `news_api_key` - Key for the keyword-search fallback. Empty or absent
    ///   disables the fallback
    ///
    /// # Returns
    ///
    /// The collector, or [`PulseError::Http`] if the HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = config::load_topics(Path::new("topics.yaml")).await;
    /// let mut collector = Collector::new(config, std::env::var("NEWS_API_KEY").ok())?;
    /// let topics = collector.fetch_all().await;
    /// ```
    pub fn new(config: TopicsConfig, news_api_key: Option<String>) -> Result<Self, PulseError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            config,
            news_api_key: news_api_key.filter(|k| !k.trim().is_empty()),
            news_api_url: newsapi::NEWS_API_URL.to_string(),
            http,
            seen_ids: HashSet::new(),
        })
    }

    /// Point the search fallback at a different endpoint.
    pub fn with_news_api_url(mut self, url: impl Into<String>) -> Self {
        self.news_api_url = url.into();
        self
    }

    /// Collect every configured topic.
    ///
    /// Topics come back in configuration order, each already filtered by age,
    /// sorted newest first and capped. An article seen under an earlier topic
    /// is not repeated under a later one.
    #[instrument(level = "info", skip_all)]
    pub async fn fetch_all(&mut self) -> Vec<TopicGroup<Article>> {
        let now = Utc::now();
        let topics = self.config.topics.clone();
        let mut results = Vec::with_capacity(topics.len());

        for topic in &topics {
            let articles = self.fetch_topic(topic, now).await;
            let articles = finalize(articles, &self.config.settings, now);
            info!(topic = %topic.name, count = articles.len(), "Topic collected");
            results.push(TopicGroup::new(topic.name.clone(), articles));
        }

        results
    }

    async fn fetch_topic(&mut self, topic: &TopicConfig, now: DateTime<Utc>) -> Vec<Article> {
        info!(topic = %topic.name, feeds = topic.rss_feeds.len(), "Processing topic");
        let mut articles = Vec::new();

        for feed in &topic.rss_feeds {
            if feed.url.is_empty() {
                debug!(feed = %feed.name, "Feed has no URL; skipping");
                continue;
            }
            articles.extend(self.fetch_rss_feed(&feed.url, &feed.name, &topic.name, now).await);
        }

        if articles.len() < FALLBACK_THRESHOLD && !topic.keywords.is_empty() {
            articles.extend(self.fetch_news_api(&topic.keywords, &topic.name, now).await);
        }

        articles
    }

    /// Fetch one feed and keep its not-yet-seen articles.
    ///
    /// Never fails: a fetch or parse error is logged and yields no articles.
    #[instrument(level = "info", skip(self, now), fields(feed = %feed_name))]
    pub async fn fetch_rss_feed(
        &mut self,
        feed_url: &str,
        feed_name: &str,
        topic: &str,
        now: DateTime<Utc>,
    ) -> Vec<Article> {
        info!(url = %feed_url, "Fetching RSS feed");
        let parsed = self
            .download(feed_url)
            .await
            .and_then(|body| feed::parse_articles(&body, feed_name, topic, now));
        match parsed {
            Ok(candidates) => {
                let kept = self.keep_unseen(candidates);
                info!(count = kept.len(), "Fetched feed articles");
                kept
            }
            Err(e) => {
                error!(url = %feed_url, error = %e, "Error fetching RSS feed");
                Vec::new()
            }
        }
    }

    /// Search fallback. Without an API key this returns nothing and logs at debug.
    pub async fn fetch_news_api(
        &mut self,
        keywords: &[String],
        topic: &str,
        now: DateTime<Utc>,
    ) -> Vec<Article> {
        let Some(api_key) = self.news_api_key.clone() else {
            debug!(%topic, "NewsAPI key not configured; skipping fallback");
            return Vec::new();
        };

        info!(%topic, "Fetching from NewsAPI");
        match newsapi::search(&self.http, &self.news_api_url, &api_key, keywords, topic, now).await {
            Ok(candidates) => {
                let kept = self.keep_unseen(candidates);
                info!(%topic, count = kept.len(), "Fetched NewsAPI articles");
                kept
            }
            Err(e) => {
                warn!(%topic, error = %e, "Error fetching from NewsAPI");
                Vec::new()
            }
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, PulseError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PulseError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Drop articles whose id was already seen this run, recording the rest.
    fn keep_unseen(&mut self, candidates: Vec<Article>) -> Vec<Article> {
        candidates
            .into_iter()
            .filter(|article| self.seen_ids.insert(article.id.clone()))
            .collect()
    }
}

/// Apply the recency window, newest-first order and the per-topic cap.
///
/// The window is inclusive: an article published exactly `keep_days` before
/// `now` is kept. A window too wide for the calendar keeps everything.
///
/// # Arguments
///
/// * `articles` - One topic's collected articles, in any order
/// * `settings` - Supplies `keep_days` and `max_articles_per_topic`
/// * `now` - The reference time for the recency window
///
/// # Returns
///
/// At most `max_articles_per_topic` articles, newest first.
///
/// # Examples
///
/// ```ignore
/// let kept = finalize(articles, &Settings::default(), Utc::now());
/// assert!(kept.windows(2).all(|w| w[0].published >= w[1].published));
/// ```
pub fn finalize(mut articles: Vec<Article>, settings: &Settings, now: DateTime<Utc>) -> Vec<Article> {
    let cutoff = Duration::try_days(settings.keep_days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    articles.retain(|a| a.published >= cutoff);
    articles.sort_by(|a, b| b.published.cmp(&a.published));
    articles.truncate(settings.max_articles_per_topic);
    articles
}
