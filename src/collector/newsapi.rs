//! NewsAPI keyword search, used when a topic's feeds come up short.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::feed::MAX_SUMMARY_CHARS;
use crate::error::PulseError;
use crate::models::Article;
use crate::utils::truncate_chars;

pub const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

/// Keywords OR-joined into one query.
const MAX_QUERY_KEYWORDS: usize = 3;
const PAGE_SIZE: &str = "10";

/// Placeholder title NewsAPI uses for retracted articles.
const REMOVED_TITLE: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<SearchArticle>,
}

#[derive(Debug, Deserialize)]
struct SearchArticle {
    title: Option<String>,
    url: Option<String>,
    source: Option<SearchSource>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSource {
    name: Option<String>,
}

/// Build the query string: the first three keywords joined with ` OR `.
pub fn build_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .take(MAX_QUERY_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Query the search endpoint and map results to articles (not yet deduplicated).
#[instrument(level = "info", skip(http, api_key, keywords), fields(%topic))]
pub async fn search(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    keywords: &[String],
    topic: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<Article>, PulseError> {
    let query = build_query(keywords);
    debug!(%query, "Searching NewsAPI");

    let response = http
        .get(base_url)
        .query(&[
            ("q", query.as_str()),
            ("apiKey", api_key),
            ("language", "en"),
            ("sortBy", "publishedAt"),
            ("pageSize", PAGE_SIZE),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PulseError::Status {
            url: base_url.to_string(),
            status,
        });
    }

    let body = response.text().await?;
    parse_response(&body, topic, fetched_at)
}

fn parse_response(
    body: &str,
    topic: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<Article>, PulseError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let articles = response
        .articles
        .into_iter()
        .filter_map(|item| {
            let title = item.title.unwrap_or_default().trim().to_string();
            let link = item.url.unwrap_or_default();
            if title.is_empty() || link.is_empty() || title == REMOVED_TITLE {
                return None;
            }
            let published = item
                .published_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or(fetched_at);
            let source = item
                .source
                .and_then(|s| s.name)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "NewsAPI".to_string());
            let summary = truncate_chars(&item.description.unwrap_or_default(), MAX_SUMMARY_CHARS);
            Some(Article::new(title, link, source, published, summary, topic))
        })
        .collect();

    Ok(articles)
}
