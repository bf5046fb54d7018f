//! Summarization stage: batch articles through an LLM for rewritten titles,
//! summaries and key points.
//!
//! Each topic is split into batches of [`DEFAULT_BATCH_SIZE`]. One prompt is
//! sent per batch and the reply is expected to be a JSON object with an
//! `articles` array whose elements carry a 1-based `index` into the batch.
//!
//! Output always has one [`SummarizedArticle`] per input article, in input
//! order. When a call fails or its reply is not usable JSON the whole batch
//! goes through [`degrade`]; articles the reply leaves out are degraded
//! individually.

use itertools::Itertools;
use serde::Deserialize;
use std::fmt::{self, Write};
use tracing::{debug, error, info, instrument, warn};

use crate::api::AskAsync;
use crate::models::{Article, SummarizedArticle, TopicGroup};
use crate::utils::{looks_truncated, truncate_chars, truncate_for_log};

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Characters of each article's excerpt embedded in the prompt.
const PROMPT_EXCERPT_CHARS: usize = 300;

pub struct Summarizer<A> {
    client: A,
    batch_size: usize,
}

impl<A: fmt::Debug> fmt::Debug for Summarizer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Summarizer")
            .field("client", &self.client)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl<A: AskAsync> Summarizer<A> {
    pub fn new(client: A) -> Self {
        Self::with_batch_size(client, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(client: A, batch_size: usize) -> Self {
        Self {
            client,
            batch_size: batch_size.max(1),
        }
    }

    /// Summarize every topic, keeping topic and article order.
    #[instrument(level = "info", skip_all)]
    pub async fn summarize_all(
        &self,
        topics: &[TopicGroup<Article>],
    ) -> Vec<TopicGroup<SummarizedArticle>> {
        let mut results = Vec::with_capacity(topics.len());
        for topic in topics {
            info!(topic = %topic.name, count = topic.articles.len(), "Summarizing topic");
            let articles = self.summarize_articles(&topic.articles).await;
            results.push(TopicGroup::new(topic.name.clone(), articles));
        }
        results
    }

    /// Summarize one topic's articles batch by batch.
    ///
    /// Batches are sent one at a time. A failed batch never affects the
    /// batches around it.
    ///
    /// # Arguments
    ///
    /// * `articles` - One topic's articles, already ranked by the collector
    ///
    /// # Returns
    ///
    /// Exactly one [`SummarizedArticle`] per input article, in input order.
    /// Articles the model could not rewrite carry their original title and
    /// summary with no key points.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let client = OpenRouterClient::new(key, "openai/gpt-oss-120b:free", OPENROUTER_BASE_URL)?;
    /// let summarized = Summarizer::new(client).summarize_articles(&articles).await;
    /// assert_eq!(summarized.len(), articles.len());
    /// ```
    pub async fn summarize_articles(&self, articles: &[Article]) -> Vec<SummarizedArticle> {
        let mut summarized = Vec::with_capacity(articles.len());
        for (i, batch) in articles.chunks(self.batch_size).enumerate() {
            info!(batch = i + 1, size = batch.len(), "Summarizing batch");
            summarized.extend(self.summarize_batch(batch).await);
        }
        summarized
    }

    async fn summarize_batch(&self, batch: &[Article]) -> Vec<SummarizedArticle> {
        let prompt = build_prompt(batch);
        let content = match self.client.ask(&prompt).await {
            Ok(content) => content,
            Err(e) => {
                error!(error = %e, size = batch.len(), "Summarization call failed; using original text");
                return degrade(batch);
            }
        };

        match parse_response(&content, batch) {
            Ok(summarized) => summarized,
            Err(e) => {
                error!(
                    error = %e,
                    truncated = looks_truncated(&e),
                    response_preview = %truncate_for_log(&content, 300),
                    "Model returned non-conforming JSON; using original text"
                );
                degrade(batch)
            }
        }
    }
}

/// Pass every article of a batch through unchanged.
pub fn degrade(batch: &[Article]) -> Vec<SummarizedArticle> {
    batch.iter().map(SummarizedArticle::passthrough).collect()
}

/// Convert collected topics without calling a model.
pub fn passthrough_all(topics: &[TopicGroup<Article>]) -> Vec<TopicGroup<SummarizedArticle>> {
    topics
        .iter()
        .map(|t| TopicGroup::new(t.name.clone(), degrade(&t.articles)))
        .collect()
}

/// Build the batch prompt, numbering articles from 1.
pub fn build_prompt(batch: &[Article]) -> String {
    let mut articles_text = String::new();
    for (i, article) in batch.iter().enumerate() {
        let excerpt = if article.summary.is_empty() {
            "No summary available".to_string()
        } else {
            truncate_chars(&article.summary, PROMPT_EXCERPT_CHARS)
        };
        // Writing to a String cannot fail.
        let _ = write!(
            articles_text,
            "\nArticle {}:\nTitle: {}\nSource: {}\nSummary: {}\n---\n",
            i + 1,
            article.title,
            article.source,
            excerpt
        );
    }

    format!(
        r#"You are a sports news analyst specializing in NBA basketball, particularly the Los Angeles Lakers.

Summarize the following news articles. For each article, provide:
1. A concise, engaging title (keep original if already good)
2. A 2-3 sentence summary highlighting the key points
3. 2-3 bullet points with the most important takeaways

Focus on facts, avoid speculation, and maintain a neutral tone.

{articles_text}

Respond in JSON format:
{{
  "articles": [
    {{
      "index": 1,
      "title": "Concise title",
      "summary": "2-3 sentence summary",
      "key_points": ["Point 1", "Point 2", "Point 3"]
    }}
  ]
}}
"#
    )
}

#[derive(Debug, Deserialize)]
struct BatchReply {
    #[serde(default)]
    articles: Vec<ReplyItem>,
}

#[derive(Debug, Deserialize)]
struct ReplyItem {
    #[serde(default = "first_index")]
    index: i64,
    title: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    key_points: Option<Vec<String>>,
}

fn first_index() -> i64 {
    1
}

/// Map a model reply onto the batch.
///
/// Elements whose `index` falls outside the batch are dropped, as are repeats
/// of an index already used. Articles no element refers to fall back to their
/// original text. Only a reply that is not the expected JSON shape is an error.
pub fn parse_response(content: &str, batch: &[Article]) -> Result<Vec<SummarizedArticle>, serde_json::Error> {
    let reply: BatchReply = serde_json::from_str(content)?;
    let mut slots: Vec<Option<SummarizedArticle>> = vec![None; batch.len()];

    for item in reply.articles {
        let Some(slot) = item
            .index
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .filter(|&i| i < batch.len())
        else {
            warn!(index = item.index, size = batch.len(), "Reply index out of range; dropping element");
            continue;
        };
        if slots[slot].is_some() {
            debug!(index = item.index, "Duplicate reply index; keeping the first");
            continue;
        }

        let original = &batch[slot];
        slots[slot] = Some(SummarizedArticle {
            original: original.clone(),
            ai_title: item
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| original.title.clone()),
            ai_summary: item.summary.unwrap_or_default(),
            key_points: item
                .key_points
                .unwrap_or_default()
                .into_iter()
                .filter(|p| !p.trim().is_empty())
                .unique()
                .collect(),
        });
    }

    Ok(slots
        .into_iter()
        .zip(batch)
        .map(|(slot, article)| slot.unwrap_or_else(|| SummarizedArticle::passthrough(article)))
        .collect())
}
