//! Error type shared by every stage of the pipeline.
//!
//! Most variants never reach `main`: feed, search and summarization failures
//! are logged where they happen and turned into fewer or degraded results.
//! Only rendering errors and the startup credential check are fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PulseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("feed parse error: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("{0} environment variable is required")]
    MissingCredential(&'static str),
}
