//! Command-line interface definitions for Info Pulse.
//!
//! Paths and the model come from flags; credentials can be given as flags
//! but are normally read from the environment (or a `.env` file).

use clap::Parser;
use std::path::PathBuf;

use crate::api::OPENROUTER_BASE_URL;
use crate::collector::newsapi::NEWS_API_URL;

/// Command-line arguments for the Info Pulse pipeline.
///
/// # Examples
///
/// ```sh
/// # Full run, credentials from the environment
/// info_pulse --topics-file topics.yaml --output-dir docs
///
/// # Feeds only, no model calls
/// info_pulse --skip-summarize
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the topics configuration file
    #[arg(long, default_value = "topics.yaml")]
    pub topics_file: PathBuf,

    /// Output directory for the generated site
    #[arg(long, default_value = "docs")]
    pub output_dir: PathBuf,

    /// Templates directory
    #[arg(long, default_value = "templates")]
    pub templates_dir: PathBuf,

    /// Skip AI summarization and publish the original titles and summaries
    #[arg(long)]
    pub skip_summarize: bool,

    /// OpenRouter model to use
    #[arg(long, default_value = "openai/gpt-oss-120b:free")]
    pub model: String,

    /// Title shown on the generated page
    #[arg(long, default_value = "Info Pulse - Lakers News")]
    pub site_title: String,

    /// OpenRouter API key (required unless --skip-summarize)
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = OPENROUTER_BASE_URL)]
    pub openrouter_base_url: String,

    /// NewsAPI key for the keyword-search fallback
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// NewsAPI search endpoint
    #[arg(long, env = "NEWS_API_URL", default_value = NEWS_API_URL)]
    pub news_api_url: String,
}

impl Cli {
    /// The summarization key, treating an empty value as absent.
    pub fn summarization_key(&self) -> Option<&str> {
        self.openrouter_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["info_pulse"]);

        assert_eq!(cli.topics_file, PathBuf::from("topics.yaml"));
        assert_eq!(cli.output_dir, PathBuf::from("docs"));
        assert_eq!(cli.templates_dir, PathBuf::from("templates"));
        assert!(!cli.skip_summarize);
        assert_eq!(cli.model, "openai/gpt-oss-120b:free");
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "info_pulse",
            "--topics-file",
            "conf/topics.yaml",
            "--output-dir",
            "/tmp/site",
            "--templates-dir",
            "tpl",
            "--skip-summarize",
            "--model",
            "meta-llama/llama-3.1-8b-instruct",
            "--openrouter-api-key",
            "abc",
        ]);

        assert_eq!(cli.topics_file, PathBuf::from("conf/topics.yaml"));
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/site"));
        assert_eq!(cli.templates_dir, PathBuf::from("tpl"));
        assert!(cli.skip_summarize);
        assert_eq!(cli.model, "meta-llama/llama-3.1-8b-instruct");
        assert_eq!(cli.summarization_key(), Some("abc"));
    }

    #[test]
    fn test_blank_key_is_absent() {
        let cli = Cli::parse_from(["info_pulse", "--openrouter-api-key", "  "]);
        assert_eq!(cli.summarization_key(), None);
    }
}
