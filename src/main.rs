//! # Info Pulse
//!
//! A topic news pipeline that collects articles from RSS feeds, rewrites them
//! through an LLM, and publishes a static HTML page plus a JSON snapshot.
//!
//! ## Usage
//!
//! ```sh
//! export OPENROUTER_API_KEY=...
//! info_pulse --topics-file topics.yaml --output-dir docs --templates-dir templates
//! ```
//!
//! ## Architecture
//!
//! Three stages run strictly in sequence, each consuming the previous stage's
//! complete output:
//! 1. **Collecting**: fetch each topic's feeds (and the NewsAPI fallback),
//!    deduplicate, filter by age, sort and cap
//! 2. **Summarizing**: rewrite articles in batches of 5, falling back to the
//!    original text whenever the model call or its JSON fails
//! 3. **Rendering**: write `index.html`, `news.json` and `static/`

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod collector;
mod config;
mod error;
mod models;
mod outputs;
mod summarizer;
mod utils;

use api::OpenRouterClient;
use cli::Cli;
use collector::Collector;
use error::PulseError;
use models::total_articles;
use outputs::SiteGenerator;
use summarizer::{Summarizer, passthrough_all};

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; real environment variables still apply.
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("info_pulse starting up");
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env");
    }

    let args = Cli::parse();
    debug!(?args.topics_file, ?args.output_dir, ?args.templates_dir, "Parsed CLI arguments");

    // Checked before any network activity.
    let openrouter_key = args.summarization_key().map(str::to_string);
    if openrouter_key.is_none() && !args.skip_summarize {
        let e = PulseError::MissingCredential("OPENROUTER_API_KEY");
        error!(error = %e, "Set it in .env or export it: export OPENROUTER_API_KEY=your_key");
        return Err(e.into());
    }

    // ---- Step 1: collect ----
    info!("Step 1: Fetching news from RSS feeds and APIs");
    let topics_config = config::load_topics(&args.topics_file).await;
    let mut collector =
        Collector::new(topics_config, args.news_api_key.clone())?.with_news_api_url(args.news_api_url.clone());
    let articles_by_topic = collector.fetch_all().await;

    let total = total_articles(&articles_by_topic);
    info!(total, topics = articles_by_topic.len(), "Fetched articles");
    if total == 0 {
        warn!("No articles fetched. Check your RSS feeds and API keys.");
    }

    // ---- Step 2: summarize ----
    let summarized_by_topic = match openrouter_key {
        Some(key) if !args.skip_summarize => {
            info!(model = %args.model, "Step 2: Summarizing articles with AI");
            let client = OpenRouterClient::new(key, args.model.clone(), args.openrouter_base_url.clone())?;
            Summarizer::new(client).summarize_all(&articles_by_topic).await
        }
        _ => {
            info!("Step 2: Skipping AI summarization (--skip-summarize)");
            passthrough_all(&articles_by_topic)
        }
    };

    // ---- Step 3: render ----
    info!("Step 3: Generating static site");
    let generator = SiteGenerator::new(&args.output_dir, &args.templates_dir);
    generator.generate(&summarized_by_topic, &args.site_title).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        site = %args.output_dir.join(outputs::INDEX_FILE).display(),
        articles = total_articles(&summarized_by_topic),
        "Pipeline complete"
    );

    Ok(())
}
