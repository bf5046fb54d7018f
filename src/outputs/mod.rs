//! Renderer stage: write the static site.
//!
//! # Submodules
//!
//! - [`html`]: renders `index.html` from the templates directory
//! - [`json`]: writes the `news.json` snapshot
//! - [`assets`]: mirrors `templates/static` into the output
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── index.html
//! ├── news.json
//! └── static/        # replaced wholesale each run
//! ```

pub mod assets;
pub mod html;
pub mod json;

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::PulseError;
use crate::models::{SummarizedArticle, TopicGroup, total_articles};
use crate::utils::ensure_writable_dir;

pub const INDEX_FILE: &str = "index.html";

#[derive(Debug, Clone)]
pub struct SiteGenerator {
    output_dir: PathBuf,
    templates_dir: PathBuf,
}

impl SiteGenerator {
    /// Create a generator writing into `output_dir` from `templates_dir`.
    ///
    /// Nothing touches the filesystem until [`SiteGenerator::generate`].
    pub fn new(output_dir: impl Into<PathBuf>, templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            templates_dir: templates_dir.into(),
        }
    }

    /// Render the site as of now.
    pub async fn generate(
        &self,
        topics: &[TopicGroup<SummarizedArticle>],
        site_title: &str,
    ) -> Result<(), PulseError> {
        self.generate_at(topics, site_title, Utc::now()).await
    }

    /// Render the site with an explicit generation time.
    ///
    /// A template failure is fatal and stops before `news.json` or the assets
    /// are written.
    #[instrument(level = "info", skip_all, fields(output_dir = %self.output_dir.display()))]
    pub async fn generate_at(
        &self,
        topics: &[TopicGroup<SummarizedArticle>],
        site_title: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<(), PulseError> {
        info!("Generating static site");
        ensure_writable_dir(&self.output_dir).await?;
        let total = total_articles(topics);

        let html = match html::render_index(&self.templates_dir, site_title, topics, generated_at, total) {
            Ok(html) => html,
            Err(e) => {
                error!(error = %e, "Error generating index.html");
                return Err(e);
            }
        };
        let index_path = self.output_dir.join(INDEX_FILE);
        fs::write(&index_path, html).await?;
        info!(path = %index_path.display(), "Generated index");

        let snapshot = json::NewsSnapshot::new(topics, generated_at, total);
        json::write_snapshot(&snapshot, &self.output_dir).await?;

        assets::copy_static(&self.templates_dir, &self.output_dir).await?;

        info!(
            total_articles = total,
            topics = topics.len(),
            "Site generation complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use std::fs as stdfs;
    use std::path::Path;

    fn shipped_templates() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
    }

    fn topics() -> Vec<TopicGroup<SummarizedArticle>> {
        let article = Article::new("Lakers win", "http://x/1", "ESPN", Utc::now(), "Summary", "NBA");
        vec![TopicGroup::new("NBA", vec![SummarizedArticle::passthrough(&article)])]
    }

    #[tokio::test]
    async fn test_generate_writes_site() {
        let out = tempfile::tempdir().unwrap();
        let site_dir = out.path().join("docs");
        let generator = SiteGenerator::new(&site_dir, shipped_templates());

        generator.generate(&topics(), "Info Pulse").await.unwrap();

        let html = stdfs::read_to_string(site_dir.join(INDEX_FILE)).unwrap();
        assert!(html.contains("Lakers win"));
        let snapshot: json::NewsSnapshot =
            serde_json::from_str(&stdfs::read_to_string(site_dir.join(json::SNAPSHOT_FILE)).unwrap()).unwrap();
        assert_eq!(snapshot.total_articles, 1);
        assert!(site_dir.join(assets::STATIC_DIR).join("style.css").exists());
    }

    #[tokio::test]
    async fn test_template_failure_is_fatal() {
        let out = tempfile::tempdir().unwrap();
        let templates = tempfile::tempdir().unwrap();
        stdfs::write(templates.path().join(html::INDEX_TEMPLATE), "{% for %}").unwrap();
        let generator = SiteGenerator::new(out.path(), templates.path());

        let result = generator.generate(&topics(), "Info Pulse").await;
        assert!(matches!(result, Err(PulseError::Template(_))));
        assert!(!out.path().join(INDEX_FILE).exists());
        assert!(!out.path().join(json::SNAPSHOT_FILE).exists());
    }
}
