//! HTML rendering with `minijinja`.
//!
//! Templates are loaded from the templates directory. Two filters are
//! registered for them:
//!
//! - `format_date`: `Jan 02, 2024 at 03:04 PM`
//! - `time_ago`: `just now`, `N min ago`, `Nh ago`, `Nd ago`
//!
//! Both accept RFC 3339 strings, which is how timestamps serialize into the
//! template context.

use chrono::{DateTime, Utc};
use minijinja::{Environment, context, path_loader};
use std::path::Path;

use crate::error::PulseError;
use crate::models::{SummarizedArticle, TopicGroup};
use crate::utils::{format_date, time_ago};

pub const INDEX_TEMPLATE: &str = "index.html.jinja";

fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `format_date` filter; unparseable input is returned unchanged.
fn format_date_filter(value: String) -> String {
    match parse_rfc3339(&value) {
        Some(dt) => format_date(&dt),
        None => value,
    }
}

/// Build the template environment, with `time_ago` measured from `now`.
pub fn environment(templates_dir: &Path, now: DateTime<Utc>) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(path_loader(templates_dir));
    env.add_filter("format_date", format_date_filter);
    env.add_filter("time_ago", move |value: String| -> String {
        match parse_rfc3339(&value) {
            Some(dt) => time_ago(&dt, &now),
            None => "recently".to_string(),
        }
    });
    env
}

/// Render the index page from [`INDEX_TEMPLATE`].
///
/// # Arguments
///
/// * `templates_dir` - Directory holding [`INDEX_TEMPLATE`]
/// * `site_title` - Page title
/// * `topics` - Summarized topics in display order
/// * `generated_at` - Generation time, also the reference for `time_ago`
/// * `total_articles` - Article count shown in the header
///
/// # Returns
///
/// The rendered HTML, or [`PulseError::Template`] if the template is missing
/// or fails to render.
///
/// # Examples
///
/// ```ignore
/// let html = render_index(Path::new("templates"), "Info Pulse", &topics, Utc::now(), 12)?;
/// tokio::fs::write("docs/index.html", html).await?;
/// ```
pub fn render_index(
    templates_dir: &Path,
    site_title: &str,
    topics: &[TopicGroup<SummarizedArticle>],
    generated_at: DateTime<Utc>,
    total_articles: usize,
) -> Result<String, PulseError> {
    let env = environment(templates_dir, generated_at);
    let template = env.get_template(INDEX_TEMPLATE)?;
    let html = template.render(context! {
        site_title => site_title,
        topics => topics,
        generated_at => generated_at.to_rfc3339(),
        total_articles => total_articles,
    })?;
    Ok(html)
}
