//! Article index building and sorting.
//!
//! The index is the lightweight, denormalized summary of all articles
//! used for listing and search without loading full content. It is
//! regenerated wholesale on every build; files without an id are
//! skipped so un-ided drafts stay invisible until `sumi fix` runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::scan::ScannedArticle;
use crate::utils::date::DateTimeUtc;
use crate::utils::path::to_slug;
use crate::{debug, log};

/// Default maximum derived excerpt length, in characters.
pub const DEFAULT_EXCERPT_LENGTH: usize = 200;

/// One entry of the generated article index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleIndexItem {
    pub id: String,
    pub slug: String,
    pub title: String,
    /// Publication date, `YYYY-MM-DD`.
    pub date: String,
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sticky: i64,
}

/// Build the index from scanned articles, sorted for presentation.
pub fn build_index(articles: &[ScannedArticle], root: &Path, excerpt_length: usize) -> Vec<ArticleIndexItem> {
    let mut items: Vec<ArticleIndexItem> = articles
        .iter()
        .filter_map(|article| build_item(article, root, excerpt_length))
        .collect();
    sort_index(&mut items);
    items
}

fn build_item(
    article: &ScannedArticle,
    root: &Path,
    excerpt_length: usize,
) -> Option<ArticleIndexItem> {
    let front = &article.front;
    let Some(id) = front.id.clone().filter(|id| !id.is_empty()) else {
        debug!("index"; "skipping {} (no id)", article.path.display());
        return None;
    };

    let slug = to_slug(&article.path, root);
    let title = front
        .title
        .clone()
        .unwrap_or_else(|| basename(&slug).to_string());
    let date = resolve_date(front.date.as_deref(), article.mtime, &slug);
    let excerpt = front
        .excerpt
        .clone()
        .or_else(|| front.description.clone())
        .unwrap_or_else(|| derive_excerpt(&article.body, excerpt_length));

    Some(ArticleIndexItem {
        id,
        slug,
        title,
        date,
        excerpt,
        author: front.author.clone(),
        category: front.category.clone(),
        tags: front.tags.clone(),
        sticky: front.sticky,
    })
}

/// Presentation order: sticky descending, then date descending, then
/// slug ascending as a deterministic tie-break.
pub fn sort_index(items: &mut [ArticleIndexItem]) {
    items.sort_by(|a, b| {
        b.sticky
            .cmp(&a.sticky)
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

/// Front-matter date if parseable, else file mtime.
fn resolve_date(date: Option<&str>, mtime: std::time::SystemTime, slug: &str) -> String {
    if let Some(raw) = date {
        match DateTimeUtc::parse(raw) {
            Some(dt) => return dt.to_ymd(),
            None => {
                log!("index"; "warning: article \"{}\" has an invalid date: {}", slug, raw);
            }
        }
    }
    DateTimeUtc::from_system_time(mtime).to_ymd()
}

/// Derive a listing excerpt from the body.
///
/// Strips markdown formatting characters, collapses whitespace, and
/// truncates to `max_length` characters with an ellipsis marker.
pub fn derive_excerpt(body: &str, max_length: usize) -> String {
    let stripped: String = body
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '`' | '_' | '[' | ']'))
        .collect();
    let plain = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if plain.chars().count() <= max_length {
        return plain;
    }
    let mut excerpt: String = plain.chars().take(max_length).collect();
    excerpt.push_str("...");
    excerpt
}

fn basename(slug: &str) -> &str {
    slug.rsplit('/').next().unwrap_or(slug)
}
