//! Render command - print one article as sanitized HTML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::article::front::split_front_matter;
use crate::article::{index::build_index, scan::scan_articles};
use crate::config::Config;
use crate::log;
use crate::render::MarkdownRenderer;
use crate::store::ArticleStore;
use crate::utils::fs::write_text;

/// Run the render command.
///
/// `target` may be an article id or a slug; ids are tried first since
/// the charsets overlap.
pub fn run_render(config: &Config, target: &str, output: Option<&Path>, plain: bool) -> Result<()> {
    let content_dir = config.content_dir();
    let articles = scan_articles(&content_dir);
    let items = build_index(&articles, &content_dir, config.content.excerpt_length);
    let store = ArticleStore::new(&content_dir, items);

    let article = if store.item_by_id(target).is_some() {
        store.get_by_id(target)?
    } else {
        store.get_by_slug(target)?
    };

    let html = if plain {
        let path = content_dir.join(format!("{}.md", article.slug));
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let body = match split_front_matter(&raw) {
            Some((_, body)) => body.to_string(),
            None => raw,
        };
        MarkdownRenderer::new().render_plain(&body)
    } else {
        article.content.clone()
    };

    match output {
        Some(path) => {
            write_text(path, &html)?;
            log!("render"; "{} -> {}", article.slug, path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}
