//! Build command - scan articles, write the index and sitemap.

use anyhow::{Context, Result};

use crate::article::{index::build_index, scan::scan_articles};
use crate::config::Config;
use crate::generator::Sitemap;
use crate::log;
use crate::utils::fs::write_text;

/// Run the build command.
pub fn run_build(config: &Config) -> Result<()> {
    let count = build_artifacts(config)?;
    log!("build"; "done ({} articles indexed)", count);
    Ok(())
}

/// Scan the content dir and write both artifacts.
///
/// Returns the number of indexed articles. Shared with watch mode,
/// which rebuilds after every stabilized change batch.
pub fn build_artifacts(config: &Config) -> Result<usize> {
    let content_dir = config.content_dir();
    let articles = scan_articles(&content_dir);
    let items = build_index(&articles, &content_dir, config.content.excerpt_length);

    let skipped = articles.len() - items.len();
    if skipped > 0 {
        log!("build"; "{} article(s) without id skipped (run `sumi fix`)", skipped);
    }

    let json =
        serde_json::to_string_pretty(&items).context("Failed to serialize article index")?;
    write_text(&config.index_path(), &json)?;
    log!(
        "index";
        "{}",
        config.index_path().file_name().unwrap_or_default().to_string_lossy()
    );

    Sitemap::build(config, &items).write(config)?;

    Ok(items.len())
}
