//! Search command - keyword search over the article index.

use std::fs;

use anyhow::{Context, Result};

use crate::article::ArticleIndexItem;
use crate::article::{index::build_index, scan::scan_articles};
use crate::config::Config;
use crate::log;
use crate::search::{build_search_index, search_ids};

/// Run the search command.
///
/// Uses the index artifact when one exists (the common case after
/// `sumi build`); otherwise scans the content dir directly.
pub fn run_search(config: &Config, query: &str) -> Result<()> {
    let items = load_index(config)?;
    let entries = build_search_index(&items);
    let ids = search_ids(&entries, query);

    if ids.is_empty() {
        log!("search"; "no matches for {:?}", query);
        return Ok(());
    }

    for id in &ids {
        if let Some(item) = items.iter().find(|item| &item.id == id) {
            println!("{}  {}  {}  ({})", item.id, item.date, item.title, item.slug);
        }
    }
    log!("search"; "{} match(es)", ids.len());
    Ok(())
}

fn load_index(config: &Config) -> Result<Vec<ArticleIndexItem>> {
    let index_path = config.index_path();
    if index_path.is_file() {
        let json = fs::read_to_string(&index_path)
            .with_context(|| format!("Failed to read {}", index_path.display()))?;
        return serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", index_path.display()));
    }

    crate::debug!("search"; "no index artifact, scanning {}", config.content_dir().display());
    let content_dir = config.content_dir();
    let articles = scan_articles(&content_dir);
    Ok(build_index(&articles, &content_dir, config.content.excerpt_length))
}
