//! Keyword search over the article index.
//!
//! Each indexed article contributes one lowercased text blob of its
//! title, excerpt, and tags. A query is split on whitespace and an
//! article matches when any keyword appears as a substring of its
//! blob. Results keep index order, so they inherit the sticky/date
//! presentation sort.

use serde::{Deserialize, Serialize};

use crate::article::ArticleIndexItem;

/// One searchable article: its id plus the text blob matched against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEntry {
    pub id: String,
    pub blob: String,
}

/// Build search entries from the article index, preserving its order.
pub fn build_search_index(items: &[ArticleIndexItem]) -> Vec<SearchEntry> {
    items
        .iter()
        .map(|item| SearchEntry {
            id: item.id.clone(),
            blob: build_blob(item),
        })
        .collect()
}

fn build_blob(item: &ArticleIndexItem) -> String {
    let mut blob = String::with_capacity(
        item.title.len() + item.excerpt.len() + item.tags.iter().map(|t| t.len() + 1).sum::<usize>() + 2,
    );
    blob.push_str(&item.title);
    blob.push(' ');
    blob.push_str(&item.excerpt);
    for tag in &item.tags {
        blob.push(' ');
        blob.push_str(tag);
    }
    blob.to_lowercase()
}

/// Ids of entries matching any whitespace-separated keyword.
///
/// A blank query matches nothing.
pub fn search_ids(entries: &[SearchEntry], query: &str) -> Vec<String> {
    let keywords: Vec<String> = query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if keywords.is_empty() {
        return Vec::new();
    }

    entries
        .iter()
        .filter(|entry| keywords.iter().any(|kw| entry.blob.contains(kw)))
        .map(|entry| entry.id.clone())
        .collect()
}
