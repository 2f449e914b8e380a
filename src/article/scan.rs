//! Content tree scanning (pure, no side effects).
//!
//! Walks the content directory for markdown files and splits each into
//! front matter and body. A single unreadable file never aborts the
//! scan; a missing root degrades to an empty result.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use jwalk::WalkDir;

use super::front::{self, FrontMatter};
use crate::{debug, log};

/// One markdown file with its parsed front matter.
#[derive(Debug, Clone)]
pub struct ScannedArticle {
    pub path: PathBuf,
    pub front: FrontMatter,
    pub body: String,
    pub mtime: SystemTime,
}

/// Scan `root` recursively for `.md` files.
///
/// Walk order is deterministic (sorted) so downstream artifacts are
/// reproducible. Files without a front-matter block yield default
/// attributes with the whole file as body.
pub fn scan_articles(root: &Path) -> Vec<ScannedArticle> {
    if !root.is_dir() {
        log!("error"; "content directory missing or unreadable: {}", root.display());
        return Vec::new();
    }

    let mut articles = Vec::new();

    for entry in WalkDir::new(root).sort(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log!("error"; "scan: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_markdown(&path) {
            continue;
        }

        match read_article(&path) {
            Ok(article) => articles.push(article),
            Err(e) => log!("error"; "skipping {}: {}", path.display(), e),
        }
    }

    if articles.is_empty() {
        log!("scan"; "warning: no markdown articles found under {}", root.display());
    } else {
        debug!("scan"; "{} markdown files under {}", articles.len(), root.display());
    }

    articles
}

/// Read and split a single markdown file.
pub fn read_article(path: &Path) -> anyhow::Result<ScannedArticle> {
    let content = std::fs::read_to_string(path)?;
    let mtime = file_mtime(path);

    let (front, body) = match front::split_front_matter(&content) {
        Some((block, body)) => (front::parse_block(block), body.to_string()),
        // Graceful degradation: whole file is the body
        None => (FrontMatter::default(), content),
    };

    Ok(ScannedArticle {
        path: path.to_path_buf(),
        front,
        body,
        mtime,
    })
}

/// File modification time, or the current time when the filesystem
/// cannot report one. The current-time fallback keeps derived index
/// dates plausible instead of pinning them to the epoch.
fn file_mtime(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .unwrap_or_else(|_| SystemTime::now())
}

pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}
