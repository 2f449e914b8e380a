//! Article registry: index lookups, loading, and render caches.
//!
//! An `ArticleStore` is built from the generated index and owns every
//! piece of per-article state: lookup tables by id and slug, the
//! search entries, and the rendered-article caches. Articles are
//! parsed and rendered at most once; repeat loads hit the cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::article::front::{parse_block, split_front_matter};
use crate::article::{ArticleIndexItem, FrontMatter};
use crate::render::MarkdownRenderer;
use crate::search::{SearchEntry, build_search_index};
use crate::utils::path::is_safe_slug;
use crate::{debug, log};

#[derive(Debug, Error)]
pub enum LoadError {
    /// Slug contains traversal sequences or is empty. Checked before
    /// any filesystem access.
    #[error("invalid article slug: {0:?}")]
    InvalidSlug(String),
    #[error("article not found: {0}")]
    NotFound(String),
    /// The file exists but carries no id. Loading is strict here even
    /// though indexing silently skips such files.
    #[error("article \"{0}\" has no id (run `sumi fix`)")]
    MissingId(String),
    #[error("failed to read article {slug}: {source}")]
    Io {
        slug: String,
        #[source]
        source: std::io::Error,
    },
}

/// A fully loaded article: index metadata plus rendered content.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub sticky: i64,
    /// Sanitized HTML body.
    pub content: String,
}

pub struct ArticleStore {
    root: PathBuf,
    items: Vec<ArticleIndexItem>,
    by_id: FxHashMap<String, usize>,
    by_slug: FxHashMap<String, usize>,
    search: Vec<SearchEntry>,
    renderer: MarkdownRenderer,
    cache_by_slug: RwLock<FxHashMap<String, Arc<Article>>>,
    cache_by_id: RwLock<FxHashMap<String, Arc<Article>>>,
}

impl ArticleStore {
    pub fn new(root: impl Into<PathBuf>, items: Vec<ArticleIndexItem>) -> Self {
        let mut by_id = FxHashMap::default();
        let mut by_slug = FxHashMap::default();
        for (pos, item) in items.iter().enumerate() {
            by_id.insert(item.id.clone(), pos);
            by_slug.insert(item.slug.clone(), pos);
        }
        let search = build_search_index(&items);

        Self {
            root: root.into(),
            items,
            by_id,
            by_slug,
            search,
            renderer: MarkdownRenderer::new(),
            cache_by_slug: RwLock::new(FxHashMap::default()),
            cache_by_id: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn items(&self) -> &[ArticleIndexItem] {
        &self.items
    }

    pub fn item_by_id(&self, id: &str) -> Option<&ArticleIndexItem> {
        self.by_id.get(id).map(|&pos| &self.items[pos])
    }

    pub fn item_by_slug(&self, slug: &str) -> Option<&ArticleIndexItem> {
        self.by_slug.get(slug).map(|&pos| &self.items[pos])
    }

    /// Search the index, returning matching items in index order.
    pub fn search(&self, query: &str) -> Vec<&ArticleIndexItem> {
        crate::search::search_ids(&self.search, query)
            .iter()
            .filter_map(|id| self.item_by_id(id))
            .collect()
    }

    /// Load an article by id, via the index.
    pub fn get_by_id(&self, id: &str) -> Result<Arc<Article>, LoadError> {
        if let Some(cached) = self.cache_by_id.read().get(id) {
            return Ok(Arc::clone(cached));
        }
        let Some(item) = self.item_by_id(id) else {
            return Err(LoadError::NotFound(id.to_string()));
        };
        self.get_by_slug(&item.slug.clone())
    }

    /// Load an article by slug, parsing and rendering on first use.
    pub fn get_by_slug(&self, slug: &str) -> Result<Arc<Article>, LoadError> {
        if !is_safe_slug(slug) {
            log!("store"; "error: rejected unsafe slug: {:?}", slug);
            return Err(LoadError::InvalidSlug(slug.to_string()));
        }

        if let Some(cached) = self.cache_by_slug.read().get(slug) {
            debug!("store"; "cache hit for {}", slug);
            return Ok(Arc::clone(cached));
        }

        let article = Arc::new(self.load(slug)?);
        self.cache_by_slug
            .write()
            .insert(slug.to_string(), Arc::clone(&article));
        self.cache_by_id
            .write()
            .insert(article.id.clone(), Arc::clone(&article));
        Ok(article)
    }

    fn load(&self, slug: &str) -> Result<Article, LoadError> {
        let path = self.root.join(format!("{slug}.md"));
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(slug.to_string()));
            }
            Err(e) => {
                return Err(LoadError::Io {
                    slug: slug.to_string(),
                    source: e,
                });
            }
        };

        let (front, body) = match split_front_matter(&content) {
            Some((raw, body)) => (parse_block(raw), body),
            None => (FrontMatter::default(), content.as_str()),
        };

        let Some(id) = front.id.clone().filter(|id| !id.is_empty()) else {
            return Err(LoadError::MissingId(slug.to_string()));
        };

        // Prefer index metadata (it already resolved date and excerpt
        // fallbacks); derive from front matter for un-indexed files.
        let (title, date, excerpt) = match self.item_by_slug(slug) {
            Some(item) => (item.title.clone(), item.date.clone(), item.excerpt.clone()),
            None => (
                front.title.clone().unwrap_or_else(|| slug.to_string()),
                front.date.clone().unwrap_or_default(),
                front
                    .excerpt
                    .clone()
                    .or_else(|| front.description.clone())
                    .unwrap_or_default(),
            ),
        };

        Ok(Article {
            id,
            slug: slug.to_string(),
            title,
            date,
            excerpt,
            author: front.author,
            category: front.category,
            tags: front.tags,
            sticky: front.sticky,
            content: self.renderer.render(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_article(dir: &Path, slug: &str, id: Option<&str>, body: &str) {
        let path = dir.join(format!("{slug}.md"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let front = match id {
            Some(id) => format!("---\nid: {id}\ntitle: Test {slug}\ndate: 2024-01-01\n---\n\n"),
            None => "---\ntitle: no id\n---\n\n".to_string(),
        };
        fs::write(path, format!("{front}{body}")).unwrap();
    }

    fn item(id: &str, slug: &str) -> ArticleIndexItem {
        ArticleIndexItem {
            id: id.to_string(),
            slug: slug.to_string(),
            title: format!("Test {slug}"),
            date: "2024-01-01".to_string(),
            excerpt: String::new(),
            author: None,
            category: None,
            tags: Vec::new(),
            sticky: 0,
        }
    }

    #[test]
    fn test_load_by_slug_renders_content() {
        let dir = tempfile::tempdir().unwrap();
        write_article(dir.path(), "hello", Some("aaaaaaaa"), "# Heading\n\nbody **bold**");
        let store = ArticleStore::new(dir.path(), vec![item("aaaaaaaa", "hello")]);

        let article = store.get_by_slug("hello").unwrap();
        assert_eq!(article.id, "aaaaaaaa");
        assert!(article.content.contains("<h1>Heading</h1>"));
        assert!(article.content.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_load_by_id_resolves_through_index() {
        let dir = tempfile::tempdir().unwrap();
        write_article(dir.path(), "hello", Some("aaaaaaaa"), "body");
        let store = ArticleStore::new(dir.path(), vec![item("aaaaaaaa", "hello")]);

        let article = store.get_by_id("aaaaaaaa").unwrap();
        assert_eq!(article.slug, "hello");
        assert!(matches!(
            store.get_by_id("missing1"),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn test_unsafe_slug_rejected_before_fs() {
        let store = ArticleStore::new("/nonexistent", Vec::new());
        for slug in ["../etc/passwd", "./hidden", "a/..\\b", ""] {
            assert!(
                matches!(store.get_by_slug(slug), Err(LoadError::InvalidSlug(_))),
                "slug {slug:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_absolute_slug_cannot_escape_root() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.md"), "---\nid: aaaaaaaa\n---\nTOP SECRET")
            .unwrap();

        let root = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(root.path(), Vec::new());

        // An absolute slug would replace the root in Path::join
        let slug = outside.path().join("secret").to_string_lossy().into_owned();
        assert!(matches!(
            store.get_by_slug(&slug),
            Err(LoadError::InvalidSlug(_))
        ));
    }

    #[test]
    fn test_missing_id_is_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        write_article(dir.path(), "draft", None, "body");
        let store = ArticleStore::new(dir.path(), Vec::new());
        assert!(matches!(
            store.get_by_slug("draft"),
            Err(LoadError::MissingId(_))
        ));
    }

    #[test]
    fn test_cache_serves_first_parse() {
        let dir = tempfile::tempdir().unwrap();
        write_article(dir.path(), "hello", Some("aaaaaaaa"), "original body");
        let store = ArticleStore::new(dir.path(), vec![item("aaaaaaaa", "hello")]);

        let first = store.get_by_slug("hello").unwrap();
        assert!(first.content.contains("original body"));

        // Mutating the file must not affect subsequent loads
        write_article(dir.path(), "hello", Some("aaaaaaaa"), "changed body");
        let second = store.get_by_slug("hello").unwrap();
        assert!(second.content.contains("original body"));
        assert!(Arc::ptr_eq(&first, &second));

        let by_id = store.get_by_id("aaaaaaaa").unwrap();
        assert!(Arc::ptr_eq(&first, &by_id));
    }

    #[test]
    fn test_search_returns_items_in_index_order() {
        let mut sticky = item("aaaaaaaa", "pinned");
        sticky.title = "rust pinned".to_string();
        let mut normal = item("bbbbbbbb", "note");
        normal.title = "rust note".to_string();
        let store = ArticleStore::new("/tmp", vec![sticky, normal]);

        let hits = store.search("rust");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].slug, "pinned");
        assert!(store.search("").is_empty());
    }
}
