//! Sitemap generation.
//!
//! Generates a sitemap.xml listing the configured static pages and one
//! entry per indexed article.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/article/a1b2c3d4</loc>
//!     <lastmod>2025-01-01</lastmod>
//!     <changefreq>monthly</changefreq>
//!     <priority>0.6</priority>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;

use anyhow::Result;

use crate::article::ArticleIndexItem;
use crate::config::Config;
use crate::log;
use crate::utils::date::DateTimeUtc;
use crate::utils::fs::write_text;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Changefreq applied to article entries.
const ARTICLE_CHANGEFREQ: &str = "monthly";

/// Priority applied to article entries.
const ARTICLE_PRIORITY: f32 = 0.6;

pub struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    lastmod: String,
    changefreq: String,
    priority: f32,
}

impl Sitemap {
    /// Static pages first, then one `/article/{id}` entry per item.
    ///
    /// Static pages carry the newest article date as `lastmod` (today
    /// when the index is empty); articles carry their own date.
    pub fn build(config: &Config, items: &[ArticleIndexItem]) -> Self {
        let base_url = config.site.url.trim_end_matches('/');

        let newest = items
            .iter()
            .map(|item| item.date.as_str())
            .max()
            .map(str::to_string)
            .unwrap_or_else(|| DateTimeUtc::now().to_ymd());

        let mut urls: Vec<UrlEntry> = config
            .site
            .pages
            .iter()
            .map(|page| UrlEntry {
                loc: format!("{}{}", base_url, page.path),
                lastmod: newest.clone(),
                changefreq: page.changefreq.clone(),
                priority: page.priority,
            })
            .collect();

        urls.extend(items.iter().map(|item| UrlEntry {
            loc: format!("{}/article/{}", base_url, item.id),
            lastmod: item.date.clone(),
            changefreq: ARTICLE_CHANGEFREQ.to_string(),
            priority: ARTICLE_PRIORITY,
        }));

        Self { urls }
    }

    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n    <lastmod>");
            xml.push_str(&entry.lastmod);
            xml.push_str("</lastmod>\n    <changefreq>");
            xml.push_str(&entry.changefreq);
            xml.push_str("</changefreq>\n    <priority>");
            xml.push_str(&format_priority(entry.priority));
            xml.push_str("</priority>\n  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    pub fn write(self, config: &Config) -> Result<()> {
        let sitemap_path = config.sitemap_path();
        write_text(&sitemap_path, &self.into_xml())?;

        log!("sitemap"; "{}", sitemap_path.file_name().unwrap_or_default().to_string_lossy());
        Ok(())
    }
}

/// Priority with one decimal place, `1.0` not `1`.
fn format_priority(priority: f32) -> String {
    format!("{priority:.1}")
}

/// Escape special XML characters.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, date: &str) -> ArticleIndexItem {
        ArticleIndexItem {
            id: id.to_string(),
            slug: id.to_string(),
            title: id.to_string(),
            date: date.to_string(),
            excerpt: String::new(),
            author: None,
            category: None,
            tags: Vec::new(),
            sticky: 0,
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.site.url = "https://example.com/".to_string();
        config
    }

    #[test]
    fn test_sitemap_lists_pages_then_articles() {
        let items = vec![item("a1b2c3d4", "2024-06-01"), item("e5f6a7b8", "2024-01-01")];
        let xml = Sitemap::build(&config(), &items).into_xml();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/archive</loc>"));
        assert!(xml.contains("<loc>https://example.com/article/a1b2c3d4</loc>"));
        let pages_end = xml.find("/article/").unwrap();
        assert!(xml[..pages_end].contains("/archive"));
    }

    #[test]
    fn test_article_entries_carry_their_date() {
        let items = vec![item("a1b2c3d4", "2024-06-01")];
        let xml = Sitemap::build(&config(), &items).into_xml();
        let article = xml.split("<url>").last().unwrap();
        assert!(article.contains("<lastmod>2024-06-01</lastmod>"));
        assert!(article.contains("<changefreq>monthly</changefreq>"));
        assert!(article.contains("<priority>0.6</priority>"));
    }

    #[test]
    fn test_static_pages_use_newest_article_date() {
        let items = vec![item("a1b2c3d4", "2024-01-01"), item("e5f6a7b8", "2024-06-01")];
        let xml = Sitemap::build(&config(), &items).into_xml();
        let home = xml.split("<url>").nth(1).unwrap();
        assert!(home.contains("<lastmod>2024-06-01</lastmod>"));
        assert!(home.contains("<priority>1.0</priority>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }
}
