//! Site configuration management for `sumi.toml`.
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[site]`     | Site url and static pages for the sitemap        |
//! | `[content]`  | Content dir, artifact paths, excerpt length      |
//! | `[watch]`    | Debounce and cooldown timing                     |
//! | `[activity]` | Git activity window and output path              |
//!
//! A missing config file is not an error; every field has a default so
//! the tool works out of the box in a conventional repo layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::log;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Project root, parent of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub content: ContentSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub activity: ActivitySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSection {
    /// Canonical site url, no trailing slash (e.g. `https://example.com`).
    #[serde(default)]
    pub url: String,

    /// Static pages included in the sitemap ahead of article entries.
    #[serde(default = "SiteSection::default_pages")]
    pub pages: Vec<StaticPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPage {
    pub path: String,
    #[serde(default = "StaticPage::default_changefreq")]
    pub changefreq: String,
    #[serde(default = "StaticPage::default_priority")]
    pub priority: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSection {
    /// Article source directory, relative to the project root.
    #[serde(default = "ContentSection::default_dir")]
    pub dir: PathBuf,

    /// Article index artifact path.
    #[serde(default = "ContentSection::default_index")]
    pub index: PathBuf,

    /// Sitemap artifact path.
    #[serde(default = "ContentSection::default_sitemap")]
    pub sitemap: PathBuf,

    /// Maximum derived excerpt length, in characters.
    #[serde(default = "ContentSection::default_excerpt_length")]
    pub excerpt_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSection {
    /// Quiet period before a burst of events is processed.
    #[serde(default = "WatchSection::default_debounce_ms")]
    pub debounce_ms: u64,

    /// Minimum interval between rebuilds of the same file.
    #[serde(default = "WatchSection::default_cooldown_ms")]
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySection {
    /// Commit window in days.
    #[serde(default = "ActivitySection::default_days")]
    pub days: u64,

    /// Activity artifact path.
    #[serde(default = "ActivitySection::default_output")]
    pub output: PathBuf,
}

impl SiteSection {
    fn default_pages() -> Vec<StaticPage> {
        vec![
            StaticPage {
                path: "/".into(),
                changefreq: "daily".into(),
                priority: 1.0,
            },
            StaticPage {
                path: "/archive".into(),
                changefreq: "weekly".into(),
                priority: 0.8,
            },
            StaticPage {
                path: "/about".into(),
                changefreq: "monthly".into(),
                priority: 0.5,
            },
        ]
    }
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            pages: Self::default_pages(),
        }
    }
}

impl StaticPage {
    fn default_changefreq() -> String {
        "monthly".into()
    }

    fn default_priority() -> f32 {
        0.5
    }
}

impl ContentSection {
    fn default_dir() -> PathBuf {
        "blogs".into()
    }

    fn default_index() -> PathBuf {
        "public/data/article-index.json".into()
    }

    fn default_sitemap() -> PathBuf {
        "public/sitemap.xml".into()
    }

    fn default_excerpt_length() -> usize {
        crate::article::index::DEFAULT_EXCERPT_LENGTH
    }
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            index: Self::default_index(),
            sitemap: Self::default_sitemap(),
            excerpt_length: Self::default_excerpt_length(),
        }
    }
}

impl WatchSection {
    fn default_debounce_ms() -> u64 {
        300
    }

    fn default_cooldown_ms() -> u64 {
        800
    }
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: Self::default_debounce_ms(),
            cooldown_ms: Self::default_cooldown_ms(),
        }
    }
}

impl ActivitySection {
    fn default_days() -> u64 {
        30
    }

    fn default_output() -> PathBuf {
        "public/data/git-activity.json".into()
    }
}

impl Default for ActivitySection {
    fn default() -> Self {
        Self {
            days: Self::default_days(),
            output: Self::default_output(),
        }
    }
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file; its parent becomes
    /// the project root. Without a config file, cwd is the root and all
    /// defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        if let Some(dir) = &cli.content {
            config.content.dir = dir.clone();
        }

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "unknown fields in {}, ignoring:", display_path);
            for field in &ignored {
                eprintln!("- {field}");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Article source directory, absolute.
    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.content.dir)
    }

    /// Article index artifact path, absolute.
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.content.index)
    }

    /// Sitemap artifact path, absolute.
    pub fn sitemap_path(&self) -> PathBuf {
        self.root.join(&self.content.sitemap)
    }

    /// Git activity artifact path, absolute.
    pub fn activity_path(&self) -> PathBuf {
        self.root.join(&self.activity.output)
    }
}

/// Search upward from cwd for the config file.
fn find_config_file(name: &Path) -> Option<PathBuf> {
    // Absolute paths are used as-is
    if name.is_absolute() {
        return name.exists().then(|| name.to_path_buf());
    }

    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
