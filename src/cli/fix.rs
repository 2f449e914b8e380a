//! Fix command - assign ids to articles that are missing one.

use anyhow::Result;

use crate::article::id::ensure_id;
use crate::article::scan::scan_articles;
use crate::config::Config;
use crate::log;
use crate::utils::path::to_slug;

/// Run the fix command.
///
/// Idempotent: articles that already carry an id are untouched, so a
/// second run reports nothing to do.
pub fn run_fix(config: &Config, dry: bool) -> Result<()> {
    let content_dir = config.content_dir();
    let articles = scan_articles(&content_dir);

    let mut assigned = 0;
    let mut failed = 0;
    for article in &articles {
        if article.front.has_id() {
            continue;
        }

        let slug = to_slug(&article.path, &content_dir);
        if dry {
            log!("fix"; "would assign id to {}", slug);
            assigned += 1;
            continue;
        }

        match ensure_id(&article.path, &article.front, &article.body) {
            Ok(Some(id)) => {
                log!("fix"; "{} -> {}", slug, id);
                assigned += 1;
            }
            // has_id was false, so ensure_id always acts or errors
            Ok(None) => {}
            Err(e) => {
                log!("fix"; "error: {}: {:#}", slug, e);
                failed += 1;
            }
        }
    }

    match (assigned, dry) {
        (0, _) => log!("fix"; "all articles have ids"),
        (n, true) => log!("fix"; "{} article(s) need ids (dry run, nothing written)", n),
        (n, false) => log!("fix"; "assigned {} id(s)", n),
    }

    if failed > 0 {
        anyhow::bail!("{failed} article(s) could not be updated");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_at(root: &std::path::Path) -> Config {
        Config {
            root: root.to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_fix_assigns_missing_ids_only() {
        let dir = tempfile::tempdir().unwrap();
        let blogs = dir.path().join("blogs");
        fs::create_dir_all(&blogs).unwrap();
        fs::write(blogs.join("has.md"), "---\nid: a1b2c3d4\n---\n\nbody").unwrap();
        fs::write(blogs.join("missing.md"), "---\ntitle: X\n---\n\nbody").unwrap();

        run_fix(&config_at(dir.path()), false).unwrap();

        let untouched = fs::read_to_string(blogs.join("has.md")).unwrap();
        assert!(untouched.contains("id: a1b2c3d4"));
        let fixed = fs::read_to_string(blogs.join("missing.md")).unwrap();
        assert!(fixed.contains("id: "));
        assert!(fixed.ends_with("body"));

        // Second run changes nothing
        let before = fs::read_to_string(blogs.join("missing.md")).unwrap();
        run_fix(&config_at(dir.path()), false).unwrap();
        assert_eq!(fs::read_to_string(blogs.join("missing.md")).unwrap(), before);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let blogs = dir.path().join("blogs");
        fs::create_dir_all(&blogs).unwrap();
        let original = "---\ntitle: X\n---\n\nbody";
        fs::write(blogs.join("a.md"), original).unwrap();

        run_fix(&config_at(dir.path()), true).unwrap();
        assert_eq!(fs::read_to_string(blogs.join("a.md")).unwrap(), original);
    }
}
