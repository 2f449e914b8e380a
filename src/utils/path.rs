//! Path and slug utilities.
//!
//! Slugs are derived from file paths relative to the content root,
//! with OS separators normalized to `/` and the `.md` extension
//! stripped. Route parameters are validated here before any
//! filesystem access.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Derive an article slug from a file path.
///
/// The slug is the path relative to `root` with separators normalized
/// to `/` and a trailing `.md` (any case) removed.
///
/// # Examples
/// ```ignore
/// // blogs/2024/hello.md under root blogs -> "2024/hello"
/// ```
pub fn to_slug(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut slug = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if let Some(stripped) = slug
        .len()
        .checked_sub(3)
        .filter(|&i| slug[i..].eq_ignore_ascii_case(".md"))
    {
        slug.truncate(stripped);
    }
    slug
}

/// Check a route parameter for path escape sequences.
///
/// Rejects traversal components and absolute forms: an absolute slug
/// passed to `Path::join` would replace the content root entirely.
/// Rejected slugs must resolve to "not found" without touching the
/// filesystem.
pub fn is_safe_slug(slug: &str) -> bool {
    const TRAVERSAL: [&str; 3] = ["../", "./", "..\\"];

    if slug.is_empty() || slug.starts_with(['/', '\\']) {
        return false;
    }
    // Windows drive-letter prefix (`C:...`) is absolute too
    let bytes = slug.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return false;
    }

    !TRAVERSAL.iter().any(|pattern| slug.contains(pattern))
}
