//! Small filesystem helpers shared by the artifact writers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Write a text artifact, creating parent directories as needed.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_text_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.json");
        write_text(&path, "[]").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }
}
