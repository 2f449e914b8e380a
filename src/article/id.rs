//! Article id generation and assignment.
//!
//! Every article carries a stable 8-character id drawn from a
//! 36-symbol alphabet (lowercase letters + digits), generated from the
//! OS CSPRNG. The space is ~2.8e12; generated ids are not checked
//! against the existing set.
//!
//! Assignment rewrites the front-matter block in place and must be
//! idempotent: a file that already has an id is never touched.

use std::path::Path;

use anyhow::{Context, Result};

use super::front::{self, FrontMatter};

pub const ID_LENGTH: usize = 8;
const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a fresh random article id.
pub fn generate_id() -> Result<String> {
    let mut buf = [0u8; ID_LENGTH];
    getrandom::getrandom(&mut buf).context("failed to read from the OS random source")?;
    Ok(buf
        .iter()
        .map(|&byte| ID_CHARSET[byte as usize % ID_CHARSET.len()] as char)
        .collect())
}

/// Ensure the article at `path` has an id, rewriting the file if not.
///
/// Returns the newly assigned id, or `None` when the file already had
/// one (no-op). The body is preserved byte-for-byte; only the
/// front-matter block is reserialized.
pub fn ensure_id(path: &Path, front: &FrontMatter, body: &str) -> Result<Option<String>> {
    if front.has_id() {
        return Ok(None);
    }

    let id = generate_id()?;
    let mut updated = front.clone();
    updated.id = Some(id.clone());

    let content = front::serialize(&updated, body);
    write_atomic(path, &content)
        .with_context(|| format!("failed to write id to {}", path.display()))?;

    Ok(Some(id))
}

/// Write via a sibling temp file and rename, so a failed write leaves
/// the original content intact.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .context("path has no file name")?;
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&tmp, content)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
