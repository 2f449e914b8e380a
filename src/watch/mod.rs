//! Watch mode: debounced auto-id-assignment and index rebuilds.
//!
//! A notify watcher feeds raw events into a channel; the blocking loop
//! below runs them through the debouncer and, once a burst stabilizes,
//! assigns ids to new or changed markdown files and rebuilds the
//! artifacts. Ctrl+C exits the loop cleanly.

mod debouncer;

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashMap;

use crate::article::id::ensure_id;
use crate::article::scan::{is_markdown, read_article};
use crate::cli::build::build_artifacts;
use crate::config::Config;
use crate::core::is_shutdown;
use crate::logger::{status_error, status_success, status_unchanged};
use crate::utils::path::to_slug;
use crate::{debug, log};

use debouncer::{ChangeKind, Debouncer};

/// Upper bound on channel waits so the shutdown flag stays responsive.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Run the watch command. Blocks until Ctrl+C.
pub fn run_watch(config: &Config) -> Result<()> {
    let content_dir = config.content_dir();
    if !content_dir.is_dir() {
        bail!("content directory {} does not exist", content_dir.display());
    }

    // Initial build so the artifacts reflect the tree before any edits
    let count = build_artifacts(config)?;
    log!("watch"; "{} article(s) indexed, watching {}", count, content_dir.display());
    log!("watch"; "press Ctrl+C to stop");

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("Failed to create file watcher")?;
    watcher
        .watch(&content_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", content_dir.display()))?;

    let mut debouncer = Debouncer::new(
        Duration::from_millis(config.watch.debounce_ms),
        Duration::from_millis(config.watch.cooldown_ms),
    );

    while !is_shutdown() {
        let timeout = debouncer.sleep_duration().min(POLL_INTERVAL);
        match rx.recv_timeout(timeout) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(e)) => log!("watch"; "error: watcher: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(changes) = debouncer.take_if_ready() {
            handle_changes(config, changes);
        }
    }

    log!("watch"; "stopped");
    Ok(())
}

/// Process one stabilized batch: assign ids, then rebuild artifacts.
fn handle_changes(config: &Config, changes: FxHashMap<PathBuf, ChangeKind>) {
    let content_dir = config.content_dir();
    let mut relevant = false;

    for (path, kind) in &changes {
        if !is_markdown(path) {
            debug!("watch"; "ignoring non-markdown {}", path.display());
            continue;
        }
        relevant = true;

        if matches!(kind, ChangeKind::Removed) {
            status_unchanged(&format!("removed {}", to_slug(path, &content_dir)));
            continue;
        }

        let slug = to_slug(path, &content_dir);
        match read_article(path) {
            Ok(article) if article.front.has_id() => {
                status_unchanged(&slug);
            }
            Ok(article) => match ensure_id(path, &article.front, &article.body) {
                Ok(Some(id)) => status_success(&format!("{slug} -> {id}")),
                Ok(None) => status_unchanged(&slug),
                Err(e) => status_error(&slug, &format!("{e:#}")),
            },
            Err(e) => status_error(&slug, &format!("{e:#}")),
        }
    }

    if !relevant {
        return;
    }

    match build_artifacts(config) {
        Ok(count) => debug!("watch"; "rebuilt index ({} articles)", count),
        Err(e) => status_error("rebuild", &format!("{e:#}")),
    }
}
