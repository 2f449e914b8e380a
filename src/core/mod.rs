//! Process-wide run state.
//!
//! One flag: has shutdown been requested (Ctrl+C received)?
//! Watch mode polls it between debounce rounds; short-lived commands
//! exit on the second Ctrl+C.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Setup the global Ctrl+C handler. Call once at program start
///
/// First Ctrl+C sets the shutdown flag so the watch loop can drain
/// cleanly; a second one exits immediately.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}
