//! Subcommand implementations.

pub mod config;
pub mod free_port;
pub mod list;
pub mod sweep;
pub mod watch;

use anyhow::Result;
use orphan_reaper_core::{ConfigStore, PlatformReconciler};
use tracing::debug;

/// Build a reconciler from the persisted config plus per-run extras.
///
/// Starts from the process-wide watch list, so built-in defaults always
/// apply.
pub async fn build_reconciler(patterns: &[String], ports: &[u16]) -> Result<PlatformReconciler> {
    let store = ConfigStore::new()?;
    let config = store.load().await?;
    debug!(path = %store.path().display(), "Loaded configuration");

    let reconciler = PlatformReconciler::from_config(&config, orphan_reaper_core::global_watch_list());

    for pattern in patterns {
        reconciler.register_pattern(pattern);
    }
    for port in ports {
        reconciler.register_port(*port);
    }
    Ok(reconciler)
}
