//! Application layer - Use case services.
//!
//! The [`Terminator`] runs the signal escalation for one process and the
//! [`Reconciler`] composes discovery and termination into sweeps. Both
//! depend only on the traits in `ports`.

mod reconciler;
mod terminator;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::{Arc, OnceLock};

pub use reconciler::Reconciler;
pub use terminator::{Terminator, DEFAULT_FORCED_GRACE_PERIOD, DEFAULT_GRACE_PERIOD};

use crate::adapters::{PortScanner, ProcessMatcher, SignalSender};
use crate::config::ReconcilerConfig;
use crate::domain::WatchList;

/// A reconciler wired to the current platform's adapters.
pub type PlatformReconciler = Reconciler<ProcessMatcher, PortScanner, SignalSender>;

impl Reconciler<ProcessMatcher, PortScanner, SignalSender> {
    /// Create a reconciler for this host sharing `watch`.
    pub fn platform(watch: Arc<WatchList>) -> Self {
        Reconciler::new(
            ProcessMatcher::new(),
            PortScanner::new(),
            SignalSender::new(),
            watch,
        )
    }

    /// Create a platform reconciler, registering the config's patterns and
    /// ports into `watch` and applying its grace periods.
    pub fn from_config(config: &ReconcilerConfig, watch: Arc<WatchList>) -> Self {
        config.apply(&watch);
        Self::platform(watch).with_grace_periods(config.grace_period(), config.forced_grace_period())
    }
}

static WATCH_LIST: OnceLock<Arc<WatchList>> = OnceLock::new();

/// The process-wide watch list, seeded with the built-in defaults.
pub fn global_watch_list() -> Arc<WatchList> {
    WATCH_LIST
        .get_or_init(|| Arc::new(WatchList::with_defaults()))
        .clone()
}

/// Watch another command-line pattern for the rest of this process's life.
pub fn register_pattern(pattern: &str) {
    global_watch_list().register_pattern(pattern);
}

/// Watch another TCP port for the rest of this process's life.
pub fn register_port(port: u16) {
    global_watch_list().register_port(port);
}

/// Sweep the host for processes matching the process-wide watch list.
///
/// Returns the number of processes confirmed gone. Never fails.
pub async fn cleanup_orphaned_processes() -> usize {
    PlatformReconciler::platform(global_watch_list())
        .cleanup_orphaned_processes()
        .await
}

/// Terminate whatever is listening on `port`.
///
/// Returns `false` only if a listener was found and could not be killed.
pub async fn free_port(port: u16) -> bool {
    PlatformReconciler::platform(global_watch_list())
        .free_port(port)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_registration_is_shared_and_idempotent() {
        register_pattern("global-test-pattern");
        register_pattern("global-test-pattern");
        register_port(65001);
        register_port(65001);

        let watch = global_watch_list();
        let patterns = watch.patterns();
        assert_eq!(patterns.iter().filter(|p| *p == "global-test-pattern").count(), 1);
        assert!(patterns.contains(&"mcp-server".to_string()));
        assert_eq!(watch.ports().iter().filter(|p| **p == 65001).count(), 1);
    }

    #[test]
    fn test_from_config_registers_extras() {
        let watch = Arc::new(WatchList::new());
        let config = ReconcilerConfig {
            patterns: vec!["from-config".to_string()],
            ports: vec![65002],
            ..ReconcilerConfig::default()
        };

        let reconciler = PlatformReconciler::from_config(&config, watch.clone());

        assert_eq!(reconciler.watch_list().patterns(), vec!["from-config".to_string()]);
        assert_eq!(watch.ports(), vec![65002]);
    }
}
