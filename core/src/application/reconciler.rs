//! Sweep orchestration: discover, deduplicate, terminate.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{
    merge, ProcessHandle, ProcessHandleSet, SweepReport, TerminationOutcome, TerminationReason,
    WatchList,
};
use crate::ports::{PortLookupPort, ProcessMatcherPort, SignalPort};

use super::terminator::Terminator;

/// PIDs a sweep must never signal: the idle/swapper slot, init, the host
/// itself and every process the host descends from.
struct Protected(HashSet<u32>);

impl Protected {
    fn new(ancestors: Vec<u32>) -> Self {
        let mut pids: HashSet<u32> = ancestors.into_iter().collect();
        pids.extend([0, 1, std::process::id()]);
        Self(pids)
    }

    fn contains(&self, pid: u32) -> bool {
        self.0.contains(&pid)
    }
}

/// Finds and terminates orphaned subprocesses.
///
/// Discovery combines a command-line matcher and a port lookup over the
/// shared [`WatchList`]. Termination is strictly sequential.
pub struct Reconciler<M, P, S>
where
    M: ProcessMatcherPort,
    P: PortLookupPort,
    S: SignalPort,
{
    matcher: M,
    scanner: P,
    terminator: Terminator<S>,
    watch: Arc<WatchList>,
}

impl<M, P, S> Reconciler<M, P, S>
where
    M: ProcessMatcherPort,
    P: PortLookupPort,
    S: SignalPort,
{
    pub fn new(matcher: M, scanner: P, signals: S, watch: Arc<WatchList>) -> Self {
        Self {
            matcher,
            scanner,
            terminator: Terminator::new(signals),
            watch,
        }
    }

    /// Override the terminator's grace periods.
    pub fn with_grace_periods(mut self, grace_period: Duration, forced_grace_period: Duration) -> Self {
        self.terminator = self
            .terminator
            .with_grace_periods(grace_period, forced_grace_period);
        self
    }

    pub fn watch_list(&self) -> &Arc<WatchList> {
        &self.watch
    }

    /// Watch another command-line pattern. Idempotent.
    pub fn register_pattern(&self, pattern: &str) {
        self.watch.register_pattern(pattern);
    }

    /// Watch another TCP port. Idempotent.
    pub fn register_port(&self, port: u16) {
        self.watch.register_port(port);
    }

    /// Find every watched process without touching any of them.
    ///
    /// Pattern matches come first, then port matches; a process found by
    /// several probes appears once under its first label.
    pub async fn discover(&self) -> ProcessHandleSet {
        let snapshot = self.watch.snapshot();

        let (pattern_hits, port_hits) = tokio::join!(
            self.matcher.find_by_pattern(&snapshot.patterns),
            self.scanner.find_by_port(&snapshot.ports)
        );

        let mut handles = merge(pattern_hits, port_hits);
        if handles.is_empty() {
            return handles;
        }

        let protected = self.protected().await;
        handles.retain(|handle| {
            let skip = protected.contains(handle.pid);
            if skip {
                debug!(pid = handle.pid, label = %handle.label, "Skipping protected process");
            }
            !skip
        });

        for handle in &handles {
            info!(pid = handle.pid, label = %handle.label, "Found orphaned process");
        }
        handles
    }

    /// Run a full sweep and report every outcome.
    pub async fn sweep(&self) -> SweepReport {
        let handles = self.discover().await;
        let mut report = SweepReport::default();

        if handles.is_empty() {
            info!("No orphaned processes found");
            return report;
        }

        // One process in flight at a time
        for handle in handles {
            let outcome = self.terminator.terminate(handle.pid).await;
            log_outcome(&handle, &outcome);
            report.push(handle, outcome);
        }

        if report.all_succeeded() {
            info!(killed = report.killed, total = report.total, "Orphan sweep complete: {}", report);
        } else {
            warn!(killed = report.killed, total = report.total, "Orphan sweep incomplete: {}", report);
        }
        report
    }

    /// Run a full sweep and return how many processes are gone afterwards.
    ///
    /// Processes that were already dead count as successes.
    pub async fn cleanup_orphaned_processes(&self) -> usize {
        self.sweep().await.killed
    }

    /// Make sure nothing is listening on `port`.
    ///
    /// Returns `true` if the port had no listener or every listener was
    /// terminated, `false` otherwise. A port held by this process or one of
    /// its ancestors is never freed.
    pub async fn free_port(&self, port: u16) -> bool {
        let listeners: ProcessHandleSet = self.scanner.find_listeners(port).await.into_iter().collect();

        if listeners.is_empty() {
            debug!(port = port, "Port already free");
            return true;
        }

        let protected = self.protected().await;
        let mut freed = true;
        for handle in listeners {
            if protected.contains(handle.pid) {
                warn!(pid = handle.pid, port = port, "Port is held by a protected process");
                freed = false;
                continue;
            }

            info!(pid = handle.pid, port = port, "Found process holding port");
            let outcome = self.terminator.terminate(handle.pid).await;
            log_outcome(&handle, &outcome);
            freed &= outcome.success;
        }
        freed
    }

    /// Read the host's lineage once for the current sweep.
    async fn protected(&self) -> Protected {
        Protected::new(self.matcher.lineage().await)
    }
}

fn log_outcome(handle: &ProcessHandle, outcome: &TerminationOutcome) {
    let pid = handle.pid;
    let label = handle.label.as_str();
    match outcome.reason {
        TerminationReason::Terminated => info!(pid = pid, label = label, "Killed orphaned process"),
        TerminationReason::AlreadyDead => info!(pid = pid, label = label, "Process already dead"),
        TerminationReason::PermissionDenied => {
            warn!(pid = pid, label = label, "Permission denied killing process")
        }
        TerminationReason::Failed => {
            warn!(pid = pid, label = label, "Process still running after forced kill")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{PortScanner, ProcessMatcher};
    use crate::application::mock::{Behavior, FailingLookup, FailingTable, MockHost};
    use crate::ports::Signal;

    fn reconciler(host: &MockHost, watch: WatchList) -> Reconciler<MockHost, MockHost, MockHost> {
        Reconciler::new(host.clone(), host.clone(), host.clone(), Arc::new(watch))
            .with_grace_periods(Duration::ZERO, Duration::ZERO)
    }

    fn watching(patterns: &[&str], ports: &[u16]) -> WatchList {
        let watch = WatchList::new();
        for pattern in patterns {
            watch.register_pattern(pattern);
        }
        for port in ports {
            watch.register_port(*port);
        }
        watch
    }

    #[tokio::test]
    async fn test_sweep_kills_every_pattern_match() {
        let host = MockHost::new();
        host.spawn(1001, "node /srv/mcp-server/a.js", None, Behavior::Cooperative);
        host.spawn(1002, "python -m mcp-server", None, Behavior::IgnoresGraceful);
        host.spawn(1003, "vim notes.txt", None, Behavior::Cooperative);

        let r = reconciler(&host, watching(&["mcp-server"], &[]));

        assert_eq!(r.cleanup_orphaned_processes().await, 2);
        assert!(!host.is_alive(1001));
        assert!(!host.is_alive(1002));
        assert!(host.is_alive(1003));
    }

    #[tokio::test]
    async fn test_process_matched_twice_is_counted_once() {
        let host = MockHost::new();
        host.spawn(2001, "node mcp-server.js --port 3002", Some(3002), Behavior::Cooperative);

        let r = reconciler(&host, watching(&["mcp-server", "node"], &[3002]));
        let report = r.sweep().await;

        assert_eq!(report.total, 1);
        assert_eq!(report.killed, 1);
        assert_eq!(report.entries[0].handle.label, "mcp-server");
        assert_eq!(host.sent(), vec![(2001, Signal::Graceful)]);
    }

    #[tokio::test]
    async fn test_sweep_tolerates_partial_failure() {
        let host = MockHost::new();
        host.spawn(3001, "mcp-server a", None, Behavior::Denied);
        host.spawn(3002, "mcp-server b", None, Behavior::Unkillable);
        host.spawn(3003, "mcp-server c", None, Behavior::Cooperative);

        let r = reconciler(&host, watching(&["mcp-server"], &[]));
        let report = r.sweep().await;

        assert_eq!(report.total, 3);
        assert_eq!(report.killed, 1);
        let reasons: Vec<TerminationReason> =
            report.entries.iter().map(|e| e.outcome.reason).collect();
        assert_eq!(
            reasons,
            vec![
                TerminationReason::PermissionDenied,
                TerminationReason::Failed,
                TerminationReason::Terminated,
            ]
        );
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_to_do() {
        let host = MockHost::new();
        let r = reconciler(&host, watching(&["mcp-server"], &[3002]));

        assert_eq!(r.cleanup_orphaned_processes().await, 0);
        assert!(host.sent().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_never_targets_self() {
        let host = MockHost::new();
        let me = std::process::id();
        host.spawn(me, "test-binary mcp-server", None, Behavior::Cooperative);
        host.spawn(1, "/sbin/init mcp-server", None, Behavior::Cooperative);

        let r = reconciler(&host, watching(&["mcp-server"], &[]));

        assert!(r.discover().await.is_empty());
        assert_eq!(r.cleanup_orphaned_processes().await, 0);
        assert!(host.sent().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_spares_launching_processes() {
        let host = MockHost::new();
        host.spawn(850, "npm run mcp-server", None, Behavior::Cooperative);
        host.spawn(900, "sh -c orphan-reaper sweep --pattern mcp-server", None, Behavior::Cooperative);
        host.spawn(901, "node mcp-server.js --stdio", None, Behavior::Cooperative);
        host.set_lineage(&[900, 850, 1]);

        let r = reconciler(&host, watching(&["mcp-server"], &[]));
        let found: Vec<u32> = r.discover().await.iter().map(|h| h.pid).collect();
        assert_eq!(found, vec![901]);

        let report = r.sweep().await;
        assert_eq!(report.total, 1);
        assert_eq!(report.killed, 1);
        assert!(host.is_alive(850));
        assert!(host.is_alive(900));
        assert_eq!(host.sent(), vec![(901, Signal::Graceful)]);
    }

    #[tokio::test]
    async fn test_free_port_refuses_ancestor() {
        let host = MockHost::new();
        host.spawn(950, "cargo run -- serve", Some(3002), Behavior::Cooperative);
        host.set_lineage(&[950]);

        let r = reconciler(&host, WatchList::new());

        assert!(!r.free_port(3002).await);
        assert!(host.is_alive(950));
        assert!(host.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_enumeration_still_sweeps_ports() {
        let host = MockHost::new();
        host.spawn(1101, "mcp-server --port 3002", Some(3002), Behavior::Cooperative);
        host.spawn(1102, "mcp-server --stdio", None, Behavior::Cooperative);

        let r = Reconciler::new(
            ProcessMatcher::with_table(FailingTable),
            host.clone(),
            host.clone(),
            Arc::new(watching(&["mcp-server"], &[3002])),
        )
        .with_grace_periods(Duration::ZERO, Duration::ZERO);

        let report = r.sweep().await;
        assert_eq!(report.total, 1);
        assert_eq!(report.killed, 1);
        assert_eq!(report.entries[0].handle, ProcessHandle::from_port(1101, 3002));
        assert!(!host.is_alive(1101));
        assert!(host.is_alive(1102));
    }

    #[tokio::test]
    async fn test_failed_port_lookup_still_sweeps_patterns() {
        let host = MockHost::new();
        host.spawn(1201, "mcp-server --port 3002", Some(3002), Behavior::IgnoresGraceful);

        let r = Reconciler::new(
            host.clone(),
            PortScanner::with_lookup(FailingLookup),
            host.clone(),
            Arc::new(watching(&["mcp-server"], &[3002])),
        )
        .with_grace_periods(Duration::ZERO, Duration::ZERO);

        assert_eq!(r.cleanup_orphaned_processes().await, 1);
        assert!(!host.is_alive(1201));
        assert_eq!(host.sent(), vec![(1201, Signal::Graceful), (1201, Signal::Forced)]);

        // Nothing found is nothing to free
        assert!(r.free_port(3002).await);
    }

    #[tokio::test]
    async fn test_free_port_twice() {
        let host = MockHost::new();
        host.spawn(4001, "node server.js", Some(3002), Behavior::Cooperative);

        let r = reconciler(&host, watching(&[], &[3002]));

        assert!(r.free_port(3002).await);
        assert!(!host.is_alive(4001));
        assert_eq!(host.sent().len(), 1);

        assert!(r.free_port(3002).await);
        assert_eq!(host.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_free_port_without_listener_sends_nothing() {
        let host = MockHost::new();
        let r = reconciler(&host, WatchList::new());

        assert!(r.free_port(9999).await);
        assert!(host.sent().is_empty());
        assert_eq!(host.lookups(), vec![9999]);
    }

    #[tokio::test]
    async fn test_free_port_reports_failure() {
        let host = MockHost::new();
        host.spawn(5001, "sshd", Some(2222), Behavior::Denied);

        let r = reconciler(&host, WatchList::new());

        assert!(!r.free_port(2222).await);
        assert!(host.is_alive(5001));
    }

    #[tokio::test]
    async fn test_free_port_refuses_own_process() {
        let host = MockHost::new();
        host.spawn(std::process::id(), "test-binary", Some(4444), Behavior::Cooperative);

        let r = reconciler(&host, WatchList::new());

        assert!(!r.free_port(4444).await);
        assert!(host.sent().is_empty());
    }

    #[tokio::test]
    async fn test_registration_is_idempotent_across_sweeps() {
        let host = MockHost::new();
        host.spawn(6001, "worker --queue", Some(7000), Behavior::Cooperative);

        let r = reconciler(&host, WatchList::new());
        r.register_port(7000);
        r.register_port(7000);
        r.register_pattern("worker");
        r.register_pattern("worker");

        assert_eq!(r.watch_list().ports(), vec![7000]);
        assert_eq!(r.watch_list().patterns(), vec!["worker".to_string()]);

        assert_eq!(r.cleanup_orphaned_processes().await, 1);
        assert_eq!(host.lookups(), vec![7000]);
    }

    #[tokio::test]
    async fn test_registration_reaches_next_sweep() {
        let host = MockHost::new();
        host.spawn(7001, "custom-daemon", None, Behavior::Cooperative);

        let r = reconciler(&host, WatchList::new());
        assert_eq!(r.cleanup_orphaned_processes().await, 0);

        r.register_pattern("custom-daemon");
        assert_eq!(r.cleanup_orphaned_processes().await, 1);
    }
}
