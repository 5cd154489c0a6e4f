//! Signal escalation with verification.
//!
//! # Escalation Pattern
//!
//! 1. Send the graceful signal. "No such process" means the process is
//!    already dead, which is a success; a permission error is final.
//! 2. Wait the grace period, then probe liveness.
//! 3. If the process is gone it terminated cooperatively.
//! 4. Otherwise send the forced signal, wait the shorter forced grace
//!    period and probe again.
//! 5. Still alive after that is a failure (unkillable or zombie).

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::TerminationOutcome;
use crate::ports::{Liveness, Signal, SignalError, SignalPort};

/// Grace period between the graceful signal and the first probe (500ms)
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Grace period between the forced signal and the final probe (200ms)
pub const DEFAULT_FORCED_GRACE_PERIOD: Duration = Duration::from_millis(200);

/// Terminates one process at a time through a [`SignalPort`].
pub struct Terminator<S: SignalPort> {
    signals: S,
    grace_period: Duration,
    forced_grace_period: Duration,
}

impl<S: SignalPort> Terminator<S> {
    /// Create a terminator with the default grace periods.
    pub fn new(signals: S) -> Self {
        Self {
            signals,
            grace_period: DEFAULT_GRACE_PERIOD,
            forced_grace_period: DEFAULT_FORCED_GRACE_PERIOD,
        }
    }

    /// Override both grace periods.
    pub fn with_grace_periods(mut self, grace_period: Duration, forced_grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self.forced_grace_period = forced_grace_period;
        self
    }

    /// Terminate `pid` and report how it went.
    ///
    /// Never fails: every error is folded into the returned outcome.
    pub async fn terminate(&self, pid: u32) -> TerminationOutcome {
        debug!(pid = pid, "Attempting graceful termination");

        // Step 1: graceful signal
        match self.signals.send(pid, Signal::Graceful).await {
            Ok(()) => {
                debug!(pid = pid, "Graceful signal sent, waiting for process to exit");
            }
            Err(SignalError::NoSuchProcess(_)) => {
                debug!(pid = pid, "Process not found, already terminated");
                return TerminationOutcome::already_dead();
            }
            Err(SignalError::PermissionDenied(_)) => {
                debug!(pid = pid, "Permission denied for graceful signal");
                return TerminationOutcome::permission_denied();
            }
            Err(e) => {
                // Windows console apps refuse a non-forced taskkill
                warn!(pid = pid, error = %e, "Graceful signal failed, will escalate");
            }
        }

        // Step 2: grace period, then verify
        sleep(self.grace_period).await;
        match self.signals.probe(pid).await {
            Liveness::Dead => {
                debug!(pid = pid, "Process exited after graceful signal");
                return TerminationOutcome::terminated();
            }
            Liveness::Alive => {
                debug!(pid = pid, "Process still running, sending forced signal");
            }
            Liveness::Unknown => {
                debug!(pid = pid, "Liveness unknown, sending forced signal");
            }
        }

        // Step 3: forced signal
        match self.signals.send(pid, Signal::Forced).await {
            Ok(()) => {}
            Err(SignalError::NoSuchProcess(_)) => {
                debug!(pid = pid, "Process exited before forced signal");
                return TerminationOutcome::terminated();
            }
            Err(SignalError::PermissionDenied(_)) => {
                debug!(pid = pid, "Permission denied for forced signal");
                return TerminationOutcome::permission_denied();
            }
            Err(e) => {
                warn!(pid = pid, error = %e, "Forced signal failed, verifying anyway");
            }
        }

        // Step 4: shorter grace period, then verify again
        sleep(self.forced_grace_period).await;
        match self.signals.probe(pid).await {
            Liveness::Dead => {
                debug!(pid = pid, "Process exited after forced signal");
                TerminationOutcome::terminated()
            }
            liveness => {
                debug!(pid = pid, liveness = ?liveness, "Process survived forced signal");
                TerminationOutcome::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::mock::{Behavior, MockHost};
    use crate::domain::TerminationReason;

    fn terminator(host: &MockHost) -> Terminator<MockHost> {
        Terminator::new(host.clone()).with_grace_periods(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_missing_process_is_already_dead() {
        let host = MockHost::new();
        let outcome = terminator(&host).terminate(4321).await;

        assert_eq!(outcome, TerminationOutcome::already_dead());
        assert_eq!(host.sent(), vec![(4321, Signal::Graceful)]);
    }

    #[tokio::test]
    async fn test_cooperative_process_never_sees_forced_signal() {
        let host = MockHost::new();
        host.spawn(100, "node mcp-server.js", None, Behavior::Cooperative);

        let outcome = terminator(&host).terminate(100).await;

        assert!(outcome.success);
        assert_eq!(outcome.reason, TerminationReason::Terminated);
        assert_eq!(host.sent(), vec![(100, Signal::Graceful)]);
    }

    #[tokio::test]
    async fn test_stubborn_process_dies_on_forced_signal() {
        let host = MockHost::new();
        host.spawn(101, "stubborn", None, Behavior::IgnoresGraceful);

        let outcome = terminator(&host).terminate(101).await;

        assert_eq!(outcome, TerminationOutcome::terminated());
        assert_eq!(
            host.sent(),
            vec![(101, Signal::Graceful), (101, Signal::Forced)]
        );
        assert!(!host.is_alive(101));
    }

    #[tokio::test]
    async fn test_unkillable_process_fails() {
        let host = MockHost::new();
        host.spawn(102, "zombie", None, Behavior::Unkillable);

        let outcome = terminator(&host).terminate(102).await;

        assert_eq!(outcome, TerminationOutcome::failed());
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_permission_denied_is_terminal() {
        let host = MockHost::new();
        host.spawn(103, "root-owned", None, Behavior::Denied);

        let outcome = terminator(&host).terminate(103).await;

        assert_eq!(outcome, TerminationOutcome::permission_denied());
        assert_eq!(host.sent(), vec![(103, Signal::Graceful)]);
    }

    #[tokio::test]
    async fn test_graceful_delivery_failure_escalates() {
        let host = MockHost::new();
        host.spawn(104, "console app", None, Behavior::RefusesGraceful);

        let outcome = terminator(&host).terminate(104).await;

        assert_eq!(outcome, TerminationOutcome::terminated());
        assert_eq!(
            host.sent(),
            vec![(104, Signal::Graceful), (104, Signal::Forced)]
        );
    }

    #[tokio::test]
    async fn test_unknown_liveness_escalates_then_fails() {
        let host = MockHost::new();
        host.spawn(105, "opaque", None, Behavior::Opaque);

        let outcome = terminator(&host).terminate(105).await;

        assert_eq!(outcome, TerminationOutcome::failed());
        assert_eq!(
            host.sent(),
            vec![(105, Signal::Graceful), (105, Signal::Forced)]
        );
    }

    #[tokio::test]
    async fn test_default_grace_periods() {
        let t = Terminator::new(MockHost::new());
        assert_eq!(t.grace_period, Duration::from_millis(500));
        assert_eq!(t.forced_grace_period, Duration::from_millis(200));
    }
}
