//! Termination outcomes and the sweep-level report.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::handle::ProcessHandle;

/// Why a termination attempt ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The process was running and is gone after our signals.
    Terminated,
    /// The process was already gone when the graceful signal was sent.
    AlreadyDead,
    /// The OS refused to deliver a signal to the process.
    PermissionDenied,
    /// The process survived the forced signal.
    Failed,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Terminated => "terminated",
            TerminationReason::AlreadyDead => "already_dead",
            TerminationReason::PermissionDenied => "permission_denied",
            TerminationReason::Failed => "failed",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of terminating a single process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationOutcome {
    /// Whether the process is known not to be running afterwards.
    pub success: bool,
    pub reason: TerminationReason,
}

impl TerminationOutcome {
    pub fn terminated() -> Self {
        Self {
            success: true,
            reason: TerminationReason::Terminated,
        }
    }

    pub fn already_dead() -> Self {
        Self {
            success: true,
            reason: TerminationReason::AlreadyDead,
        }
    }

    pub fn permission_denied() -> Self {
        Self {
            success: false,
            reason: TerminationReason::PermissionDenied,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            reason: TerminationReason::Failed,
        }
    }
}

/// One handle and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub handle: ProcessHandle,
    pub outcome: TerminationOutcome,
}

/// Aggregate result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Per-process outcomes, in termination order.
    pub entries: Vec<SweepEntry>,
    /// Number of successful outcomes, `already_dead` included.
    pub killed: usize,
    /// Number of distinct processes found.
    pub total: usize,
}

impl SweepReport {
    pub fn push(&mut self, handle: ProcessHandle, outcome: TerminationOutcome) {
        self.total += 1;
        if outcome.success {
            self.killed += 1;
        }
        self.entries.push(SweepEntry { handle, outcome });
    }

    /// Entries whose termination did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &SweepEntry> {
        self.entries.iter().filter(|e| !e.outcome.success)
    }

    pub fn all_succeeded(&self) -> bool {
        self.killed == self.total
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.killed, self.total)
    }
}
