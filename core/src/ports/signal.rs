//! Signal delivery port (interface).

use thiserror::Error;

/// Which termination request to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Cooperative termination request (SIGTERM, `taskkill`).
    Graceful,
    /// Unconditional termination (SIGKILL, `taskkill /F`).
    Forced,
}

/// Result of a zero-effect existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Liveness {
    Alive,
    Dead,
    /// The check itself failed; the process may or may not exist.
    Unknown,
}

/// Why a signal could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// No process with this PID exists.
    #[error("Process with PID {0} not found")]
    NoSuchProcess(u32),

    /// The OS refused to signal this process.
    #[error("Permission denied to signal process {0}")]
    PermissionDenied(u32),

    /// Any other delivery failure.
    #[error("Failed to signal process {pid}: {reason}")]
    Other { pid: u32, reason: String },
}

/// Port for signalling processes and probing their liveness.
///
/// Mapping platform error codes onto [`SignalError`] is the adapter's job;
/// the terminator only sees the classified result.
pub trait SignalPort: Send + Sync {
    /// Deliver `signal` to `pid`.
    fn send(
        &self,
        pid: u32,
        signal: Signal,
    ) -> impl std::future::Future<Output = Result<(), SignalError>> + Send;

    /// Check whether `pid` still exists without affecting it.
    fn probe(&self, pid: u32) -> impl std::future::Future<Output = Liveness> + Send;
}
