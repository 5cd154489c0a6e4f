//! POSIX signal delivery via `kill(2)`.

use std::collections::HashSet;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal as NixSignal};
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;
use parking_lot::Mutex;
use tracing::debug;

use crate::ports::{Liveness, Signal, SignalError, SignalPort};

/// POSIX signal sender.
///
/// - Graceful: SIGTERM (15)
/// - Forced: SIGKILL (9)
/// - Probe: signal 0, which checks existence without delivering anything
///
/// A probed PID that has been sent SIGKILL through this sender is reaped
/// with a non-blocking `waitpid` first, since a dead child stays a zombie
/// (and answers signal 0) until reaped. A caller holding its own handle to
/// such a child loses that child's exit status. Children that only got
/// SIGTERM are never reaped here.
#[derive(Debug, Default)]
pub struct UnixSignals {
    forced: Mutex<HashSet<u32>>,
}

impl UnixSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert to a `Pid`, refusing values `kill(2)` would treat as a group.
    fn target(pid: u32) -> Result<Pid, SignalError> {
        match i32::try_from(pid) {
            Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
            _ => Err(SignalError::Other {
                pid,
                reason: "not a valid single-process PID".to_string(),
            }),
        }
    }
}

/// Map a `kill(2)` errno onto the terminator's classification.
///
/// EPERM is the only errno treated as a permission failure; EINVAL and
/// anything else are generic failures.
fn classify(pid: u32, errno: Errno) -> SignalError {
    match errno {
        Errno::ESRCH => SignalError::NoSuchProcess(pid),
        Errno::EPERM => SignalError::PermissionDenied(pid),
        other => SignalError::Other {
            pid,
            reason: other.desc().to_string(),
        },
    }
}

impl SignalPort for UnixSignals {
    async fn send(&self, pid: u32, signal: Signal) -> Result<(), SignalError> {
        let target = Self::target(pid)?;
        let sig = match signal {
            Signal::Graceful => NixSignal::SIGTERM,
            Signal::Forced => NixSignal::SIGKILL,
        };

        debug!(pid = pid, signal = sig.as_str(), "Sending signal to process");
        kill(target, sig).map_err(|errno| classify(pid, errno))?;

        if signal == Signal::Forced {
            self.forced.lock().insert(pid);
        }
        Ok(())
    }

    async fn probe(&self, pid: u32) -> Liveness {
        let target = match Self::target(pid) {
            Ok(target) => target,
            Err(_) => return Liveness::Unknown,
        };

        if self.forced.lock().contains(&pid) {
            // Fails with ECHILD for non-children
            let _ = waitpid(target, Some(WaitPidFlag::WNOHANG));
        }

        let liveness = match kill(target, None) {
            Ok(()) => Liveness::Alive,
            Err(Errno::ESRCH) => Liveness::Dead,
            // Exists, but belongs to someone else
            Err(Errno::EPERM) => Liveness::Alive,
            Err(_) => Liveness::Unknown,
        };
        if liveness == Liveness::Dead {
            self.forced.lock().remove(&pid);
        }
        debug!(pid = pid, liveness = ?liveness, "Process liveness probe");
        liveness
    }
}
