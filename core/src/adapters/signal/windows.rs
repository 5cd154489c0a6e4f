//! Windows termination via `taskkill` and liveness via `OpenProcess`.

use tracing::debug;
use windows::Win32::Foundation::{CloseHandle, ERROR_ACCESS_DENIED, STILL_ACTIVE};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
};

use crate::adapters::command;
use crate::ports::{Liveness, Signal, SignalError, SignalPort};

/// Windows signal sender.
///
/// - Graceful: `taskkill /PID xxx` (sends WM_CLOSE)
/// - Forced: `taskkill /PID xxx /F` (TerminateProcess)
/// - Probe: `OpenProcess` + `GetExitCodeProcess`
#[derive(Debug, Default)]
pub struct WindowsSignals;

impl WindowsSignals {
    pub fn new() -> Self {
        Self
    }
}

/// Classify taskkill's combined stdout/stderr.
///
/// "Access is denied" maps to a permission failure; anything unrecognised,
/// including console apps refusing a non-forced taskkill, is generic.
fn classify(pid: u32, output: &str) -> SignalError {
    if output.contains("not found") || output.contains("could not be found") {
        return SignalError::NoSuchProcess(pid);
    }

    if output.contains("Access is denied") || output.contains("access denied") {
        return SignalError::PermissionDenied(pid);
    }

    SignalError::Other {
        pid,
        reason: output.trim().to_string(),
    }
}

impl SignalPort for WindowsSignals {
    async fn send(&self, pid: u32, signal: Signal) -> Result<(), SignalError> {
        let pid_arg = pid.to_string();
        let mut args = vec!["/PID", pid_arg.as_str()];
        if signal == Signal::Forced {
            args.push("/F");
        }

        debug!(pid = pid, signal = ?signal, "Executing taskkill");
        let output = command::run("taskkill", &args)
            .await
            .map_err(|e| SignalError::Other {
                pid,
                reason: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let combined = format!(
            "{} {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        Err(classify(pid, &combined))
    }

    async fn probe(&self, pid: u32) -> Liveness {
        let liveness = unsafe {
            match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
                Ok(handle) => {
                    let mut code = 0u32;
                    let result = GetExitCodeProcess(handle, &mut code);
                    let _ = CloseHandle(handle);
                    match result {
                        Ok(()) if code == STILL_ACTIVE.0 as u32 => Liveness::Alive,
                        Ok(()) => Liveness::Dead,
                        Err(_) => Liveness::Unknown,
                    }
                }
                // Exists, but we may not query it
                Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => Liveness::Alive,
                // ERROR_INVALID_PARAMETER: no process with this PID
                Err(_) => Liveness::Dead,
            }
        };
        debug!(pid = pid, liveness = ?liveness, "Process liveness probe");
        liveness
    }
}
