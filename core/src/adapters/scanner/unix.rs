//! POSIX port lookup using lsof, with an ss fallback on Linux.

use tracing::debug;

use crate::adapters::command;
use crate::error::{Error, Result};

use super::utils::Utils;
use super::ListenerLookup;

#[cfg(target_os = "macos")]
const LSOF: &str = "/usr/sbin/lsof";

#[cfg(not(target_os = "macos"))]
const LSOF: &str = "lsof";

/// Resolves listening ports with `lsof -nP -t -iTCP:<port> -sTCP:LISTEN`.
///
/// Flags:
/// - -nP: no host or service name resolution
/// - -t: terse output (PIDs only)
/// - -iTCP:<port> -sTCP:LISTEN: listening TCP sockets on that port
#[derive(Debug, Default)]
pub struct UnixLookup;

impl UnixLookup {
    pub fn new() -> Self {
        Self
    }

    async fn lsof(&self, port: u16) -> Result<Vec<u32>> {
        let filter = format!("-iTCP:{}", port);
        let output = command::run(LSOF, &["-nP", "-t", &filter, "-sTCP:LISTEN"]).await?;

        // lsof returns exit code 1 when no processes found, which is not an error
        if !output.status.success() && !output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::CommandFailed(format!("lsof failed: {}", stderr.trim())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Utils::parse_pid_lines(&stdout))
    }

    #[cfg(target_os = "linux")]
    async fn ss(&self, port: u16) -> Result<Vec<u32>> {
        let output = command::run("ss", &["-Htlnp"]).await?;

        if !output.status.success() {
            return Err(Error::CommandFailed(format!(
                "ss failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Utils::parse_ss_output(&stdout, port)
    }
}

impl ListenerLookup for UnixLookup {
    async fn listening_pids(&self, port: u16) -> Result<Vec<u32>> {
        match self.lsof(port).await {
            #[cfg(target_os = "linux")]
            Err(e) if command::is_missing_tool(&e) => {
                debug!(port = port, "lsof not installed, falling back to ss");
                self.ss(port).await
            }
            Err(e) if command::is_missing_tool(&e) => {
                debug!(port = port, "lsof not installed");
                Ok(Vec::new())
            }
            result => result,
        }
    }
}
