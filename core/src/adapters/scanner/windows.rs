//! Windows port lookup using netstat.

use crate::adapters::command;
use crate::error::{Error, Result};

use super::utils::Utils;
use super::ListenerLookup;

/// Resolves listening ports with `netstat -ano -p TCP`.
#[derive(Debug, Default)]
pub struct NetstatLookup;

impl NetstatLookup {
    pub fn new() -> Self {
        Self
    }
}

impl ListenerLookup for NetstatLookup {
    async fn listening_pids(&self, port: u16) -> Result<Vec<u32>> {
        let output = command::run("netstat", &["-ano", "-p", "TCP"])
            .await
            .map_err(|e| Error::CommandFailed(format!("netstat -ano: {}", e)))?;

        if !output.status.success() {
            return Err(Error::CommandFailed(format!(
                "netstat -ano failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Utils::parse_netstat_output(&stdout, port))
    }
}
