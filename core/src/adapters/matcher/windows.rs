//! Windows process enumeration using a CIM query.

use crate::error::{Error, Result};

use crate::adapters::command;
use super::{parse_cim_output, ProcessEntry, ProcessTable};

/// PowerShell pipeline printing `ProcessId<TAB>ParentProcessId<TAB>CommandLine`
/// per process.
const CIM_QUERY: &str = "Get-CimInstance Win32_Process | ForEach-Object { \"$($_.ProcessId)`t$($_.ParentProcessId)`t$($_.CommandLine)\" }";

/// Reads the process table from `Win32_Process`.
///
/// `tasklist` only reports image names, so the full command line comes from
/// CIM instead.
#[derive(Debug, Default)]
pub struct CimProcessTable;

impl CimProcessTable {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessTable for CimProcessTable {
    async fn list(&self) -> Result<Vec<ProcessEntry>> {
        let output = command::run(
            "powershell",
            &["-NoProfile", "-NonInteractive", "-Command", CIM_QUERY],
        )
        .await?;

        if !output.status.success() {
            return Err(Error::CommandFailed(format!(
                "Get-CimInstance Win32_Process failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_cim_output(&stdout))
    }
}

/// Windows has no cheap parent lookup outside the process table.
pub(super) fn parent_pid() -> Option<u32> {
    None
}
