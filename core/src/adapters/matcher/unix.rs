//! POSIX process enumeration using `ps`.

use nix::unistd::getppid;

use crate::error::{Error, Result};

use crate::adapters::command;
use super::{parse_ps_output, ProcessEntry, ProcessTable};

/// Reads the process table with `ps -A -ww -o pid= -o ppid= -o args=`.
///
/// Flags:
/// - -A: every process, any user or terminal
/// - -ww: never truncate the command line
/// - `pid=`/`ppid=`/`args=`: PID, parent PID and full argument vector, no header row
#[derive(Debug, Default)]
pub struct PsProcessTable;

impl PsProcessTable {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessTable for PsProcessTable {
    async fn list(&self) -> Result<Vec<ProcessEntry>> {
        let output = command::run(
            "ps",
            &["-A", "-ww", "-o", "pid=", "-o", "ppid=", "-o", "args="],
        )
        .await?;

        if !output.status.success() {
            return Err(Error::CommandFailed(format!(
                "ps failed with status: {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_ps_output(&stdout))
    }
}

/// Parent of the current process, straight from `getppid(2)`.
pub(super) fn parent_pid() -> Option<u32> {
    u32::try_from(getppid().as_raw()).ok().filter(|pid| *pid > 0)
}
