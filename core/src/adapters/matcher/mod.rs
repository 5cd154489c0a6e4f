//! Process matcher adapters.
//!
//! Enumeration of the process table is platform-specific; matching command
//! lines against watched patterns is not.

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(not(any(unix, windows)))]
compile_error!("Unsupported platform: only POSIX-like and Windows hosts are supported");

use std::collections::HashMap;

#[cfg(unix)]
use unix::parent_pid;

#[cfg(windows)]
use windows::parent_pid;

use tracing::{debug, warn};

use crate::domain::ProcessHandle;
use crate::error::Result;
use crate::ports::ProcessMatcherPort;

/// One row of the host process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Parent PID, 0 when the platform reports none.
    pub ppid: u32,
    pub command: String,
}

/// A source of process table rows.
pub trait ProcessTable: Send + Sync {
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<ProcessEntry>>> + Send;
}

/// The process table reader for the current platform.
#[cfg(unix)]
pub type PlatformProcessTable = unix::PsProcessTable;

/// The process table reader for the current platform.
#[cfg(windows)]
pub type PlatformProcessTable = windows::CimProcessTable;

/// Matches watched patterns against a [`ProcessTable`].
pub struct ProcessMatcher<T = PlatformProcessTable> {
    inner: T,
}

impl ProcessMatcher {
    /// Create a matcher for the current platform.
    pub fn new() -> Self {
        Self::with_table(PlatformProcessTable::new())
    }
}

impl<T: ProcessTable> ProcessMatcher<T> {
    /// Create a matcher reading from `table`.
    pub fn with_table(table: T) -> Self {
        Self { inner: table }
    }
}

impl Default for ProcessMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ProcessTable> ProcessMatcherPort for ProcessMatcher<T> {
    async fn find_by_pattern(&self, patterns: &[String]) -> Vec<ProcessHandle> {
        if patterns.is_empty() {
            return Vec::new();
        }

        let entries = match self.inner.list().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Process enumeration failed, treating as no matches");
                return Vec::new();
            }
        };

        let handles = match_patterns(&entries, patterns, std::process::id());
        debug!(
            processes = entries.len(),
            matches = handles.len(),
            "Matched process table against watch patterns"
        );
        handles
    }

    async fn lineage(&self) -> Vec<u32> {
        let me = std::process::id();
        let mut chain = match self.inner.list().await {
            Ok(entries) => ancestors(&entries, me),
            Err(e) => {
                warn!(error = %e, "Process enumeration failed, only the direct parent is known");
                Vec::new()
            }
        };

        if let Some(parent) = parent_pid() {
            if !chain.contains(&parent) {
                chain.insert(0, parent);
            }
        }
        debug!(pid = me, ancestors = ?chain, "Resolved host lineage");
        chain
    }
}

/// Match each pattern independently against every command line.
///
/// `self_pid` is skipped so the host never matches itself.
pub fn match_patterns(
    entries: &[ProcessEntry],
    patterns: &[String],
    self_pid: u32,
) -> Vec<ProcessHandle> {
    let mut handles = Vec::new();
    for pattern in patterns {
        if pattern.is_empty() {
            continue;
        }
        for entry in entries {
            if entry.pid != self_pid && entry.command.contains(pattern.as_str()) {
                handles.push(ProcessHandle::from_pattern(entry.pid, pattern));
            }
        }
    }
    handles
}

/// Walk the parent chain of `pid` through `entries`, nearest parent first.
///
/// Stops at PID 0, at a PID missing from the table, or on a loop (Windows
/// keeps reporting a parent PID after the parent exits and the PID is reused).
pub fn ancestors(entries: &[ProcessEntry], pid: u32) -> Vec<u32> {
    let parents: HashMap<u32, u32> = entries.iter().map(|e| (e.pid, e.ppid)).collect();

    let mut chain = Vec::new();
    let mut current = pid;
    while let Some(&parent) = parents.get(&current) {
        if parent == 0 || parent == pid || chain.contains(&parent) {
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}

/// Parse `ps -A -ww -o pid= -o ppid= -o args=` output.
///
/// Each line is a right-aligned PID and parent PID followed by the full
/// command line, which may be empty.
pub fn parse_ps_output(output: &str) -> Vec<ProcessEntry> {
    let mut entries = Vec::new();

    for line in output.lines() {
        let mut rest = line.trim_start();
        let mut next_number = || -> Option<u32> {
            let (field, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            rest = tail.trim_start();
            field.parse().ok()
        };

        let (pid, ppid) = match (next_number(), next_number()) {
            (Some(pid), Some(ppid)) => (pid, ppid),
            _ => continue,
        };

        entries.push(ProcessEntry {
            pid,
            ppid,
            command: rest.trim_end().to_string(),
        });
    }

    entries
}

/// Parse tab-separated `ProcessId<TAB>ParentProcessId<TAB>CommandLine` rows
/// from the CIM query.
///
/// Processes without an accessible command line are kept with an empty one
/// so the parent chain stays intact.
pub fn parse_cim_output(output: &str) -> Vec<ProcessEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, '\t');
            let pid: u32 = fields.next()?.trim().parse().ok()?;
            let ppid: u32 = fields.next()?.trim().parse().ok()?;
            let command = fields.next().unwrap_or("").trim();
            Some(ProcessEntry {
                pid,
                ppid,
                command: command.to_string(),
            })
        })
        .collect()
}
