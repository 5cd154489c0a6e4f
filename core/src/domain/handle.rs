//! Discovered process handles and their per-sweep deduplication.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One process discovered during a sweep.
///
/// `label` records which pattern or port produced the match. It is shown to
/// the operator but never used to decide identity: two handles with the same
/// `pid` are the same process for the duration of the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessHandle {
    /// OS process identifier.
    pub pid: u32,
    /// The pattern or port that matched this process.
    pub label: String,
    /// The listening port, when discovered by port lookup.
    pub port: Option<u16>,
}

impl ProcessHandle {
    /// Handle produced by a command-line pattern match.
    pub fn from_pattern(pid: u32, pattern: &str) -> Self {
        Self {
            pid,
            label: pattern.to_string(),
            port: None,
        }
    }

    /// Handle produced by a listening-port lookup.
    pub fn from_port(pid: u32, port: u16) -> Self {
        Self {
            pid,
            label: format!("port {}", port),
            port: Some(port),
        }
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID {} ({})", self.pid, self.label)
    }
}

/// Handles keyed by process id, at most one per pid.
///
/// Iteration follows insertion order so that termination and its log lines
/// happen in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ProcessHandleSet {
    handles: Vec<ProcessHandle>,
    pids: HashSet<u32>,
}

impl ProcessHandleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a handle unless its pid is already present.
    ///
    /// Returns `true` if the handle was added. The first occurrence wins and
    /// keeps its label.
    pub fn insert(&mut self, handle: ProcessHandle) -> bool {
        if !self.pids.insert(handle.pid) {
            return false;
        }
        self.handles.push(handle);
        true
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.pids.contains(&pid)
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessHandle> {
        self.handles.iter().find(|h| h.pid == pid)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessHandle> {
        self.handles.iter()
    }

    /// Drop every handle for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&ProcessHandle) -> bool) {
        let pids = &mut self.pids;
        self.handles.retain(|h| {
            let kept = keep(h);
            if !kept {
                pids.remove(&h.pid);
            }
            kept
        });
    }
}

impl IntoIterator for ProcessHandleSet {
    type Item = ProcessHandle;
    type IntoIter = std::vec::IntoIter<ProcessHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProcessHandleSet {
    type Item = &'a ProcessHandle;
    type IntoIter = std::slice::Iter<'a, ProcessHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter()
    }
}

impl FromIterator<ProcessHandle> for ProcessHandleSet {
    fn from_iter<I: IntoIterator<Item = ProcessHandle>>(iter: I) -> Self {
        let mut set = Self::new();
        for handle in iter {
            set.insert(handle);
        }
        set
    }
}

/// Merge pattern matches and port matches into one set keyed by pid.
///
/// Pattern matches are walked first, then port matches.
pub fn merge(pattern_hits: Vec<ProcessHandle>, port_hits: Vec<ProcessHandle>) -> ProcessHandleSet {
    pattern_hits.into_iter().chain(port_hits).collect()
}
