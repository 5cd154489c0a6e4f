//! In-memory host used by the application-layer tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::adapters::matcher::{ProcessEntry, ProcessTable};
use crate::adapters::scanner::ListenerLookup;
use crate::domain::ProcessHandle;
use crate::error::{self, Error};
use crate::ports::{
    Liveness, PortLookupPort, ProcessMatcherPort, Signal, SignalError, SignalPort,
};

/// How a fake process reacts to signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Exits on the graceful signal.
    Cooperative,
    /// Accepts the graceful signal but keeps running; dies on the forced one.
    IgnoresGraceful,
    /// Graceful delivery fails outright; dies on the forced one.
    RefusesGraceful,
    /// Survives everything.
    Unkillable,
    /// Every signal is refused with a permission error.
    Denied,
    /// Signals are delivered but liveness can never be determined.
    Opaque,
}

#[derive(Debug, Clone)]
struct FakeProcess {
    command: String,
    port: Option<u16>,
    behavior: Behavior,
}

#[derive(Debug, Default)]
struct HostState {
    processes: BTreeMap<u32, FakeProcess>,
    sent: Vec<(u32, Signal)>,
    lookups: Vec<u16>,
    lineage: Vec<u32>,
}

/// Fake process table, port table and signal sink sharing one state.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self, pid: u32, command: &str, port: Option<u16>, behavior: Behavior) {
        self.state.lock().processes.insert(
            pid,
            FakeProcess {
                command: command.to_string(),
                port,
                behavior,
            },
        );
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.state.lock().processes.contains_key(&pid)
    }

    /// Declare the host's ancestors, nearest parent first.
    pub fn set_lineage(&self, ancestors: &[u32]) {
        self.state.lock().lineage = ancestors.to_vec();
    }

    /// Every signal sent so far, in order.
    pub fn sent(&self) -> Vec<(u32, Signal)> {
        self.state.lock().sent.clone()
    }

    /// Every port looked up so far, in order.
    pub fn lookups(&self) -> Vec<u16> {
        self.state.lock().lookups.clone()
    }
}

impl ProcessMatcherPort for MockHost {
    async fn find_by_pattern(&self, patterns: &[String]) -> Vec<ProcessHandle> {
        let state = self.state.lock();
        let mut handles = Vec::new();
        for pattern in patterns {
            for (pid, process) in &state.processes {
                if process.command.contains(pattern.as_str()) {
                    handles.push(ProcessHandle::from_pattern(*pid, pattern));
                }
            }
        }
        handles
    }

    async fn lineage(&self) -> Vec<u32> {
        self.state.lock().lineage.clone()
    }
}

impl PortLookupPort for MockHost {
    async fn find_listeners(&self, port: u16) -> Vec<ProcessHandle> {
        let mut state = self.state.lock();
        state.lookups.push(port);
        state
            .processes
            .iter()
            .filter(|(_, process)| process.port == Some(port))
            .map(|(pid, _)| ProcessHandle::from_port(*pid, port))
            .collect()
    }
}

impl SignalPort for MockHost {
    async fn send(&self, pid: u32, signal: Signal) -> Result<(), SignalError> {
        let mut state = self.state.lock();
        state.sent.push((pid, signal));

        let behavior = match state.processes.get(&pid) {
            Some(process) => process.behavior,
            None => return Err(SignalError::NoSuchProcess(pid)),
        };

        let dies = match (behavior, signal) {
            (Behavior::Denied, _) => return Err(SignalError::PermissionDenied(pid)),
            (Behavior::RefusesGraceful, Signal::Graceful) => {
                return Err(SignalError::Other {
                    pid,
                    reason: "can only be terminated forcefully".to_string(),
                })
            }
            (Behavior::Cooperative, _) => true,
            (Behavior::IgnoresGraceful | Behavior::RefusesGraceful, Signal::Forced) => true,
            _ => false,
        };

        if dies {
            state.processes.remove(&pid);
        }
        Ok(())
    }

    async fn probe(&self, pid: u32) -> Liveness {
        match self.state.lock().processes.get(&pid) {
            Some(process) if process.behavior == Behavior::Opaque => Liveness::Unknown,
            Some(_) => Liveness::Alive,
            None => Liveness::Dead,
        }
    }
}

/// A process table whose enumeration always fails.
pub struct FailingTable;

impl ProcessTable for FailingTable {
    async fn list(&self) -> error::Result<Vec<ProcessEntry>> {
        Err(Error::CommandFailed("ps failed with status: 1".to_string()))
    }
}

/// A port lookup that always fails.
pub struct FailingLookup;

impl ListenerLookup for FailingLookup {
    async fn listening_pids(&self, _port: u16) -> error::Result<Vec<u32>> {
        Err(Error::CommandFailed("lsof failed: no such device".to_string()))
    }
}
