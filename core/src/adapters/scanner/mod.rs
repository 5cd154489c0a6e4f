//! Port lookup adapters.
//!
//! Platform-specific resolution of a listening TCP port to the processes
//! bound to it.

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

mod utils;

pub use utils::Utils;

use tracing::{debug, warn};

use crate::domain::ProcessHandle;
use crate::error::Result;
use crate::ports::PortLookupPort;

/// A platform-specific resolver from a TCP port to its listening PIDs.
pub trait ListenerLookup: Send + Sync {
    fn listening_pids(&self, port: u16)
        -> impl std::future::Future<Output = Result<Vec<u32>>> + Send;
}

/// The listener lookup for the current platform.
#[cfg(unix)]
pub type PlatformLookup = unix::UnixLookup;

/// The listener lookup for the current platform.
#[cfg(windows)]
pub type PlatformLookup = windows::NetstatLookup;

/// The main port scanner that uses platform-specific implementations.
pub struct PortScanner<L = PlatformLookup> {
    inner: L,
}

impl PortScanner {
    /// Create a new port scanner for the current platform.
    pub fn new() -> Self {
        Self::with_lookup(PlatformLookup::new())
    }
}

impl<L: ListenerLookup> PortScanner<L> {
    /// Create a port scanner backed by `lookup`.
    pub fn with_lookup(lookup: L) -> Self {
        Self { inner: lookup }
    }

    /// PIDs listening on `port`, deduplicated, in lookup order.
    pub async fn pids_on_port(&self, port: u16) -> Result<Vec<u32>> {
        let mut pids = self.inner.listening_pids(port).await?;
        let mut seen = std::collections::HashSet::new();
        pids.retain(|pid| seen.insert(*pid));
        Ok(pids)
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ListenerLookup> PortLookupPort for PortScanner<L> {
    async fn find_listeners(&self, port: u16) -> Vec<ProcessHandle> {
        match self.pids_on_port(port).await {
            Ok(pids) => {
                debug!(port = port, listeners = pids.len(), "Port lookup complete");
                pids.into_iter()
                    .map(|pid| ProcessHandle::from_port(pid, port))
                    .collect()
            }
            Err(e) => {
                warn!(port = port, error = %e, "Port lookup failed, treating as no listener");
                Vec::new()
            }
        }
    }
}
