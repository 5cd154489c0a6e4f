//! Watched patterns and ports.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Command-line fragments watched out of the box.
pub const DEFAULT_PATTERNS: &[&str] = &["mcp-server"];

/// TCP ports watched out of the box.
pub const DEFAULT_PORTS: &[u16] = &[3002];

/// Point-in-time copy of the watched sets, taken at the start of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSnapshot {
    pub patterns: Vec<String>,
    pub ports: Vec<u16>,
}

/// Append-only sets of watched patterns and ports.
///
/// Values are kept in registration order with no duplicates. Nothing is
/// ever removed; a sweep reads a snapshot, so registrations made while it
/// runs only affect the next one.
#[derive(Debug, Default)]
pub struct WatchList {
    inner: RwLock<WatchSnapshot>,
}

impl WatchList {
    /// An empty watch list.
    pub fn new() -> Self {
        Self::default()
    }

    /// A watch list seeded with [`DEFAULT_PATTERNS`] and [`DEFAULT_PORTS`].
    pub fn with_defaults() -> Self {
        let list = Self::new();
        for pattern in DEFAULT_PATTERNS {
            list.register_pattern(pattern);
        }
        for port in DEFAULT_PORTS {
            list.register_port(*port);
        }
        list
    }

    /// Add a command-line pattern.
    ///
    /// Returns `true` if the pattern was not already watched. Blank patterns
    /// would match every process on the host and are ignored.
    pub fn register_pattern(&self, pattern: &str) -> bool {
        if pattern.trim().is_empty() {
            warn!("Ignoring blank watch pattern");
            return false;
        }

        let mut inner = self.inner.write();
        if inner.patterns.iter().any(|p| p == pattern) {
            return false;
        }
        debug!(pattern = pattern, "Registered watch pattern");
        inner.patterns.push(pattern.to_string());
        true
    }

    /// Add a TCP port.
    ///
    /// Returns `true` if the port was not already watched. Port 0 is ignored.
    pub fn register_port(&self, port: u16) -> bool {
        if port == 0 {
            warn!("Ignoring watch registration for port 0");
            return false;
        }

        let mut inner = self.inner.write();
        if inner.ports.contains(&port) {
            return false;
        }
        debug!(port = port, "Registered watch port");
        inner.ports.push(port);
        true
    }

    pub fn patterns(&self) -> Vec<String> {
        self.inner.read().patterns.clone()
    }

    pub fn ports(&self) -> Vec<u16> {
        self.inner.read().ports.clone()
    }

    pub fn snapshot(&self) -> WatchSnapshot {
        self.inner.read().clone()
    }
}
