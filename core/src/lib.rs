//! Orphan Reaper Core Library
//!
//! Finds and terminates subprocesses left behind by earlier runs of a host
//! application, together with the TCP ports they still hold.
//! Provides functionality to:
//! - Match processes by literal command-line substrings
//! - Resolve listening TCP ports to their processes
//! - Terminate processes with verified SIGTERM → SIGKILL escalation
//! - Sweep everything registered in a process-wide watch list
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Handles, outcomes and the watch list
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: OS implementations
//! - `application`: Terminator and reconciler
//!
//! # Platform Support
//! - Linux: `ps`, `lsof` (falling back to `ss`), `kill(2)`
//! - macOS: `ps`, `lsof`, `kill(2)`
//! - Windows: CIM `Win32_Process`, `netstat`, `taskkill`, `OpenProcess`
//!
//! # Example
//!
//! ```no_run
//! # async fn example() {
//! orphan_reaper_core::register_port(8123);
//! let killed = orphan_reaper_core::cleanup_orphaned_processes().await;
//! println!("cleaned up {killed} orphaned processes");
//! # }
//! ```

// Hexagonal architecture layers
pub mod domain;
pub mod ports;
pub mod adapters;
pub mod application;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    merge, ProcessHandle, ProcessHandleSet, SweepEntry, SweepReport, TerminationOutcome,
    TerminationReason, WatchList, WatchSnapshot,
};

// Re-export other commonly used types
pub use adapters::{PortScanner, ProcessMatcher, SignalSender};
pub use application::{
    cleanup_orphaned_processes, free_port, global_watch_list, register_pattern, register_port,
    PlatformReconciler, Reconciler, Terminator,
};
pub use config::{ConfigStore, ReconcilerConfig};
pub use error::{Error, Result};
pub use ports::{Liveness, PortLookupPort, ProcessMatcherPort, Signal, SignalError, SignalPort};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
