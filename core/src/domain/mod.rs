//! Domain layer - Pure data models for a sweep.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod handle;
mod outcome;
mod watched;

// Re-export all domain types
pub use handle::{merge, ProcessHandle, ProcessHandleSet};
pub use outcome::{SweepEntry, SweepReport, TerminationOutcome, TerminationReason};
pub use watched::{WatchList, WatchSnapshot, DEFAULT_PATTERNS, DEFAULT_PORTS};
