//! Adapters layer - OS implementations of the traits in `ports`.
//!
//! Each adapter shells out to the platform's standard tools or calls the
//! platform API directly, and degrades to an empty result when a tool is
//! unavailable.

mod command;
pub mod matcher;
pub mod scanner;
pub mod signal;

// Re-export main types for convenience
pub use matcher::ProcessMatcher;
pub use scanner::PortScanner;
pub use signal::SignalSender;
