//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the capabilities the reconciler needs from the host
//! OS. Platform implementations live in `adapters`; tests substitute mocks.

mod matcher;
mod scanner;
mod signal;

pub use matcher::ProcessMatcherPort;
pub use scanner::PortLookupPort;
pub use signal::{Liveness, Signal, SignalError, SignalPort};
