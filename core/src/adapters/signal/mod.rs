//! Signal delivery and liveness adapters.
//!
//! # Platform Behavior
//! - **POSIX**: `kill(2)` with SIGTERM / SIGKILL; liveness via signal 0
//! - **Windows**: `taskkill` / `taskkill /F`; liveness via `OpenProcess`

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixSignals as SignalSender;

#[cfg(windows)]
pub use windows::WindowsSignals as SignalSender;
