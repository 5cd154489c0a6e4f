//! Process matcher port (interface).

use crate::domain::ProcessHandle;

/// Port for finding processes by command line.
///
/// Implementations enumerate the host process table and return one handle
/// per (pattern, process) match, using a literal, case-sensitive substring
/// test. A process matching two patterns yields two handles.
pub trait ProcessMatcherPort: Send + Sync {
    /// Find processes whose command line contains any of `patterns`.
    ///
    /// Enumeration failures yield an empty list rather than an error.
    fn find_by_pattern(
        &self,
        patterns: &[String],
    ) -> impl std::future::Future<Output = Vec<ProcessHandle>> + Send;

    /// PIDs of the host's ancestors, nearest parent first.
    ///
    /// Best effort: when the table cannot be read, whatever is known without
    /// it (possibly nothing) is returned.
    fn lineage(&self) -> impl std::future::Future<Output = Vec<u32>> + Send;
}
