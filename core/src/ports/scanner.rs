//! Port lookup port (interface).

use crate::domain::ProcessHandle;

/// Port for resolving listening TCP ports to processes.
///
/// Implementations handle platform-specific details (lsof, ss, netstat).
pub trait PortLookupPort: Send + Sync {
    /// Find the processes listening on `port`.
    ///
    /// An unbound port, or a missing lookup tool, yields an empty list.
    fn find_listeners(
        &self,
        port: u16,
    ) -> impl std::future::Future<Output = Vec<ProcessHandle>> + Send;

    /// Find the listeners of every port in `ports`, in port order.
    fn find_by_port(
        &self,
        ports: &[u16],
    ) -> impl std::future::Future<Output = Vec<ProcessHandle>> + Send {
        async move {
            let mut handles = Vec::new();
            for &port in ports {
                handles.extend(self.find_listeners(port).await);
            }
            handles
        }
    }
}
