use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Facts about, and probes run from, the local machine.
#[async_trait]
pub trait SystemRepository: Send + Sync {
    /// The machine's own host name, as written into the hostname entry.
    fn hostname(&self) -> Result<String>;

    /// Succeeds when `address` answers a reachability probe within `timeout`.
    async fn probe(&self, address: &str, timeout: Duration) -> Result<()>;
}
