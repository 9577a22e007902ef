use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Retrieves remote list content into a local file.
///
/// Implementations must report an unreachable source or a non-success status
/// as [`Error::Network`](crate::error::Error::Network) and a failure to create
/// or write `destination` as [`Error::Io`](crate::error::Error::Io); the
/// updater applies different policies to the two.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &str, destination: &Path) -> Result<()>;
}
