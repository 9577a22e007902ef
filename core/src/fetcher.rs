//! HTTP implementation of [`SourceFetcher`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use uhf_common::error::{Error, IoContext, Result};
use uhf_common::fetch::SourceFetcher;

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("update-hosts-file/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::network("http client", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &str, destination: &Path) -> Result<()> {
        let response = self
            .client
            .get(source)
            .send()
            .await
            .map_err(|e| Error::network(source, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network_status(source, status.to_string()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::network(source, e))?;
        debug!("Downloaded {} bytes from {}", body.len(), source);

        tokio::fs::write(destination, &body)
            .await
            .io_context(|| format!("failed to write {}", destination.display()))
    }
}
