use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use uhf_common::error::{Error, Result};
use uhf_common::system::SystemRepository;

pub struct SystemRepo;

#[async_trait]
impl SystemRepository for SystemRepo {
    fn hostname(&self) -> Result<String> {
        sys_info::hostname()
            .map_err(|e| Error::io("failed to read hostname", io::Error::other(e.to_string())))
    }

    /// Sends a single ICMP echo through the system `ping`.
    async fn probe(&self, address: &str, timeout: Duration) -> Result<()> {
        let wait = timeout.as_secs().max(1).to_string();
        let mut cmd = Command::new("ping");
        cmd.args(["-c", "1", "-W", &wait, address])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        // ping enforces -W itself; the outer bound covers a hung resolver.
        let status = tokio::time::timeout(timeout + Duration::from_secs(1), cmd.status())
            .await
            .map_err(|e| Error::network(address, e))?
            .map_err(|e| Error::network(address, e))?;

        debug!("ping {} exited with {}", address, status);
        if status.success() {
            Ok(())
        } else {
            Err(Error::network_status(address, format!("ping exited with {status}")))
        }
    }
}
