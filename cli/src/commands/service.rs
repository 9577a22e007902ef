use std::process::Command;

use anyhow::Context;
use tracing::info;

use crate::commands::ServiceCommand;

const SERVICE_UNIT: &str = "updatehostsfile.service";

pub fn service(command: ServiceCommand) -> anyhow::Result<()> {
    let (verb, done) = match command {
        ServiceCommand::Enable => ("enable", "enabled"),
        ServiceCommand::Disable => ("disable", "disabled"),
    };

    let status = Command::new("systemctl")
        .args([verb, SERVICE_UNIT])
        .status()
        .context("failed to run systemctl")?;

    if !status.success() {
        anyhow::bail!("systemctl {} {} exited with {}", verb, SERVICE_UNIT, status);
    }

    info!("UpdateHostsFile systemd service has been {}", done);
    Ok(())
}
