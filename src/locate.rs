use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::contract::{ArchiveFetcher, ToolInstallation};
use crate::error::Result;
use crate::platform::PlatformDescriptor;
use crate::provision::Provisioner;

/// Runs `<command> --version` silently. True only on a zero exit within `timeout`.
pub async fn probe_system_tool(command: &str, timeout: Duration) -> bool {
    let mut cmd = Command::new(command);
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.status()).await {
        Ok(Ok(status)) if status.success() => true,
        Ok(Ok(status)) => {
            debug!(command, %status, "Version probe exited with non-zero code");
            false
        }
        Ok(Err(e)) => {
            debug!(command, error = %e, "Version probe could not be launched");
            false
        }
        Err(_) => {
            debug!(command, timeout_secs = timeout.as_secs(), "Version probe timed out");
            false
        }
    }
}

/// Chooses the compiler for this run: the system installation when its probe
/// succeeds, otherwise a provisioned copy under the cache directory.
pub async fn resolve_tool(
    config: &BuildConfig,
    platform: &PlatformDescriptor,
    fetcher: &dyn ArchiveFetcher,
) -> Result<ToolInstallation> {
    if config.prefer_system && probe_system_tool(&config.tool_command, config.probe_timeout).await {
        info!(command = %config.tool_command, "Using global Typst installation");
        return Ok(ToolInstallation::System(config.tool_command.clone()));
    }

    let path = Provisioner::new(config, platform.clone(), fetcher)
        .provision()
        .await?;
    info!(path = %path.display(), "Using local Typst installation");
    Ok(ToolInstallation::Local(path))
}
