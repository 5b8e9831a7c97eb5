use std::fs;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, error, info};

use crate::contract::{BuildArtifact, CompileRequest, ToolInstallation};
use crate::error::{Error, Result};

/// Runs `<tool> compile <source> <destination> --root <root>`.
///
/// The compiler's stdout/stderr go straight to ours. A non-zero exit, a
/// timeout, or a missing destination afterwards are all `Compile` errors.
pub async fn compile_document(
    tool: &ToolInstallation,
    request: &CompileRequest,
    timeout: Duration,
) -> Result<BuildArtifact> {
    if let Some(parent) = request.destination.parent() {
        fs::create_dir_all(parent)?;
    }
    // A leftover file must not pass for this run's output.
    match fs::remove_file(&request.destination) {
        Ok(()) => debug!(path = %request.destination.display(), "Removed previous PDF"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut cmd = Command::new(tool.program());
    cmd.arg("compile")
        .arg(&request.source)
        .arg(&request.destination)
        .arg("--root")
        .arg(&request.root)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    info!(
        tool = ?tool,
        source = %request.source.display(),
        destination = %request.destination.display(),
        root = %request.root.display(),
        "Compiling PDF"
    );

    let status = match tokio::time::timeout(timeout, cmd.status()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            error!(error = ?e, tool = ?tool, "Failed to launch compiler");
            return Err(Error::Compile(format!(
                "failed to launch {}: {e}",
                tool.program().to_string_lossy()
            )));
        }
        Err(_) => {
            error!(timeout_secs = timeout.as_secs(), "Compiler timed out, killed");
            return Err(Error::Compile(format!(
                "compiler did not finish within {}s",
                timeout.as_secs()
            )));
        }
    };

    if !status.success() {
        error!(%status, "Compiler exited with non-zero code");
        return Err(Error::Compile(format!("compiler exited with {status}")));
    }

    let size = match fs::metadata(&request.destination) {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => {
            return Err(Error::Compile(format!(
                "compiler succeeded but {} was not produced",
                request.destination.display()
            )))
        }
    };

    info!(path = %request.destination.display(), bytes = size, "PDF generated");
    Ok(BuildArtifact {
        path: request.destination.clone(),
        size,
    })
}
