//! Unpacking of release archives with the host's archive tools, and location
//! of the compiler executable inside the unpacked tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, error, info};

use crate::catalog::ArchiveFormat;
use crate::error::{Error, Result};

/// Unpacks `archive` into `dest_dir` using `tar` (tarballs) or PowerShell
/// `Expand-Archive` (zip).
pub async fn unpack(
    archive: &Path,
    format: ArchiveFormat,
    dest_dir: &Path,
    timeout: Duration,
) -> Result<()> {
    let mut cmd = match format {
        ArchiveFormat::TarXz => {
            let mut cmd = Command::new("tar");
            cmd.arg("-xf").arg(archive).arg("-C").arg(dest_dir);
            cmd
        }
        ArchiveFormat::Zip => {
            let mut cmd = Command::new("powershell");
            cmd.arg("-NoProfile")
                .arg("-NonInteractive")
                .arg("-Command")
                .arg(expand_archive_command(archive, dest_dir));
            cmd
        }
    };
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    info!(archive = %archive.display(), dest = %dest_dir.display(), ?format, "Extracting archive");
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            error!(error = ?e, ?format, "Failed to launch archive tool");
            return Err(Error::Extraction(format!("failed to launch archive tool: {e}")));
        }
        Err(_) => {
            error!(timeout_secs = timeout.as_secs(), "Archive extraction timed out");
            return Err(Error::Extraction(format!(
                "archive tool did not finish within {}s",
                timeout.as_secs()
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(status = %output.status, stderr = %stderr.trim(), "Archive tool exited with non-zero code");
        return Err(Error::Extraction(format!(
            "archive tool exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Single-quoted PowerShell literal; embedded `'` is doubled.
fn ps_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}

fn expand_archive_command(archive: &Path, dest_dir: &Path) -> String {
    format!(
        "Expand-Archive -LiteralPath {} -DestinationPath {} -Force",
        ps_quote(archive),
        ps_quote(dest_dir)
    )
}

/// Finds `<dir_prefix>*/<executable>` directly under `unpacked`.
///
/// The archive must hold exactly one matching top-level directory.
pub fn locate_executable(unpacked: &Path, dir_prefix: &str, executable: &str) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(unpacked)? {
        let entry = entry?;
        let name = entry.file_name();
        if entry.file_type()?.is_dir() && name.to_string_lossy().starts_with(dir_prefix) {
            candidates.push(entry.path());
        }
    }

    let dir = match candidates.as_slice() {
        [only] => only,
        [] => {
            return Err(Error::Extraction(format!(
                "no `{dir_prefix}*` directory in {}",
                unpacked.display()
            )))
        }
        many => {
            return Err(Error::Extraction(format!(
                "expected one `{dir_prefix}*` directory, found {}",
                many.len()
            )))
        }
    };

    let exe = dir.join(executable);
    if !exe.is_file() {
        return Err(Error::Extraction(format!("{} is missing", exe.display())));
    }
    debug!(executable = %exe.display(), "Located extracted executable");
    Ok(exe)
}

/// Moves `from` to `to`, replacing any existing file, and marks it executable.
pub fn install_executable(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(to)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(to, perms)?;
    }
    Ok(())
}
