//! Explicit build settings. Every path the pipeline touches is derived from
//! the site root given here, never from the process working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::catalog::DEFAULT_TYPST_VERSION;
use crate::error::{Error, Result};

pub const ENV_TYPST: &str = "BUILD_PDF_TYPST";
pub const ENV_TYPST_VERSION: &str = "BUILD_PDF_TYPST_VERSION";
pub const ENV_PROBE_TIMEOUT: &str = "BUILD_PDF_PROBE_TIMEOUT_SECS";
pub const ENV_DOWNLOAD_TIMEOUT: &str = "BUILD_PDF_DOWNLOAD_TIMEOUT_SECS";
pub const ENV_EXTRACT_TIMEOUT: &str = "BUILD_PDF_EXTRACT_TIMEOUT_SECS";
pub const ENV_COMPILE_TIMEOUT: &str = "BUILD_PDF_COMPILE_TIMEOUT_SECS";
pub const ENV_LOCK_TIMEOUT: &str = "BUILD_PDF_LOCK_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Site root; the compiler resolves relative references inside the
    /// source document against it.
    pub root_dir: PathBuf,
    pub resume_file: PathBuf,
    pub source_file: PathBuf,
    pub output_dir: PathBuf,
    /// Cache directory for the provisioned compiler.
    pub bin_dir: PathBuf,
    /// Command probed on the PATH before provisioning.
    pub tool_command: String,
    /// When false the system installation is never probed.
    pub prefer_system: bool,
    pub typst_version: String,
    pub probe_timeout: Duration,
    pub download_timeout: Duration,
    pub extract_timeout: Duration,
    pub compile_timeout: Duration,
    pub lock_timeout: Duration,
}

impl BuildConfig {
    /// Default layout of the portfolio site under `root`.
    pub fn for_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            resume_file: root.join("data").join("resume.yaml"),
            source_file: root.join("typst").join("cv.typ"),
            output_dir: root.join("public"),
            bin_dir: root.join("bin"),
            root_dir: root,
            tool_command: "typst".to_string(),
            prefer_system: true,
            typst_version: DEFAULT_TYPST_VERSION.to_string(),
            probe_timeout: Duration::from_secs(10),
            download_timeout: Duration::from_secs(300),
            extract_timeout: Duration::from_secs(120),
            compile_timeout: Duration::from_secs(300),
            lock_timeout: Duration::from_secs(60),
        }
    }

    /// Applies `BUILD_PDF_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`; unset keys keep their value.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cmd) = lookup(ENV_TYPST).filter(|v| !v.trim().is_empty()) {
            debug!(tool_command = %cmd, "Overriding compiler command from env");
            self.tool_command = cmd;
        }
        if let Some(version) = lookup(ENV_TYPST_VERSION).filter(|v| !v.trim().is_empty()) {
            self.typst_version = version.trim().trim_start_matches('v').to_string();
        }
        let timeouts = [
            (ENV_PROBE_TIMEOUT, &mut self.probe_timeout),
            (ENV_DOWNLOAD_TIMEOUT, &mut self.download_timeout),
            (ENV_EXTRACT_TIMEOUT, &mut self.extract_timeout),
            (ENV_COMPILE_TIMEOUT, &mut self.compile_timeout),
            (ENV_LOCK_TIMEOUT, &mut self.lock_timeout),
        ];
        for (key, slot) in timeouts {
            if let Some(raw) = lookup(key) {
                *slot = parse_secs(key, &raw)?;
            }
        }
        Ok(self)
    }

    pub fn trace_loaded(&self) {
        info!(
            root = %self.root_dir.display(),
            resume = %self.resume_file.display(),
            source = %self.source_file.display(),
            output_dir = %self.output_dir.display(),
            bin_dir = %self.bin_dir.display(),
            typst_version = %self.typst_version,
            "Loaded BuildConfig"
        );
        debug!(?self, "BuildConfig loaded (full debug)");
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(Error::Config(format!("{key} must be greater than zero"))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(Error::Config(format!(
            "{key} must be a whole number of seconds, got {raw:?}: {e}"
        ))),
    }
}
