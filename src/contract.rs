//! # contract: types and seams shared across the build pipeline
//!
//! - [`ArchiveFetcher`] is the only network boundary. The HTTP implementation
//!   lives in [`crate::download`]; tests plug in `mockall` mocks to assert that
//!   cache hits and unsupported platforms never reach it.
//! - [`ToolInstallation`] is the outcome of the "system tool or provisioned
//!   tool" decision.
//! - [`BuildArtifact`] and [`BuildReport`] describe what a run produced.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Serialize;

use crate::error::Result;

/// Downloads a single archive to a local file.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Writes the body of `url` to `dest`, returning the number of bytes
    /// written. On error nothing is left at `dest`.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// The compiler chosen for this run. Exactly one variant per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum ToolInstallation {
    /// Found on the PATH; holds the bare command name.
    System(String),
    /// Provisioned into the local cache.
    Local(PathBuf),
}

impl ToolInstallation {
    pub fn program(&self) -> &OsStr {
        match self {
            ToolInstallation::System(cmd) => OsStr::new(cmd),
            ToolInstallation::Local(path) => path.as_os_str(),
        }
    }
}

/// Everything the compiler needs for one invocation.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Root for resolving relative references inside the source document.
    pub root: PathBuf,
}

/// A compiled document on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildArtifact {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub file_name: String,
    pub artifact: BuildArtifact,
    pub tool: ToolInstallation,
}
