use std::path::PathBuf;

use thiserror::Error;

/// Every failure the résumé build can surface.
///
/// Each variant is fatal: nothing retries, and the CLI turns any of them into
/// a non-zero exit status.
#[derive(Debug, Error)]
pub enum Error {
    /// Résumé data or build settings are missing or malformed.
    #[error("Config error: {0}")]
    Config(String),

    /// The running platform has no entry in the download catalog.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    /// The archive could not be unpacked, or did not have the expected layout.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Compilation failed: {0}")]
    Compile(String),

    #[error("Timed out waiting for cache lock {}", .0.display())]
    CacheLocked(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
