//! Makes a Typst executable available at a deterministic path under the
//! cache directory, downloading and unpacking a pinned release if needed.
//!
//! Order of operations:
//! 1. cache hit → return immediately (no network, no writes)
//! 2. catalog lookup → `UnsupportedPlatform` before any side effect
//! 3. create the cache dir, take the cache lock, re-check the cache
//! 4. download to a temp file, unpack into a staging dir, install the binary
//! 5. remove the archive and staging dir whatever happened
//! 6. record an [`InstallManifest`] next to the binary

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::catalog::{self, ArchiveFormat, ARCHIVE_DIR_PREFIX};
use crate::config::BuildConfig;
use crate::contract::ArchiveFetcher;
use crate::error::Result;
use crate::extract;
use crate::lock::CacheLock;
use crate::platform::PlatformDescriptor;

pub const MANIFEST_FILE_NAME: &str = "typst.json";

/// Provenance of a provisioned binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallManifest {
    pub version: String,
    pub target: String,
    pub url: String,
    pub archive_sha256: String,
    pub archive_bytes: u64,
}

pub fn read_manifest(bin_dir: &Path) -> Option<InstallManifest> {
    let raw = fs::read(bin_dir.join(MANIFEST_FILE_NAME)).ok()?;
    serde_json::from_slice(&raw).ok()
}

pub struct Provisioner<'a> {
    fetcher: &'a dyn ArchiveFetcher,
    platform: PlatformDescriptor,
    bin_dir: PathBuf,
    version: String,
    extract_timeout: Duration,
    lock_timeout: Duration,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        config: &BuildConfig,
        platform: PlatformDescriptor,
        fetcher: &'a dyn ArchiveFetcher,
    ) -> Self {
        Self {
            fetcher,
            platform,
            bin_dir: config.bin_dir.clone(),
            version: config.typst_version.clone(),
            extract_timeout: config.extract_timeout,
            lock_timeout: config.lock_timeout,
        }
    }

    /// Where the provisioned executable lives.
    pub fn cached_path(&self) -> PathBuf {
        self.bin_dir.join(self.platform.os.executable_name())
    }

    pub async fn provision(&self) -> Result<PathBuf> {
        let cached = self.cached_path();
        if cached.is_file() {
            info!(path = %cached.display(), "Typst binary found in cache");
            return Ok(cached);
        }

        let release = catalog::release_for(&self.platform, &self.version)?;

        fs::create_dir_all(&self.bin_dir)?;
        let _lock = CacheLock::acquire(&self.bin_dir, self.lock_timeout).await?;
        if cached.is_file() {
            info!(path = %cached.display(), "Typst binary installed by a concurrent run");
            return Ok(cached);
        }

        info!(
            platform = %self.platform,
            version = %release.version,
            url = %release.url,
            "Typst not found, downloading"
        );
        let archive = tempfile::Builder::new()
            .prefix(".typst-archive-")
            .suffix(&format!(".{}", release.target.format.extension()))
            .tempfile_in(&self.bin_dir)?
            .into_temp_path();

        let archive_bytes = self.fetcher.fetch(&release.url, &archive).await?;
        let archive_sha256 = sha256_file(&archive)?;
        debug!(sha256 = %archive_sha256, bytes = archive_bytes, "Archive digest");

        let installed = self
            .install_from_archive(&archive, release.target.format, &cached)
            .await;

        if let Err(e) = archive.close() {
            warn!(error = ?e, "Failed to remove downloaded archive");
        }
        installed?;

        let manifest = InstallManifest {
            version: release.version,
            target: release.target.triple.to_string(),
            url: release.url,
            archive_sha256,
            archive_bytes,
        };
        if let Err(e) = write_manifest(&self.bin_dir, &manifest) {
            warn!(error = ?e, "Failed to write install manifest");
        }

        info!(path = %cached.display(), "Typst installed");
        Ok(cached)
    }

    async fn install_from_archive(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        cached: &Path,
    ) -> Result<()> {
        let staging = tempfile::Builder::new()
            .prefix(".typst-extract-")
            .tempdir_in(&self.bin_dir)?;

        let result = async {
            extract::unpack(archive, format, staging.path(), self.extract_timeout).await?;
            let exe = extract::locate_executable(
                staging.path(),
                ARCHIVE_DIR_PREFIX,
                self.platform.os.executable_name(),
            )?;
            extract::install_executable(&exe, cached)
        }
        .await;

        if let Err(e) = &result {
            error!(error = %e, archive = %archive.display(), "Failed to install Typst from archive");
        }
        if let Err(e) = staging.close() {
            warn!(error = ?e, "Failed to remove extraction staging directory");
        }
        result
    }
}

fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

fn write_manifest(bin_dir: &Path, manifest: &InstallManifest) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(manifest).map_err(io::Error::other)?;
    fs::write(bin_dir.join(MANIFEST_FILE_NAME), json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_hex_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn manifest_roundtrips_through_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_manifest(dir.path()).is_none());
        let manifest = InstallManifest {
            version: "0.11.0".into(),
            target: "x86_64-unknown-linux-musl".into(),
            url: "https://example.invalid/typst.tar.xz".into(),
            archive_sha256: "00".into(),
            archive_bytes: 1,
        };
        write_manifest(dir.path(), &manifest).unwrap();
        assert_eq!(read_manifest(dir.path()), Some(manifest));
    }
}
