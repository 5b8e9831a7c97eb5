//! Version-pinned table of Typst release archives, keyed by platform.
//!
//! Adding a platform is one more row in the table below.

use crate::error::{Error, Result};
use crate::platform::{Arch, Os, PlatformDescriptor};

/// Typst release used when nothing else is configured.
pub const DEFAULT_TYPST_VERSION: &str = "0.11.0";

/// Every archive contains exactly one top-level directory starting with this tag.
pub const ARCHIVE_DIR_PREFIX: &str = "typst-";

const RELEASE_BASE_URL: &str = "https://github.com/typst/typst/releases/download";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarXz,
    Zip,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarXz => "tar.xz",
            ArchiveFormat::Zip => "zip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseTarget {
    /// Rust target triple used in the release asset name.
    pub triple: &'static str,
    pub format: ArchiveFormat,
}

static RELEASES: &[(Os, Arch, ReleaseTarget)] = &[
    (
        Os::Linux,
        Arch::X86_64,
        ReleaseTarget { triple: "x86_64-unknown-linux-musl", format: ArchiveFormat::TarXz },
    ),
    (
        Os::Linux,
        Arch::Aarch64,
        ReleaseTarget { triple: "aarch64-unknown-linux-musl", format: ArchiveFormat::TarXz },
    ),
    (
        Os::Macos,
        Arch::Aarch64,
        ReleaseTarget { triple: "aarch64-apple-darwin", format: ArchiveFormat::TarXz },
    ),
    (
        Os::Macos,
        Arch::X86_64,
        ReleaseTarget { triple: "x86_64-apple-darwin", format: ArchiveFormat::TarXz },
    ),
    (
        Os::Windows,
        Arch::X86_64,
        ReleaseTarget { triple: "x86_64-pc-windows-msvc", format: ArchiveFormat::Zip },
    ),
];

/// Resolved download for one platform and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub target: ReleaseTarget,
    pub url: String,
}

pub fn target_for(platform: &PlatformDescriptor) -> Result<ReleaseTarget> {
    RELEASES
        .iter()
        .find(|(os, arch, _)| *os == platform.os && *arch == platform.arch)
        .map(|(_, _, target)| *target)
        .ok_or_else(|| Error::UnsupportedPlatform {
            os: platform.os.as_str().to_string(),
            arch: platform.arch.to_string(),
        })
}

/// Looks up the archive URL for `platform`. Fails before touching the
/// network or filesystem when the platform has no row.
pub fn release_for(platform: &PlatformDescriptor, version: &str) -> Result<Release> {
    let target = target_for(platform)?;
    let url = format!(
        "{RELEASE_BASE_URL}/v{version}/typst-{}.{}",
        target.triple,
        target.format.extension()
    );
    Ok(Release {
        version: version.to_string(),
        target,
        url,
    })
}
