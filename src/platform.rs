//! OS and architecture of the host the compiler is provisioned for.

use std::fmt;

/// Host operating system. Only linux, macos and windows have release
/// archives; anything else is kept as-is and rejected when a download is
/// looked up, so a system-wide compiler still works there.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Macos,
    Windows,
    Other(String),
}

impl Os {
    /// Accepts the identifiers produced by `std::env::consts::OS` plus the
    /// common aliases `darwin` and `win32`.
    pub fn parse(id: &str) -> Self {
        match id {
            "linux" => Os::Linux,
            "macos" | "darwin" => Os::Macos,
            "windows" | "win32" => Os::Windows,
            other => Os::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::Windows => "windows",
            Os::Other(s) => s,
        }
    }

    /// File name of the compiler executable on this OS.
    pub fn executable_name(&self) -> &'static str {
        match self {
            Os::Windows => "typst.exe",
            Os::Linux | Os::Macos | Os::Other(_) => "typst",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Aarch64,
    Other(String),
}

impl Arch {
    pub fn parse(id: &str) -> Self {
        match id {
            "x86_64" | "x64" | "amd64" => Arch::X86_64,
            "aarch64" | "arm64" => Arch::Aarch64,
            other => Arch::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86_64 => f.write_str("x86_64"),
            Arch::Aarch64 => f.write_str("aarch64"),
            Arch::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformDescriptor {
    pub fn parse(os: &str, arch: &str) -> Self {
        Self {
            os: Os::parse(os),
            arch: Arch::parse(arch),
        }
    }

    pub fn current() -> Self {
        Self::parse(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch)
    }
}
