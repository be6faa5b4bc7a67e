//! Host platform detection.
//!
//! Maps the identifiers reported by the Rust runtime (`std::env::consts`) onto
//! the `os`/`arch` vocabulary used in restic and resticprofile release asset
//! names (Go's `GOOS`/`GOARCH`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS, named `darwin` in asset names.
    Darwin,
    /// Windows; executables carry `.exe`.
    Windows,
}

impl Os {
    /// Parse a host OS identifier.
    ///
    /// Accepts both runtime identifiers (`macos`) and release names (`darwin`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "darwin" | "macos" => Some(Self::Darwin),
            "windows" | "win32" => Some(Self::Windows),
            _ => None,
        }
    }

    /// Name used in release asset file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }

    /// Suffix appended to executable file names on this OS.
    #[must_use]
    pub const fn executable_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Linux | Self::Darwin => "",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    /// 64-bit x86.
    #[serde(rename = "amd64")]
    Amd64,
    /// 64-bit ARM.
    #[serde(rename = "arm64")]
    Arm64,
    /// 32-bit x86, named `386` in asset names.
    #[serde(rename = "386")]
    X86,
}

impl Arch {
    /// Parse a host architecture identifier.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Some(Self::Amd64),
            "aarch64" | "arm64" => Some(Self::Arm64),
            "x86" | "386" | "i386" | "i686" | "ia32" => Some(Self::X86),
            _ => None,
        }
    }

    /// Name used in release asset file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::X86 => "386",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(os, arch)` pair a release asset is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the platform of the running host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] when the host OS or architecture
    /// has no published release asset. No fallback is guessed.
    pub fn detect() -> Result<Self> {
        Self::from_host(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build a platform from raw host identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] if either identifier is unknown.
    pub fn from_host(os: &str, arch: &str) -> Result<Self> {
        match (Os::parse(os), Arch::parse(arch)) {
            (Some(os), Some(arch)) => Ok(Self { os, arch }),
            _ => Err(Error::unsupported_platform(os, arch)),
        }
    }

    /// Every platform a release asset can be located for.
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut platforms = Vec::with_capacity(9);
        for os in [Os::Linux, Os::Darwin, Os::Windows] {
            for arch in [Arch::Amd64, Arch::Arm64, Arch::X86] {
                platforms.push(Self::new(os, arch));
            }
        }
        platforms
    }

    /// File name of an executable called `base` on this platform.
    #[must_use]
    pub fn executable_name(&self, base: &str) -> String {
        format!("{base}{}", self.os.executable_suffix())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_host_runtime_identifiers() {
        let p = Platform::from_host("linux", "x86_64").unwrap();
        assert_eq!(p, Platform::new(Os::Linux, Arch::Amd64));

        let p = Platform::from_host("macos", "aarch64").unwrap();
        assert_eq!(p, Platform::new(Os::Darwin, Arch::Arm64));

        let p = Platform::from_host("windows", "x86").unwrap();
        assert_eq!(p, Platform::new(Os::Windows, Arch::X86));
    }

    #[test]
    fn test_from_host_unknown_arch_is_fatal() {
        let err = Platform::from_host("linux", "riscv64").unwrap_err();
        match err {
            Error::UnsupportedPlatform { os, arch } => {
                assert_eq!(os, "linux");
                assert_eq!(arch, "riscv64");
            }
            other => panic!("Expected UnsupportedPlatform, got {other:?}"),
        }
    }

    #[test]
    fn test_from_host_unknown_os_is_fatal() {
        assert!(matches!(
            Platform::from_host("freebsd", "x86_64"),
            Err(Error::UnsupportedPlatform { .. })
        ));
        assert!(Platform::from_host("", "").is_err());
    }

    #[test]
    fn test_os_parse_case_insensitive() {
        assert_eq!(Os::parse("Darwin"), Some(Os::Darwin));
        assert_eq!(Os::parse("MACOS"), Some(Os::Darwin));
        assert_eq!(Os::parse("Windows"), Some(Os::Windows));
        assert_eq!(Os::parse("solaris"), None);
    }

    #[test]
    fn test_arch_parse_aliases() {
        assert_eq!(Arch::parse("amd64"), Some(Arch::Amd64));
        assert_eq!(Arch::parse("X64"), Some(Arch::Amd64));
        assert_eq!(Arch::parse("arm64"), Some(Arch::Arm64));
        assert_eq!(Arch::parse("i686"), Some(Arch::X86));
        assert_eq!(Arch::parse("arm"), None);
        assert_eq!(Arch::parse("mips"), None);
    }

    #[test]
    fn test_release_names() {
        assert_eq!(Arch::X86.as_str(), "386");
        assert_eq!(Os::Darwin.as_str(), "darwin");
        assert_eq!(
            Platform::new(Os::Windows, Arch::Arm64).to_string(),
            "windows/arm64"
        );
    }

    #[test]
    fn test_executable_name() {
        let linux = Platform::new(Os::Linux, Arch::Amd64);
        assert_eq!(linux.executable_name("restic"), "restic");

        let windows = Platform::new(Os::Windows, Arch::Amd64);
        assert_eq!(windows.executable_name("restic"), "restic.exe");
    }

    #[test]
    fn test_all_platforms_unique() {
        let all = Platform::all();
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), 9);
        assert_eq!(unique.len(), 9);
    }

    #[test]
    fn test_detect_on_supported_host() {
        // CI runs on linux/darwin/windows x86_64 or aarch64
        let p = Platform::detect().unwrap();
        assert!(matches!(p.arch, Arch::Amd64 | Arch::Arm64 | Arch::X86));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Platform::new(Os::Linux, Arch::X86)).unwrap();
        assert_eq!(json, r#"{"os":"linux","arch":"386"}"#);
    }
}
