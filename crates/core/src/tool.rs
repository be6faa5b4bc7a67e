//! The tools this crate installs and how their releases are packaged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compression/container format of a release asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveKind {
    /// A single bzip2-compressed executable.
    Bzip2,
    /// A gzip-compressed tarball containing the executable.
    TarGz,
}

impl ArchiveKind {
    /// File extension of assets in this format, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Bzip2 => "bz2",
            Self::TarGz => "tar.gz",
        }
    }
}

/// Static description of a tool published on GitHub Releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolIdentity {
    /// Repository owner.
    pub owner: &'static str,
    /// Repository name; also the prefix of every asset name.
    pub repo: &'static str,
    /// Version-free name the binary is installed under.
    pub binary: &'static str,
    /// Format every release asset of this tool is published in.
    pub archive: ArchiveKind,
}

/// restic release assets: `restic_<version>_<os>_<arch>.bz2`.
pub const RESTIC: ToolIdentity = ToolIdentity {
    owner: "restic",
    repo: "restic",
    binary: "restic",
    archive: ArchiveKind::Bzip2,
};

/// resticprofile release assets: `resticprofile_<version>_<os>_<arch>.tar.gz`.
pub const RESTICPROFILE: ToolIdentity = ToolIdentity {
    owner: "creativeprojects",
    repo: "resticprofile",
    binary: "resticprofile",
    archive: ArchiveKind::TarGz,
};

/// The tools handled by a setup run, in installation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// The backup program itself. Installation is optional.
    Restic,
    /// The configuration wrapper around restic. Always installed.
    Resticprofile,
}

impl Tool {
    /// All tools, in the order a run installs them.
    pub const ALL: [Self; 2] = [Self::Restic, Self::Resticprofile];

    /// Static identity of this tool.
    #[must_use]
    pub const fn identity(self) -> &'static ToolIdentity {
        match self {
            Self::Restic => &RESTIC,
            Self::Resticprofile => &RESTICPROFILE,
        }
    }

    /// Canonical binary name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.identity().binary
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
