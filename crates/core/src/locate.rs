//! Release asset location.

use crate::platform::Platform;
use crate::tool::ToolIdentity;
use crate::version::ResolvedVersion;

/// Host serving release downloads.
pub const RELEASE_HOST: &str = "github.com";

/// Where a release asset lives and what it is called locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadDescriptor {
    /// Full download URL.
    pub url: String,
    /// Asset file name, e.g. `restic_0.18.1_linux_amd64.bz2`.
    pub file_name: String,
}

/// Build the download descriptor for `identity` at `version` on `platform`.
///
/// Pure; never performs I/O. The tag in the URL path keeps the version marker,
/// the file name uses the bare version.
#[must_use]
pub fn locate(
    identity: &ToolIdentity,
    version: &ResolvedVersion,
    platform: &Platform,
) -> DownloadDescriptor {
    let file_name = format!(
        "{repo}_{version}_{os}_{arch}.{ext}",
        repo = identity.repo,
        version = version.bare(),
        os = platform.os,
        arch = platform.arch,
        ext = identity.archive.extension(),
    );
    let url = format!(
        "https://{RELEASE_HOST}/{owner}/{repo}/releases/download/{tag}/{file_name}",
        owner = identity.owner,
        repo = identity.repo,
        tag = version.tag(),
    );
    DownloadDescriptor { url, file_name }
}
