//! Error types for the binary acquisition pipeline.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring and installing a tool binary.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The host operating system or architecture has no published release asset.
    #[error("Unsupported platform: {os}/{arch}")]
    #[diagnostic(
        code(resticup::platform::unsupported),
        help("Supported platforms: linux, darwin, windows on amd64, arm64 or 386")
    )]
    UnsupportedPlatform {
        /// Host OS identifier as reported by the runtime.
        os: String,
        /// Host architecture identifier as reported by the runtime.
        arch: String,
    },

    /// The release metadata endpoint could not be queried.
    #[error("Failed to fetch latest release of {owner}/{repo}: {message}")]
    #[diagnostic(
        code(resticup::version::metadata_fetch),
        help("Pin an explicit version, or set GITHUB_TOKEN if the API is rate limiting you")
    )]
    MetadataFetch {
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
        /// Underlying cause.
        message: String,
    },

    /// The release metadata was readable but carried no tag.
    #[error("Latest release of {owner}/{repo} has no tag_name")]
    #[diagnostic(code(resticup::version::malformed_metadata))]
    MalformedMetadata {
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
    },

    /// Downloading a release asset failed.
    #[error("Failed to download {url}: {message}")]
    #[diagnostic(
        code(resticup::fetch::download),
        help("Check that the requested version exists and publishes an asset for this platform")
    )]
    Download {
        /// The URL being fetched.
        url: String,
        /// Underlying cause.
        message: String,
    },

    /// An archive could not be decompressed or unpacked.
    #[error("Failed to extract {}: {message}", path.display())]
    #[diagnostic(code(resticup::extract))]
    Extraction {
        /// The archive being extracted.
        path: PathBuf,
        /// Underlying cause.
        message: String,
    },

    /// The binary could not be placed at its final location.
    #[error("Failed to install {}: {message}", path.display())]
    #[diagnostic(
        code(resticup::install),
        help("Check that the install path is writable")
    )]
    Install {
        /// The final install path.
        path: PathBuf,
        /// Underlying cause.
        message: String,
    },
}

impl Error {
    /// Create an unsupported platform error.
    #[must_use]
    pub fn unsupported_platform(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Create a metadata fetch error.
    #[must_use]
    pub fn metadata_fetch(
        owner: impl Into<String>,
        repo: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MetadataFetch {
            owner: owner.into(),
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Create a malformed metadata error.
    #[must_use]
    pub fn malformed_metadata(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Create a download error.
    #[must_use]
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error.
    #[must_use]
    pub fn extraction(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an install error.
    #[must_use]
    pub fn install(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Install {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}
