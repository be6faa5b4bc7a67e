//! Binary acquisition pipeline for restic and resticprofile.
//!
//! Downloads platform specific release assets from GitHub Releases, extracts
//! the executable and installs it under its canonical name.
//!
//! # Architecture
//!
//! - [`Platform`] - host `(os, arch)` in release asset vocabulary
//! - [`Tool`] / [`ToolIdentity`] - static table of tools and their archive kinds
//! - [`VersionResolver`] - `latest` or explicit tag to a `v`-prefixed tag
//! - [`locate`] - download URL and asset name
//! - [`Downloader`] / [`ReleaseSource`] - transport seams, implemented elsewhere
//! - [`ArchiveExtractor`] - one strategy per [`ArchiveKind`]
//! - [`install_binary`] - final placement
//! - [`Orchestrator`] - runs the above per tool
//!
//! # Example
//!
//! ```ignore
//! use resticup_core::{Orchestrator, SetupPlan, TracingSink, VersionSpec};
//!
//! let client = GitHubClient::new()?;
//! let plan = SetupPlan::new(VersionSpec::Latest, VersionSpec::Latest, "/usr/local/bin");
//! let report = Orchestrator::new(&client, &client, &TracingSink).run(&plan).await?;
//! ```

mod error;
pub mod events;
pub mod extract;
pub mod fetch;
pub mod install;
pub mod locate;
pub mod pipeline;
pub mod platform;
pub mod tool;
pub mod version;

pub use error::{Error, Result};
pub use events::{EventSink, InstallEvent, MemorySink, Stage, TracingSink};
pub use extract::{ArchiveExtractor, Bzip2Extractor, TarGzExtractor, extractor_for};
pub use fetch::Downloader;
pub use install::install_binary;
pub use locate::{DownloadDescriptor, RELEASE_HOST, locate};
pub use pipeline::{InstallOutcome, Orchestrator, SetupPlan, SetupReport, ToolRequest};
pub use platform::{Arch, Os, Platform};
pub use tool::{ArchiveKind, RESTIC, RESTICPROFILE, Tool, ToolIdentity};
pub use version::{ReleaseMetadata, ReleaseSource, ResolvedVersion, VersionResolver, VersionSpec};
