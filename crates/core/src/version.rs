//! Version resolution.
//!
//! Turns a user supplied version (`latest` or an explicit tag) into a release
//! tag that always carries the `v` marker.

use crate::events::{EventSink, InstallEvent, Stage};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

/// Leading marker on release tags (`v0.18.1`). Asset file names omit it.
pub const VERSION_MARKER: char = 'v';

/// Sentinel requesting the most recent published release.
pub const LATEST: &str = "latest";

/// Version requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// Resolve to the most recent published release.
    Latest,
    /// An explicit tag, with or without the leading marker.
    Tag(String),
}

impl VersionSpec {
    /// Parse a user supplied version.
    ///
    /// An empty value (an unset action input) means [`VersionSpec::Latest`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(LATEST) {
            Self::Latest
        } else {
            Self::Tag(s.to_string())
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// A release tag guaranteed to start with [`VERSION_MARKER`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedVersion(String);

impl ResolvedVersion {
    /// Normalize a tag, prepending the marker if it is missing.
    ///
    /// Idempotent: an already normalized tag is returned unchanged.
    #[must_use]
    pub fn normalize(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.starts_with(VERSION_MARKER) {
            Self(tag.to_string())
        } else {
            Self(format!("{VERSION_MARKER}{tag}"))
        }
    }

    /// The full tag, e.g. `v0.18.1`.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0
    }

    /// The version without its marker, as used inside asset names, e.g. `0.18.1`.
    #[must_use]
    pub fn bare(&self) -> &str {
        self.0.strip_prefix(VERSION_MARKER).unwrap_or(&self.0)
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latest-release metadata as returned by the releases API.
///
/// Only the tag is needed; it is optional so that a readable response without
/// one can be reported as [`Error::MalformedMetadata`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseMetadata {
    /// Tag of the release, e.g. `v0.18.1`.
    #[serde(default)]
    pub tag_name: Option<String>,
}

/// Source of release metadata.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch metadata of the most recent published release of `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MetadataFetch`] on transport failure or unreadable response.
    async fn latest_release(&self, owner: &str, repo: &str) -> Result<ReleaseMetadata>;
}

/// Resolves [`VersionSpec`]s against a [`ReleaseSource`].
///
/// Nothing is cached: every call with [`VersionSpec::Latest`] queries the source.
pub struct VersionResolver<'a> {
    source: &'a dyn ReleaseSource,
    events: &'a dyn EventSink,
}

impl<'a> VersionResolver<'a> {
    /// Create a resolver querying `source` and reporting to `events`.
    #[must_use]
    pub fn new(source: &'a dyn ReleaseSource, events: &'a dyn EventSink) -> Self {
        Self { source, events }
    }

    /// Resolve `spec` for the repository `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MetadataFetch`] if the latest release cannot be queried
    /// and [`Error::MalformedMetadata`] if it has no tag.
    pub async fn resolve(
        &self,
        owner: &str,
        repo: &str,
        spec: &VersionSpec,
    ) -> Result<ResolvedVersion> {
        let tag = match spec {
            VersionSpec::Tag(tag) => tag.clone(),
            VersionSpec::Latest => {
                let release = self.source.latest_release(owner, repo).await?;
                release
                    .tag_name
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| Error::malformed_metadata(owner, repo))?
            }
        };

        let resolved = ResolvedVersion::normalize(&tag);
        self.events.emit(InstallEvent::Detail {
            stage: Stage::Resolving,
            message: format!("{owner}/{repo} {spec} resolved to {resolved}"),
        });
        Ok(resolved)
    }
}
