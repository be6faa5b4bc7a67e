//! GitHub Releases transport for resticup.
//!
//! Implements the two transport seams of `resticup-core`:
//! - [`ReleaseSource`]: latest-release metadata from the REST API
//! - [`Downloader`]: streaming download of a release asset to disk

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::ACCEPT;
use resticup_core::{Downloader, Error, ReleaseMetadata, ReleaseSource, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Base URL of the GitHub REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("resticup/", env!("CARGO_PKG_VERSION"));

/// HTTP client for GitHub Releases.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client talking to the public GitHub API.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_base: GITHUB_API_URL.to_string(),
            token: None,
        })
    }

    /// Authenticate metadata queries with `token`.
    ///
    /// Unauthenticated API calls are limited to 60 per hour per IP.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Send metadata queries to another API base (GitHub Enterprise, tests).
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn latest_release_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}/releases/latest", self.api_base)
    }
}

#[async_trait]
impl ReleaseSource for GitHubClient {
    async fn latest_release(&self, owner: &str, repo: &str) -> Result<ReleaseMetadata> {
        let url = self.latest_release_url(owner, repo);
        debug!(%url, "Fetching latest GitHub release");

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::metadata_fetch(owner, repo, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::metadata_fetch(owner, repo, format!("HTTP {status}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| {
                Error::metadata_fetch(owner, repo, format!("invalid response body: {e}"))
            })?;

        Ok(ReleaseMetadata {
            tag_name: body
                .get("tag_name")
                .and_then(serde_json::Value::as_str)
                .map(String::from),
        })
    }
}

#[async_trait]
impl Downloader for GitHubClient {
    async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        info!(%url, dest = ?dest, "Downloading release asset");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::download(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::download(url, format!("HTTP {status}")));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| {
                    Error::download(url, format!("cannot create {}: {e}", parent.display()))
                })?;
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::download(url, format!("cannot create {}: {e}", dest.display())))?;

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::download(url, e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| {
                    Error::download(url, format!("write to {} failed: {e}", dest.display()))
                })?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| Error::download(url, e.to_string()))?;

        debug!(bytes = written, path = ?dest, "Download complete");
        Ok(dest.to_path_buf())
    }
}
