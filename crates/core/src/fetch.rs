//! Download transport seam.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::Result;

/// Retrieves a remote resource to a local file.
///
/// Implementations make a single attempt; there is no retry policy.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Stream `url` to exactly `dest` and return the written path.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Download`] carrying `url` on any transport or
    /// filesystem failure.
    async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf>;
}
