//! Best-effort photo download into per-ad scratch directories.
//!
//! The orchestrator owns the directory lifetime (a `TempDir` dropped after
//! each ad, success or failure); fetchers only write into it. A failed
//! download is the caller's cue to drop that photo, never to fail the ad.

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from downloading a single image.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("image download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// External image download collaborator.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download `url` into `dest_dir`, returning the written path.
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, MediaError>;
}

/// Stable on-disk name for a downloaded image, derived from its URL.
/// Distinct URLs map to distinct names within one directory.
pub fn file_name_for(url: &str) -> String {
    url.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}

/// Plain HTTP image downloader.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, MediaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, MediaError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let path = dest_dir.join(file_name_for(url));
        tokio::fs::write(&path, &bytes).await?;
        debug!("Downloaded {} ({} bytes) to {:?}", url, bytes.len(), path);
        Ok(path)
    }
}
