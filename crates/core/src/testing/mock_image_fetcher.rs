//! Mock image fetcher for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::media::{file_name_for, ImageFetcher, MediaError};

/// Mock implementation of the ImageFetcher trait.
///
/// Writes a stub file per URL (named like the production fetcher names
/// them, so recognizer mocks can match on URL fragments). URLs marked as
/// failing return an I/O error instead.
pub struct MockImageFetcher {
    fail_urls: Arc<RwLock<HashSet<String>>>,
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageFetcher {
    pub fn new() -> Self {
        Self {
            fail_urls: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Make downloads of `url` fail.
    pub async fn fail_url(&self, url: &str) {
        self.fail_urls.write().await.insert(url.to_string());
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, MediaError> {
        if self.fail_urls.read().await.contains(url) {
            return Err(MediaError::Io(std::io::Error::other(
                format!("simulated download failure for {url}"),
            )));
        }

        let path = dest_dir.join(file_name_for(url));
        tokio::fs::write(&path, url.as_bytes()).await?;
        Ok(path)
    }
}
