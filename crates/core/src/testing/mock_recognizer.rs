//! Mock plate recognizer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::recognizer::{PlateRecognizer, RecognizerError};

/// Mock implementation of the PlateRecognizer trait.
///
/// Read-sets are keyed by a substring of the image path (downloaded file
/// names embed the source URL, so a URL fragment like "1.jpg" works).
/// Unmatched images yield zero candidates, like a photo with no plate.
pub struct MockPlateRecognizer {
    reads: Arc<RwLock<Vec<(String, Vec<String>)>>>,
    calls: Arc<RwLock<Vec<PathBuf>>>,
}

impl Default for MockPlateRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlateRecognizer {
    pub fn new() -> Self {
        Self {
            reads: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Images whose path contains `pattern` will yield `candidates`.
    pub async fn set_reads(&self, pattern: &str, candidates: &[&str]) {
        self.reads.write().await.push((
            pattern.to_string(),
            candidates.iter().map(|c| c.to_string()).collect(),
        ));
    }

    /// Every image passed to `recognize`, in call order.
    pub async fn calls(&self) -> Vec<PathBuf> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl PlateRecognizer for MockPlateRecognizer {
    async fn recognize(&self, image: &Path) -> Result<Vec<String>, RecognizerError> {
        self.calls.write().await.push(image.to_path_buf());

        let path_str = image.to_string_lossy();
        let reads = self.reads.read().await;
        Ok(reads
            .iter()
            .find(|(pattern, _)| path_str.contains(pattern.as_str()))
            .map(|(_, candidates)| candidates.clone())
            .unwrap_or_default())
    }
}
