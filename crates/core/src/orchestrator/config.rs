//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the ingestion orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Delay before the single retry of a detail fetch that yielded no
    /// images (seconds). The site populates galleries asynchronously, so a
    /// fresh ad can legitimately have none on first read.
    #[serde(default = "default_retry_delay")]
    pub no_images_retry_delay_secs: u64,

    /// Worker bound for image downloads and OCR calls within one ad.
    /// Keeps pressure on the external services predictable.
    #[serde(default = "default_image_workers")]
    pub max_parallel_images: usize,

    /// Directory for per-ad scratch space (downloaded photos).
    /// Defaults to the system temp directory.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

fn default_retry_delay() -> u64 {
    120
}

fn default_image_workers() -> usize {
    4
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            no_images_retry_delay_secs: default_retry_delay(),
            max_parallel_images: default_image_workers(),
            work_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.no_images_retry_delay_secs, 120);
        assert_eq!(config.max_parallel_images, 4);
        assert!(config.work_dir.is_none());
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: OrchestratorConfig = toml::from_str("").unwrap();
        assert_eq!(config.no_images_retry_delay_secs, 120);
        assert_eq!(config.max_parallel_images, 4);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            no_images_retry_delay_secs = 5
            max_parallel_images = 2
            work_dir = "/tmp/platewatch"
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.no_images_retry_delay_secs, 5);
        assert_eq!(config.max_parallel_images, 2);
        assert_eq!(config.work_dir, Some(PathBuf::from("/tmp/platewatch")));
    }
}
