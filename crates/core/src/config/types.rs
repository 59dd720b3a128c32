use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::notifier::NotifierConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::recognizer::RecognizerConfig;
use crate::source::KochkaConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Listing site to scrape.
    #[serde(default)]
    pub source: KochkaConfig,
    /// Plate recognition service.
    pub recognizer: RecognizerConfig,
    /// Notification delivery; omit to run without notifications.
    #[serde(default)]
    pub notifier: Option<NotifierConfig>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("platewatch.db")
}

/// Control-state file locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    /// Resume cursor file.
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: PathBuf,
    /// Permanently failed ad ids, kept for offline inspection.
    #[serde(default = "default_failed_ads_path")]
    pub failed_ads_path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            checkpoint_path: default_checkpoint_path(),
            failed_ads_path: default_failed_ads_path(),
        }
    }
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("state/checkpoint.json")
}

fn default_failed_ads_path() -> PathBuf {
    PathBuf::from("state/failed_ads.json")
}
