//! File-backed control-state stores.
//!
//! Writes go to a temp file in the destination directory and are renamed
//! over the target, so readers observe either the old or the new content,
//! never a torn write.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{CheckpointStore, FailedAdStore, StateError};

#[derive(Debug, Serialize, Deserialize)]
struct CheckpointRecord {
    last_processed_ad: u64,
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StateError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            parent
        }
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StateError::Io(e.error))?;
    Ok(())
}

/// Checkpoint stored as a single-record JSON file.
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self) -> Result<Option<u64>, StateError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No checkpoint at {:?}, first run", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let record: CheckpointRecord = serde_json::from_str(&contents).map_err(|e| {
            StateError::Corrupt(format!("checkpoint {:?}: {}", self.path, e))
        })?;
        Ok(Some(record.last_processed_ad))
    }

    fn save(&self, ad_id: u64) -> Result<(), StateError> {
        let record = CheckpointRecord {
            last_processed_ad: ad_id,
        };
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| StateError::Corrupt(e.to_string()))?;
        write_atomic(&self.path, &json)?;
        debug!("Checkpoint advanced to {}", ad_id);
        Ok(())
    }
}

/// Failed-ad set stored as a sorted JSON array.
pub struct FileFailedAdStore {
    path: PathBuf,
}

impl FileFailedAdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FailedAdStore for FileFailedAdStore {
    fn record(&self, ad_ids: &[u64]) -> Result<(), StateError> {
        let mut merged = self.load()?;
        merged.extend(ad_ids.iter().copied());

        let json = serde_json::to_vec_pretty(&merged.iter().collect::<Vec<_>>())
            .map_err(|e| StateError::Corrupt(e.to_string()))?;
        write_atomic(&self.path, &json)?;
        debug!("Failed-ad set now holds {} ids", merged.len());
        Ok(())
    }

    fn load(&self) -> Result<BTreeSet<u64>, StateError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<BTreeSet<u64>>(&contents) {
            Ok(set) => Ok(set),
            // Unlike the checkpoint this set is advisory; a mangled file
            // starts over rather than blocking ingestion.
            Err(e) => {
                warn!("Failed-ad file {:?} unreadable ({}), starting empty", self.path, e);
                Ok(BTreeSet::new())
            }
        }
    }
}
