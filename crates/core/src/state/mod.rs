//! Durable control state for the ingestion run.
//!
//! Two small cursors live here: the checkpoint (highest ad id fully
//! processed, the resume point) and the failed-ad set (ids that exhausted
//! their retries, kept for offline inspection only). Both are injected into
//! the orchestrator as explicit stores; losing either mid-run is fatal to
//! the run, so their writes must be atomic.

mod file;

pub use file::{FileCheckpointStore, FileFailedAdStore};

use std::collections::BTreeSet;
use thiserror::Error;

/// Errors from the control-state stores. Always fatal to the run.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file corrupt: {0}")]
    Corrupt(String),
}

/// Resume cursor: highest ad id confirmed fully processed.
pub trait CheckpointStore: Send + Sync {
    /// `None` means first run: process every ad.
    fn load(&self) -> Result<Option<u64>, StateError>;

    /// Persist a new checkpoint. A crash mid-save must never leave anything
    /// but the previous fully committed value observable.
    fn save(&self, ad_id: u64) -> Result<(), StateError>;
}

/// Append-only, deduplicated set of permanently failed ad ids.
///
/// Never consulted for skip logic; the checkpoint already excludes these
/// ids from future runs.
pub trait FailedAdStore: Send + Sync {
    /// Merge `ad_ids` into the persisted set.
    fn record(&self, ad_ids: &[u64]) -> Result<(), StateError>;

    /// The full persisted set.
    fn load(&self) -> Result<BTreeSet<u64>, StateError>;
}
