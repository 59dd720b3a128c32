//! Durable ad storage with the plate→ads index.
//!
//! The store enforces at-most-once persistence per `ad_id`: re-ingesting an
//! ad (after a crash before the checkpoint advanced, or a relisted id) is an
//! idempotent no-op reported as [`PersistOutcome::Duplicate`]. Photo URLs
//! are transient pipeline inputs and are not persisted.

mod sqlite;

pub use sqlite::SqliteAdStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::Ad;

/// Outcome of a persist attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistOutcome {
    /// First time this `ad_id` was stored; the plate index was updated.
    Created,
    /// The `ad_id` already exists; nothing was written.
    Duplicate,
}

/// Row counts for operator logs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub ads: u64,
    pub plates: u64,
}

/// Errors from the ad store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

/// Dedup/index writer over ads and plates.
pub trait AdStore: Send + Sync {
    /// Persist `ad` under `plate`.
    ///
    /// Atomic with respect to the `ad_id` uniqueness constraint: two
    /// concurrent calls with the same id yield exactly one `Created`.
    /// On `Created` the `PlateRecord` is created lazily and the ad is
    /// appended to it.
    fn insert(&self, ad: &Ad, plate: &str) -> Result<PersistOutcome, StoreError>;

    /// All ads recorded for `plate`, in insertion (discovery) order.
    fn find_by_plate(&self, plate: &str) -> Result<Vec<Ad>, StoreError>;

    /// Whether an ad with this id is already stored.
    fn exists(&self, ad_id: u64) -> Result<bool, StoreError>;

    /// Row counts.
    fn stats(&self) -> Result<StoreStats, StoreError>;
}
