//! Types for the ingestion orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a batch run.
///
/// Per-ad problems never appear here; they are collected into the
/// [`BatchReport`] instead. Only control-state I/O and a failed list fetch
/// (nothing attempted, nothing advanced) surface as a failed run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Listing fetch failed before any ad was attempted.
    #[error("source error: {0}")]
    Source(#[from] crate::source::SourceError),

    /// Checkpoint or failed-ad store I/O failed.
    #[error("control state error: {0}")]
    State(#[from] crate::state::StateError),
}

/// Why an ad was classified as permanently failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No images after the detail-fetch retry.
    NoImages,
    /// Every image yielded zero OCR candidates.
    NoReadablePlate,
    /// The consensus engine could not determine a plate.
    NoConsensus,
    /// The ad store rejected the write.
    Persist,
}

impl FailureReason {
    /// Stable label, also used as the metrics dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NoImages => "no_images",
            FailureReason::NoReadablePlate => "no_readable_plate",
            FailureReason::NoConsensus => "no_consensus",
            FailureReason::Persist => "persist",
        }
    }
}

/// One permanently failed ad within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAd {
    pub ad_id: u64,
    pub reason: FailureReason,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Ads above the checkpoint that entered processing.
    pub candidates: usize,
    /// First-time persists.
    pub created: usize,
    /// Ads already stored (idempotent reprocessing).
    pub duplicates: usize,
    /// Ads recorded into the failed set.
    pub failed: Vec<FailedAd>,
    /// Checkpoint after the run, if it advanced.
    pub checkpoint: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_labels() {
        assert_eq!(FailureReason::NoImages.as_str(), "no_images");
        assert_eq!(FailureReason::NoReadablePlate.as_str(), "no_readable_plate");
        assert_eq!(FailureReason::NoConsensus.as_str(), "no_consensus");
        assert_eq!(FailureReason::Persist.as_str(), "persist");
    }

    #[test]
    fn test_report_default_is_empty() {
        let report = BatchReport::default();
        assert_eq!(report.candidates, 0);
        assert_eq!(report.created, 0);
        assert!(report.failed.is_empty());
        assert!(report.checkpoint.is_none());
    }

    #[test]
    fn test_report_serialization() {
        let report = BatchReport {
            candidates: 3,
            created: 1,
            duplicates: 1,
            failed: vec![FailedAd {
                ad_id: 42,
                reason: FailureReason::NoConsensus,
            }],
            checkpoint: Some(184467),
        };
        let json = serde_json::to_string(&report).unwrap();
        let parsed: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.failed[0].reason, FailureReason::NoConsensus);
        assert_eq!(parsed.checkpoint, Some(184467));
    }
}
