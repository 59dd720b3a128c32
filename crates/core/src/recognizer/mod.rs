//! Plate recognition abstraction.
//!
//! The OCR model is an external collaborator consumed as a pure
//! `image → [candidate strings]` function. Candidates come back raw and
//! unfiltered; grammar validation and voting happen in the consensus engine.

mod http;

pub use http::{HttpPlateRecognizer, RecognizerConfig};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from the recognition collaborator.
#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("recognizer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("recognizer service error: {0}")]
    Api(String),
}

/// External OCR service: one call per image.
#[async_trait]
pub trait PlateRecognizer: Send + Sync {
    /// Return zero or more raw plate-text guesses for one image.
    async fn recognize(&self, image: &Path) -> Result<Vec<String>, RecognizerError>;
}
