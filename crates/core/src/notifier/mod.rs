//! Subscriber notification seam.
//!
//! Fire-and-forget from the pipeline's perspective: the orchestrator logs
//! delivery failures and moves on, so a down notification channel can never
//! stall or fail ingestion.

mod http;

pub use http::{HttpNotifier, NotifierConfig};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::source::Ad;

/// Errors from notification delivery. Logged by the caller, never fatal.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Delivers a new-ad message to subscribers.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce a newly persisted ad. `prior_ad_links` carries the links of
    /// ads already on record for the same plate, for cross-reference.
    async fn notify(&self, ad: &Ad, prior_ad_links: &[String]) -> Result<(), NotifyError>;
}

/// No-op notifier for runs without a configured delivery endpoint.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, ad: &Ad, _prior_ad_links: &[String]) -> Result<(), NotifyError> {
        debug!("Notifications disabled, dropping announcement for ad {}", ad.ad_id);
        Ok(())
    }
}
