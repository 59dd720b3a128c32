//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notifier::{Notifier, NotifyError};
use crate::source::Ad;

/// A recorded notification for test assertions.
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub ad_id: u64,
    pub plate: Option<String>,
    pub prior_ad_links: Vec<String>,
}

/// Mock implementation of the Notifier trait. Records every announcement;
/// can simulate a delivery failure for the next call.
pub struct MockNotifier {
    sent: Arc<RwLock<Vec<SentNotification>>>,
    next_error: Arc<RwLock<Option<String>>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Fail the next `notify` call with the given message.
    pub async fn set_next_error(&self, message: &str) {
        *self.next_error.write().await = Some(message.to_string());
    }

    /// Every recorded announcement, in delivery order.
    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, ad: &Ad, prior_ad_links: &[String]) -> Result<(), NotifyError> {
        if let Some(message) = self.next_error.write().await.take() {
            return Err(NotifyError::Rejected(message));
        }

        self.sent.write().await.push(SentNotification {
            ad_id: ad.ad_id,
            plate: ad.plate.clone(),
            prior_ad_links: prior_ad_links.to_vec(),
        });
        Ok(())
    }
}
