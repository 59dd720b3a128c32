//! Mock ad source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::source::{AdDetail, AdSource, AdSummary, SourceError};

/// Mock implementation of the AdSource trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable listing
/// - Queue per-URL detail responses (the last queued response repeats,
///   so retry paths can observe first-empty-then-populated sequences)
/// - Track detail fetches for assertions
/// - Simulate a listing failure
pub struct MockAdSource {
    summaries: Arc<RwLock<Vec<AdSummary>>>,
    details: Arc<RwLock<HashMap<String, VecDeque<AdDetail>>>>,
    detail_calls: Arc<RwLock<Vec<String>>>,
    next_list_error: Arc<RwLock<Option<String>>>,
}

impl Default for MockAdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAdSource {
    /// Create a new mock source with an empty listing.
    pub fn new() -> Self {
        Self {
            summaries: Arc::new(RwLock::new(Vec::new())),
            details: Arc::new(RwLock::new(HashMap::new())),
            detail_calls: Arc::new(RwLock::new(Vec::new())),
            next_list_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the listing returned by `fetch_ad_list`.
    pub async fn set_summaries(&self, summaries: Vec<AdSummary>) {
        *self.summaries.write().await = summaries;
    }

    /// Queue a detail response for `url`. Responses are consumed in order;
    /// the final one keeps repeating.
    pub async fn push_detail(&self, url: &str, detail: AdDetail) {
        self.details
            .write()
            .await
            .entry(url.to_string())
            .or_default()
            .push_back(detail);
    }

    /// Fail the next `fetch_ad_list` call with the given message.
    pub async fn set_next_list_error(&self, message: &str) {
        *self.next_list_error.write().await = Some(message.to_string());
    }

    /// URLs passed to `fetch_ad_detail`, in call order.
    pub async fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.read().await.clone()
    }
}

#[async_trait]
impl AdSource for MockAdSource {
    async fn fetch_ad_list(&self) -> Result<Vec<AdSummary>, SourceError> {
        if let Some(message) = self.next_list_error.write().await.take() {
            return Err(SourceError::Parse(message));
        }
        Ok(self.summaries.read().await.clone())
    }

    async fn fetch_ad_detail(&self, url: &str) -> Result<AdDetail, SourceError> {
        self.detail_calls.write().await.push(url.to_string());

        let mut details = self.details.write().await;
        match details.get_mut(url) {
            Some(queue) if queue.len() > 1 => Ok(queue.pop_front().unwrap()),
            Some(queue) => Ok(queue.front().cloned().unwrap_or_default()),
            None => Ok(AdDetail::default()),
        }
    }
}
