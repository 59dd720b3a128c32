//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Batch runs (duration, ads by outcome)
//! - Failure taxonomy (per-reason counters)
//! - Image acquisition (downloads, drops)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

/// Ads processed total by result.
pub static ADS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("platewatch_ads_processed_total", "Total ads processed"),
        &["result"], // "created", "duplicate", "failed"
    )
    .unwrap()
});

/// Permanently failed ads by reason.
pub static AD_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("platewatch_ad_failures_total", "Permanently failed ads"),
        &["reason"], // see FailureReason::as_str
    )
    .unwrap()
});

/// Images downloaded total.
pub static IMAGES_DOWNLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "platewatch_images_downloaded_total",
        "Total ad photos downloaded",
    )
    .unwrap()
});

/// Images dropped due to download failures.
pub static IMAGES_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "platewatch_images_dropped_total",
        "Ad photos dropped after a failed download",
    )
    .unwrap()
});

/// Batch run duration in seconds.
pub static BATCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "platewatch_batch_duration_seconds",
            "Duration of one ingestion batch",
        )
        .buckets(vec![1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0]),
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(ADS_PROCESSED.clone()),
        Box::new(AD_FAILURES.clone()),
        Box::new(IMAGES_DOWNLOADED.clone()),
        Box::new(IMAGES_DROPPED.clone()),
        Box::new(BATCH_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        ADS_PROCESSED.with_label_values(&["created"]).inc();
        assert!(!registry.gather().is_empty());
    }
}
