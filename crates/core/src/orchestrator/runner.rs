//! Ingestion orchestrator implementation.
//!
//! One batch run processes every ad above the checkpoint, oldest first,
//! each to completion before the next. Within one ad, photo download and
//! OCR fan out under a worker bound. The checkpoint moves only at the
//! batch boundary, so a crash mid-batch re-processes the whole batch and
//! dedup turns the replay into no-ops.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::consensus::consensus_plate;
use crate::media::ImageFetcher;
use crate::metrics;
use crate::notifier::Notifier;
use crate::recognizer::PlateRecognizer;
use crate::source::{Ad, AdDetail, AdSource, AdSummary};
use crate::state::{CheckpointStore, FailedAdStore};
use crate::store::{AdStore, PersistOutcome};

use super::config::OrchestratorConfig;
use super::types::{BatchReport, FailedAd, FailureReason, IngestError};

enum AdOutcome {
    Created,
    Duplicate,
}

/// The ingestion orchestrator - drives ads through the pipeline.
pub struct IngestOrchestrator {
    config: OrchestratorConfig,
    source: Arc<dyn AdSource>,
    images: Arc<dyn ImageFetcher>,
    recognizer: Arc<dyn PlateRecognizer>,
    store: Arc<dyn AdStore>,
    checkpoint: Arc<dyn CheckpointStore>,
    failed: Arc<dyn FailedAdStore>,
    notifier: Arc<dyn Notifier>,
}

impl IngestOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: OrchestratorConfig,
        source: Arc<dyn AdSource>,
        images: Arc<dyn ImageFetcher>,
        recognizer: Arc<dyn PlateRecognizer>,
        store: Arc<dyn AdStore>,
        checkpoint: Arc<dyn CheckpointStore>,
        failed: Arc<dyn FailedAdStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            source,
            images,
            recognizer,
            store,
            checkpoint,
            failed,
            notifier,
        }
    }

    /// Run one ingestion batch to completion.
    ///
    /// Returns Err only when the listing fetch fails or control state
    /// cannot be read or written; every per-ad failure lands in the report.
    pub async fn run_batch(&self) -> Result<BatchReport, IngestError> {
        let timer = metrics::BATCH_DURATION.start_timer();

        let checkpoint = self.checkpoint.load()?;
        info!("Starting ingestion batch, checkpoint = {:?}", checkpoint);

        let mut candidates = self.source.fetch_ad_list().await?;
        candidates.retain(|summary| checkpoint.is_none_or(|cp| summary.ad_id > cp));
        // Oldest first, so checkpoint advancement stays monotonic and a
        // crash resumes without gaps.
        candidates.sort_by_key(|summary| summary.ad_id);

        let Some(highest) = candidates.last().map(|summary| summary.ad_id) else {
            info!("No new ads above the checkpoint");
            timer.observe_duration();
            return Ok(BatchReport {
                checkpoint,
                ..BatchReport::default()
            });
        };

        let mut report = BatchReport {
            candidates: candidates.len(),
            ..BatchReport::default()
        };
        info!("Processing {} new ads up to {}", candidates.len(), highest);

        for summary in &candidates {
            match self.process_ad(summary).await {
                Ok(AdOutcome::Created) => {
                    metrics::ADS_PROCESSED.with_label_values(&["created"]).inc();
                    report.created += 1;
                }
                Ok(AdOutcome::Duplicate) => {
                    metrics::ADS_PROCESSED.with_label_values(&["duplicate"]).inc();
                    report.duplicates += 1;
                }
                Err(reason) => {
                    warn!("Ad {} failed: {}", summary.ad_id, reason.as_str());
                    metrics::ADS_PROCESSED.with_label_values(&["failed"]).inc();
                    metrics::AD_FAILURES
                        .with_label_values(&[reason.as_str()])
                        .inc();
                    report.failed.push(FailedAd {
                        ad_id: summary.ad_id,
                        reason,
                    });
                }
            }
        }

        // Failed ads are skipped forever: the checkpoint covers the whole
        // attempted range regardless of per-ad outcomes.
        self.checkpoint.save(highest)?;
        if !report.failed.is_empty() {
            let ids: Vec<u64> = report.failed.iter().map(|f| f.ad_id).collect();
            self.failed.record(&ids)?;
        }
        report.checkpoint = Some(highest);

        timer.observe_duration();
        info!(
            "Batch done: {} created, {} duplicate, {} failed",
            report.created,
            report.duplicates,
            report.failed.len()
        );
        Ok(report)
    }

    /// Process a single ad to a terminal outcome. Scratch space is dropped
    /// on every exit path.
    async fn process_ad(&self, summary: &AdSummary) -> Result<AdOutcome, FailureReason> {
        info!("Processing ad {}: {}", summary.ad_id, summary.title);

        let detail = self.fetch_detail_with_retry(summary).await?;
        let mut ad = Ad::assemble(summary, &detail);

        let scratch = match self.scratch_dir() {
            Ok(dir) => dir,
            Err(e) => {
                // Without scratch space no photo can be read, which is the
                // same terminal condition as unreadable photos.
                warn!("No scratch dir for ad {}: {}", summary.ad_id, e);
                return Err(FailureReason::NoReadablePlate);
            }
        };

        let image_paths = self.download_images(&ad.image_urls, scratch.path()).await;
        let reads = self.recognize_all(&image_paths).await;

        if reads.iter().all(|set| set.is_empty()) {
            return Err(FailureReason::NoReadablePlate);
        }

        let Some(plate) = consensus_plate(&reads) else {
            return Err(FailureReason::NoConsensus);
        };
        debug!("Ad {} resolved to plate {}", summary.ad_id, plate);
        ad.plate = Some(plate.clone());

        match self.store.insert(&ad, &plate) {
            Ok(PersistOutcome::Created) => {
                self.announce(&ad, &plate).await;
                Ok(AdOutcome::Created)
            }
            Ok(PersistOutcome::Duplicate) => {
                info!("Ad {} already stored, skipping", summary.ad_id);
                Ok(AdOutcome::Duplicate)
            }
            Err(e) => {
                error!("Failed to persist ad {}: {}", summary.ad_id, e);
                Err(FailureReason::Persist)
            }
        }
    }

    /// Detail fetch with the one-shot retry for empty galleries. A fetch
    /// error counts as an empty gallery and enters the same path.
    async fn fetch_detail_with_retry(
        &self,
        summary: &AdSummary,
    ) -> Result<AdDetail, FailureReason> {
        if let Some(detail) = self.try_fetch_detail(summary).await {
            return Ok(detail);
        }

        warn!(
            "No images for ad {}, retrying once in {}s",
            summary.ad_id, self.config.no_images_retry_delay_secs
        );
        tokio::time::sleep(Duration::from_secs(self.config.no_images_retry_delay_secs)).await;

        match self.try_fetch_detail(summary).await {
            Some(detail) => Ok(detail),
            None => {
                warn!("Still no images for ad {}, marking failed", summary.ad_id);
                Err(FailureReason::NoImages)
            }
        }
    }

    async fn try_fetch_detail(&self, summary: &AdSummary) -> Option<AdDetail> {
        match self.source.fetch_ad_detail(&summary.url).await {
            Ok(detail) if !detail.image_urls.is_empty() => Some(detail),
            Ok(_) => None,
            Err(e) => {
                warn!("Detail fetch failed for ad {}: {}", summary.ad_id, e);
                None
            }
        }
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        match &self.config.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                TempDir::new_in(dir)
            }
            None => TempDir::new(),
        }
    }

    /// Download the ad's photos into scratch, best-effort and bounded.
    /// Failed downloads are dropped; ordering does not matter downstream.
    async fn download_images(&self, urls: &[String], dest: &Path) -> Vec<PathBuf> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_images));

        let downloads = urls.iter().map(|url| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                match self.images.fetch(url, dest).await {
                    Ok(path) => {
                        metrics::IMAGES_DOWNLOADED.inc();
                        Some(path)
                    }
                    Err(e) => {
                        warn!("Dropping image {}: {}", url, e);
                        metrics::IMAGES_DROPPED.inc();
                        None
                    }
                }
            }
        });

        join_all(downloads).await.into_iter().flatten().collect()
    }

    /// One OCR call per downloaded image, bounded. A failed call
    /// contributes an empty read-set, same as an unreadable photo.
    async fn recognize_all(&self, images: &[PathBuf]) -> Vec<Vec<String>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_images));

        let reads = images.iter().map(|path| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return Vec::new();
                };
                match self.recognizer.recognize(path).await {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        warn!("OCR failed for {:?}: {}", path, e);
                        Vec::new()
                    }
                }
            }
        });

        join_all(reads).await
    }

    /// Fire-and-forget announcement with cross-references to prior ads on
    /// the same plate. Delivery problems are logged and dropped.
    async fn announce(&self, ad: &Ad, plate: &str) {
        let prior_links: Vec<String> = match self.store.find_by_plate(plate) {
            Ok(ads) => ads
                .into_iter()
                .filter(|existing| existing.ad_id != ad.ad_id)
                .map(|existing| existing.ad_link)
                .collect(),
            Err(e) => {
                warn!("Cross-reference lookup failed for {}: {}", plate, e);
                Vec::new()
            }
        };

        if !prior_links.is_empty() {
            info!(
                "Plate {} already has {} prior ads on record",
                plate,
                prior_links.len()
            );
        }

        if let Err(e) = self.notifier.notify(ad, &prior_links).await {
            warn!("Notification for ad {} failed: {}", ad.ad_id, e);
        }
    }
}
