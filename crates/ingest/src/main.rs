//! Batch ingestion entry point.
//!
//! Run-once process: load config, wire the production collaborators into
//! the orchestrator, run one batch, log the report, exit. Scheduling
//! (cron, systemd timer) lives outside the process.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use prometheus::Encoder;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platewatch_core::{
    load_config, metrics, validate_config, AdSource, AdStore, CheckpointStore, FailedAdStore,
    FileCheckpointStore, FileFailedAdStore, HttpImageFetcher, HttpNotifier, HttpPlateRecognizer,
    ImageFetcher, IngestOrchestrator, KochkaSource, NoopNotifier, Notifier, PlateRecognizer,
    SqliteAdStore,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("PLATEWATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("platewatch-ingest {} starting", VERSION);
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Source: {}", config.source.base_url);
    info!("Recognizer: {}", config.recognizer.url);
    info!("Database path: {:?}", config.database.path);

    let registry = prometheus::Registry::new();
    for metric in metrics::all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metrics")?;
    }

    // Wire collaborators
    let source: Arc<dyn AdSource> = Arc::new(
        KochkaSource::new(config.source.clone()).context("Failed to create source client")?,
    );
    let images: Arc<dyn ImageFetcher> = Arc::new(
        HttpImageFetcher::new(config.source.timeout_secs)
            .context("Failed to create image fetcher")?,
    );
    let recognizer: Arc<dyn PlateRecognizer> = Arc::new(
        HttpPlateRecognizer::new(config.recognizer.clone())
            .context("Failed to create recognizer client")?,
    );
    let store: Arc<dyn AdStore> = Arc::new(
        SqliteAdStore::new(&config.database.path).context("Failed to open ad store")?,
    );
    let checkpoint: Arc<dyn CheckpointStore> = Arc::new(FileCheckpointStore::new(
        config.state.checkpoint_path.clone(),
    ));
    let failed: Arc<dyn FailedAdStore> = Arc::new(FileFailedAdStore::new(
        config.state.failed_ads_path.clone(),
    ));
    let notifier: Arc<dyn Notifier> = match config.notifier.clone() {
        Some(notifier_config) => Arc::new(
            HttpNotifier::new(notifier_config).context("Failed to create notifier")?,
        ),
        None => {
            info!("No notifier configured, announcements disabled");
            Arc::new(NoopNotifier)
        }
    };

    let orchestrator = IngestOrchestrator::new(
        config.orchestrator.clone(),
        source,
        images,
        recognizer,
        Arc::clone(&store),
        checkpoint,
        failed,
        notifier,
    );

    let report = orchestrator
        .run_batch()
        .await
        .context("Ingestion batch failed")?;

    info!(
        "Batch report: {}",
        serde_json::to_string(&report).unwrap_or_default()
    );
    if !report.failed.is_empty() {
        warn!(
            "{} ads were recorded as permanently failed",
            report.failed.len()
        );
    }
    if let Ok(stats) = store.stats() {
        info!(
            "Store now holds {} ads across {} plates",
            stats.ads, stats.plates
        );
    }

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&registry.gather(), &mut buffer).is_ok() {
        debug!("Metrics:\n{}", String::from_utf8_lossy(&buffer));
    }

    Ok(())
}
