pub mod config;
pub mod consensus;
pub mod media;
pub mod metrics;
pub mod notifier;
pub mod orchestrator;
pub mod plate;
pub mod recognizer;
pub mod source;
pub mod state;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    StateConfig,
};
pub use consensus::consensus_plate;
pub use media::{HttpImageFetcher, ImageFetcher, MediaError};
pub use notifier::{HttpNotifier, NoopNotifier, Notifier, NotifierConfig, NotifyError};
pub use orchestrator::{
    BatchReport, FailedAd, FailureReason, IngestError, IngestOrchestrator, OrchestratorConfig,
};
pub use plate::{canonicalize, is_valid_plate};
pub use recognizer::{HttpPlateRecognizer, PlateRecognizer, RecognizerConfig, RecognizerError};
pub use source::{Ad, AdDetail, AdSource, AdSummary, KochkaConfig, KochkaSource, SourceError};
pub use state::{
    CheckpointStore, FailedAdStore, FileCheckpointStore, FileFailedAdStore, StateError,
};
pub use store::{AdStore, PersistOutcome, SqliteAdStore, StoreError, StoreStats};
