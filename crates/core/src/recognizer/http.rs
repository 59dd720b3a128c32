//! HTTP client for the plate-recognition service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::{PlateRecognizer, RecognizerError};

/// Recognition service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Service base URL, e.g. "http://localhost:8400".
    pub url: String,
    /// Request timeout in seconds (default: 60). OCR on large photos is
    /// slow, so this sits well above the usual HTTP default.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    60
}

/// Client for a recognition service exposing `POST /recognize` with a
/// multipart `image` part, answering `{"plates": ["X471HK96", ...]}`.
pub struct HttpPlateRecognizer {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    plates: Vec<String>,
}

impl HttpPlateRecognizer {
    pub fn new(config: RecognizerConfig) -> Result<Self, RecognizerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let url = format!("{}/recognize", config.url.trim_end_matches('/'));
        Ok(Self { client, url })
    }
}

#[async_trait]
impl PlateRecognizer for HttpPlateRecognizer {
    async fn recognize(&self, image: &Path) -> Result<Vec<String>, RecognizerError> {
        let bytes = tokio::fs::read(image).await?;
        let file_name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let form = Form::new().part("image", Part::bytes(bytes).file_name(file_name));

        let response = self.client.post(&self.url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(RecognizerError::Api(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let body: RecognizeResponse = response.json().await?;
        debug!("Recognizer returned {} candidates for {:?}", body.plates.len(), image);
        Ok(body.plates)
    }
}
