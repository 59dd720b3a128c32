//! HTTP notifier posting new-ad announcements to the delivery service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Notifier, NotifyError};
use crate::source::Ad;

/// Notification delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Delivery endpoint, e.g. "http://localhost:8000/notify/".
    pub url: String,
    /// Request timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    10
}

/// Wire payload for one announcement.
#[derive(Debug, Serialize)]
struct NotifyPayload<'a> {
    title: &'a str,
    price_minor: i64,
    ad_link: &'a str,
    drive: &'a str,
    city: &'a str,
    year: Option<u32>,
    phone_number: &'a str,
    plate: Option<&'a str>,
    /// Links of earlier ads for the same plate, discovery order.
    prior_ad_links: &'a [String],
}

/// JSON-POSTing notifier.
pub struct HttpNotifier {
    client: Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, ad: &Ad, prior_ad_links: &[String]) -> Result<(), NotifyError> {
        let payload = NotifyPayload {
            title: &ad.title,
            price_minor: ad.price_minor,
            ad_link: &ad.ad_link,
            drive: &ad.drive_type,
            city: &ad.city,
            year: ad.year,
            phone_number: &ad.phone_number,
            plate: ad.plate.as_deref(),
            prior_ad_links,
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("HTTP {}: {}", status, body)));
        }

        debug!(
            "Announced ad {} ({} cross-references)",
            ad.ad_id,
            prior_ad_links.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let ad = Ad {
            ad_id: 184467,
            title: "Toyota Mark II".to_string(),
            price_minor: 120_000_000,
            city: "Хабаровск".to_string(),
            drive_type: "Задний".to_string(),
            year: Some(2001),
            phone_number: "+7-914-555-12-34".to_string(),
            ad_link: "https://example.org/sales/184467".to_string(),
            image_urls: vec![],
            plate: Some("Х471НК96".to_string()),
        };
        let links = vec!["https://example.org/sales/100".to_string()];
        let payload = NotifyPayload {
            title: &ad.title,
            price_minor: ad.price_minor,
            ad_link: &ad.ad_link,
            drive: &ad.drive_type,
            city: &ad.city,
            year: ad.year,
            phone_number: &ad.phone_number,
            plate: ad.plate.as_deref(),
            prior_ad_links: &links,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["plate"], "Х471НК96");
        assert_eq!(json["prior_ad_links"].as_array().unwrap().len(), 1);
        assert_eq!(json["price_minor"], 120_000_000);
    }
}
