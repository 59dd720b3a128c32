//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of all external collaborator
//! traits, allowing full pipeline testing without a listing site, a
//! recognition service, or a delivery channel.
//!
//! # Example
//!
//! ```rust,ignore
//! use platewatch_core::testing::{fixtures, MockAdSource, MockPlateRecognizer};
//!
//! let source = MockAdSource::new();
//! source.set_summaries(vec![fixtures::summary(184467)]).await;
//! source.push_detail(
//!     &fixtures::summary(184467).url,
//!     fixtures::detail(&["http://img/1.jpg"]),
//! ).await;
//!
//! let recognizer = MockPlateRecognizer::new();
//! recognizer.set_reads("1.jpg", &["X471HK96"]).await;
//! ```

mod mock_image_fetcher;
mod mock_notifier;
mod mock_recognizer;
mod mock_source;

pub use mock_image_fetcher::MockImageFetcher;
pub use mock_notifier::{MockNotifier, SentNotification};
pub use mock_recognizer::MockPlateRecognizer;
pub use mock_source::MockAdSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::source::{AdDetail, AdSummary};

    /// A listing summary with plausible defaults, parameterized by id.
    pub fn summary(ad_id: u64) -> AdSummary {
        AdSummary {
            ad_id,
            title: "Toyota Mark II, 2001".to_string(),
            url: format!("https://example.org/sales/{ad_id}"),
            city: "Хабаровск".to_string(),
            price_text: "1 200 000 ₽".to_string(),
            chassis_info: "седан, задний привод".to_string(),
            phone_number: "+7-914-555-12-34".to_string(),
        }
    }

    /// A detail payload carrying the given photo URLs.
    pub fn detail(image_urls: &[&str]) -> AdDetail {
        AdDetail {
            image_urls: image_urls.iter().map(|u| u.to_string()).collect(),
            ..AdDetail::default()
        }
    }
}
