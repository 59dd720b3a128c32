//! Ad source abstraction.
//!
//! The listing site is an external, rate-sensitive collaborator. The core
//! consumes it through the narrow [`AdSource`] seam; the production
//! implementation ([`KochkaSource`]) scrapes the public HTML.

mod kochka;
mod types;

pub use kochka::{KochkaConfig, KochkaSource};
pub use types::{
    drive_from_chassis, parse_price_minor, split_title_year, Ad, AdDetail, AdSummary, SourceError,
};

use async_trait::async_trait;

/// External provider of ad listings.
#[async_trait]
pub trait AdSource: Send + Sync {
    /// Fetch the current listing page, newest-first as the site orders it.
    /// The orchestrator re-sorts ascending before processing.
    async fn fetch_ad_list(&self) -> Result<Vec<AdSummary>, SourceError>;

    /// Fetch one ad's detail payload. `image_urls` may legitimately come
    /// back empty; the orchestrator owns the retry policy for that case.
    async fn fetch_ad_detail(&self, url: &str) -> Result<AdDetail, SourceError>;
}
