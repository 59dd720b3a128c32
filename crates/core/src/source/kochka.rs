//! Listing-site adapter for autokochka.ru.
//!
//! Scrapes the public listing and detail pages. Parsing is kept in pure
//! functions over `&str` so it is exercised from HTML fixtures without a
//! network; the `scraper::Html` DOM is also not `Send`, so it must never be
//! held across an await point.

use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{AdDetail, AdSummary, SourceError};
use super::AdSource;

static ITEM_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.sale-item.sale-block-item").unwrap());
static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a.sale-link").unwrap());
static CHASSIS_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".sale-chassis").unwrap());
static CITY_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".sale-city").unwrap());
static PRICE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".sale-price").unwrap());
static PHOTO_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".photo-gallery__item.js-photo-main, .photo-gallery__item.js-photo-slave")
        .unwrap()
});
static PROP_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".sale-properties .sale-property").unwrap());
static PROP_NAME_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".sale-property-name").unwrap());
static PROP_VALUE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".sale-property-value").unwrap());

/// Configuration for the autokochka source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KochkaConfig {
    /// Site root (default: `https://autokochka.ru`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Listing path, newest-first (default: `/sales/?sort=newest`).
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://autokochka.ru".to_string()
}

fn default_listing_path() -> String {
    "/sales/?sort=newest".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for KochkaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_path: default_listing_path(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Scraping client for the listing site.
pub struct KochkaSource {
    client: Client,
    base_url: String,
    listing_url: String,
}

impl KochkaSource {
    pub fn new(config: KochkaConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let listing_url = format!("{}{}", base_url, config.listing_path);
        Ok(Self {
            client,
            base_url,
            listing_url,
        })
    }

    /// Fetch the seller phone for one ad via the site's AJAX endpoint.
    ///
    /// Missing or failed lookups yield an empty string; the phone is
    /// best-effort enrichment and never blocks ingestion.
    async fn fetch_phone(&self, ad_id: u64) -> String {
        let url = format!("{}/ajax/sale/getPhone/?sale_id={}", self.base_url, ad_id);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Phone lookup failed for ad {}: {}", ad_id, e);
                return String::new();
            }
        };
        if !response.status().is_success() {
            warn!(
                "Phone lookup for ad {} returned HTTP {}",
                ad_id,
                response.status()
            );
            return String::new();
        }
        match response.json::<PhoneResponse>().await {
            Ok(body) if body.ok => body
                .data
                .phone
                .map(|raw| normalize_phone(&raw))
                .unwrap_or_default(),
            Ok(_) => {
                warn!("Phone not available for ad {}", ad_id);
                String::new()
            }
            Err(e) => {
                warn!("Phone lookup for ad {} returned bad payload: {}", ad_id, e);
                String::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl AdSource for KochkaSource {
    async fn fetch_ad_list(&self) -> Result<Vec<AdSummary>, SourceError> {
        debug!("Fetching listing page {}", self.listing_url);
        let html = self
            .client
            .get(&self.listing_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mut summaries = parse_listing_html(&html, &self.base_url)?;
        for summary in &mut summaries {
            summary.phone_number = self.fetch_phone(summary.ad_id).await;
        }
        debug!("Listing page yielded {} ads", summaries.len());
        Ok(summaries)
    }

    async fn fetch_ad_detail(&self, url: &str) -> Result<AdDetail, SourceError> {
        debug!("Fetching ad detail {}", url);
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_detail_html(&html))
    }
}

#[derive(Debug, Deserialize)]
struct PhoneResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    data: PhoneData,
}

#[derive(Debug, Default, Deserialize)]
struct PhoneData {
    phone: Option<String>,
}

/// Parse the listing page into summaries, document order (newest first).
///
/// Items without a parseable numeric `data-id` or without a title link are
/// skipped with a warning; one malformed block must not sink the page.
pub(crate) fn parse_listing_html(
    html: &str,
    base_url: &str,
) -> Result<Vec<AdSummary>, SourceError> {
    let document = Html::parse_document(html);
    let mut summaries = Vec::new();

    for item in document.select(&ITEM_SEL) {
        let Some(raw_id) = item.value().attr("data-id") else {
            warn!("Listing item without data-id, skipping");
            continue;
        };
        let Ok(ad_id) = raw_id.trim().parse::<u64>() else {
            warn!("Listing item with non-numeric data-id {:?}, skipping", raw_id);
            continue;
        };

        let Some(link) = item.select(&LINK_SEL).next() else {
            warn!("Listing item {} without title link, skipping", ad_id);
            continue;
        };
        let title = element_text(&link);
        let url = match link.value().attr("href") {
            Some(href) if href.starts_with("http") => href.to_string(),
            Some(href) => format!("{}{}", base_url, href),
            None => {
                warn!("Listing item {} link without href, skipping", ad_id);
                continue;
            }
        };

        summaries.push(AdSummary {
            ad_id,
            title,
            url,
            city: first_text(&item, &CITY_SEL),
            price_text: first_text(&item, &PRICE_SEL),
            chassis_info: first_text(&item, &CHASSIS_SEL),
            phone_number: String::new(),
        });
    }

    Ok(summaries)
}

/// Parse a detail page: photo gallery plus the property table.
///
/// Gallery thumbnails link the `md` rendition; the `xl` one is requested
/// instead. The gallery repeats its first photo as the main slide, so when
/// more than one item is present the first is dropped.
pub(crate) fn parse_detail_html(html: &str) -> AdDetail {
    let document = Html::parse_document(html);

    let mut image_urls: Vec<String> = document
        .select(&PHOTO_SEL)
        .filter_map(|photo| photo.value().attr("src"))
        .map(|src| src.replace("md", "xl"))
        .collect();
    if image_urls.len() > 1 {
        image_urls.remove(0);
    }

    let mut detail = AdDetail {
        image_urls,
        ..AdDetail::default()
    };

    for property in document.select(&PROP_SEL) {
        let name = first_text(&property, &PROP_NAME_SEL).replace(':', "");
        let value = first_text(&property, &PROP_VALUE_SEL);
        if !name.is_empty() {
            detail.attributes.insert(name.trim().to_string(), value);
        }
    }

    detail
}

fn first_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Normalize a seller phone to the `+7-XXX-XXX-XX-XX` form.
///
/// Accepts the site's `8XXXXXXXXXX` and bare ten-digit variants. Anything
/// that does not reduce to eleven digits is returned trimmed as-is.
pub fn normalize_phone(raw: &str) -> String {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('8') {
        digits.replace_range(0..1, "7");
    } else if digits.len() == 10 {
        digits.insert(0, '7');
    }
    if digits.len() != 11 {
        return raw.trim().to_string();
    }
    format!(
        "+7-{}-{}-{}-{}",
        &digits[1..4],
        &digits[4..7],
        &digits[7..9],
        &digits[9..11]
    )
}
