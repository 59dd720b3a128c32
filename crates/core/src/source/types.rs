//! Typed records for the ad source boundary.
//!
//! The listing site exposes loosely structured text (price with currency
//! glyphs, year folded into the title, drive type inside a chassis blurb).
//! Everything is mapped into typed records here, at the adapter boundary,
//! so core logic never touches raw site output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry from the listing page, before detail enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSummary {
    /// Source-assigned numeric id. Primary identity for dedup and the
    /// checkpoint ordering domain.
    pub ad_id: u64,
    /// Raw listing title (may carry a trailing ", <year>").
    pub title: String,
    /// Canonical ad URL.
    pub url: String,
    /// City as listed.
    pub city: String,
    /// Price text as listed, e.g. "1 200 000 ₽".
    pub price_text: String,
    /// Chassis blurb, e.g. "седан, задний привод".
    pub chassis_info: String,
    /// Seller phone, already normalized. May be empty.
    pub phone_number: String,
}

/// Detail-page payload for one ad.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdDetail {
    /// Full-size photo URLs in gallery order. May be empty.
    pub image_urls: Vec<String>,
    /// Property table from the detail page, name → value.
    pub attributes: HashMap<String, String>,
}

/// A fully enriched listing instance. Immutable once persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub ad_id: u64,
    pub title: String,
    /// Smallest currency unit.
    pub price_minor: i64,
    pub city: String,
    pub drive_type: String,
    pub year: Option<u32>,
    /// May be empty when the source did not expose it.
    pub phone_number: String,
    pub ad_link: String,
    pub image_urls: Vec<String>,
    /// Set by consensus, never mutated afterwards.
    pub plate: Option<String>,
}

// Detail-page property labels as the site prints them.
const ATTR_YEAR: &str = "Год";
const ATTR_DRIVE: &str = "Привод";
const ATTR_CITY: &str = "Город";

impl Ad {
    /// Build the typed record from a listing summary plus its detail page.
    ///
    /// Detail attributes win over listing-derived values; the listing text
    /// is the fallback when the property table misses an entry.
    pub fn assemble(summary: &AdSummary, detail: &AdDetail) -> Ad {
        let (title, title_year) = split_title_year(&summary.title);

        let year = detail
            .attributes
            .get(ATTR_YEAR)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .or(title_year);

        let drive_type = detail
            .attributes
            .get(ATTR_DRIVE)
            .map(|v| v.trim().to_string())
            .or_else(|| drive_from_chassis(&summary.chassis_info))
            .unwrap_or_default();

        let city = detail
            .attributes
            .get(ATTR_CITY)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| summary.city.clone());

        Ad {
            ad_id: summary.ad_id,
            title,
            price_minor: parse_price_minor(&summary.price_text),
            city,
            drive_type,
            year,
            phone_number: summary.phone_number.clone(),
            ad_link: summary.url.clone(),
            image_urls: detail.image_urls.clone(),
            plate: None,
        }
    }
}

/// Split a trailing ", <4-digit year>" off the title.
pub fn split_title_year(title: &str) -> (String, Option<u32>) {
    if let Some((head, tail)) = title.rsplit_once(", ") {
        let tail = tail.trim();
        if tail.len() == 4 && tail.chars().all(|c| c.is_ascii_digit()) {
            return (head.trim().to_string(), tail.parse().ok());
        }
    }
    (title.trim().to_string(), None)
}

/// Price text → smallest currency unit. Non-digits are ignored, so
/// "1 200 000 ₽" parses the same as "1200000".
pub fn parse_price_minor(price_text: &str) -> i64 {
    let digits: String = price_text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().map(|whole| whole * 100).unwrap_or(0)
}

/// Pull the drive type out of a chassis blurb: second comma-separated part,
/// first word, capitalized.
pub fn drive_from_chassis(chassis_info: &str) -> Option<String> {
    let part = chassis_info.split(", ").nth(1)?;
    let word = part.split_whitespace().next()?;
    let mut chars = word.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect())
}

/// Errors from the ad source collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse source page: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> AdSummary {
        AdSummary {
            ad_id: 184467,
            title: "Toyota Mark II, 2001".to_string(),
            url: "https://example.org/sales/184467".to_string(),
            city: "Хабаровск".to_string(),
            price_text: "1 200 000 ₽".to_string(),
            chassis_info: "седан, задний привод".to_string(),
            phone_number: "+7-914-555-12-34".to_string(),
        }
    }

    #[test]
    fn test_split_title_year() {
        assert_eq!(
            split_title_year("Toyota Mark II, 2001"),
            ("Toyota Mark II".to_string(), Some(2001))
        );
        // Model name with a comma but no year stays intact
        assert_eq!(
            split_title_year("Лада 2107, рестайлинг"),
            ("Лада 2107, рестайлинг".to_string(), None)
        );
        assert_eq!(split_title_year("Honda Fit"), ("Honda Fit".to_string(), None));
    }

    #[test]
    fn test_parse_price_minor() {
        assert_eq!(parse_price_minor("1 200 000 ₽"), 120_000_000);
        assert_eq!(parse_price_minor("350000"), 35_000_000);
        assert_eq!(parse_price_minor("договорная"), 0);
        assert_eq!(parse_price_minor(""), 0);
    }

    #[test]
    fn test_drive_from_chassis() {
        assert_eq!(
            drive_from_chassis("седан, задний привод"),
            Some("Задний".to_string())
        );
        assert_eq!(drive_from_chassis("седан"), None);
        assert_eq!(drive_from_chassis(""), None);
    }

    #[test]
    fn test_assemble_prefers_detail_attributes() {
        let mut detail = AdDetail::default();
        detail.image_urls = vec!["https://example.org/xl/1.jpg".to_string()];
        detail.attributes.insert("Год".to_string(), "2003".to_string());
        detail.attributes.insert("Привод".to_string(), "Полный".to_string());
        detail.attributes.insert("Город".to_string(), "Владивосток".to_string());

        let ad = Ad::assemble(&summary(), &detail);
        assert_eq!(ad.ad_id, 184467);
        assert_eq!(ad.title, "Toyota Mark II");
        assert_eq!(ad.year, Some(2003));
        assert_eq!(ad.drive_type, "Полный");
        assert_eq!(ad.city, "Владивосток");
        assert_eq!(ad.price_minor, 120_000_000);
        assert_eq!(ad.image_urls.len(), 1);
        assert!(ad.plate.is_none());
    }

    #[test]
    fn test_assemble_falls_back_to_listing_text() {
        let ad = Ad::assemble(&summary(), &AdDetail::default());
        assert_eq!(ad.year, Some(2001));
        assert_eq!(ad.drive_type, "Задний");
        assert_eq!(ad.city, "Хабаровск");
        assert!(ad.image_urls.is_empty());
    }
}
