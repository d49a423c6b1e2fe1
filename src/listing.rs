// src/listing.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::sanitize::parse_price;

/// A property listing in the shape we store, upload and message about.
/// Built from raw scraper output by `specs::rightmove::to_listing`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub url: String,
    /// Display price as the site shows it ("£650,000", "Offers over £700,000").
    pub price: String,
    pub address: String,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub property_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub added_date: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub area: String,
    pub scraped_at: DateTime<Utc>,
    pub source: String,
}

impl Listing {
    pub fn price_value(&self) -> Option<u32> {
        parse_price(&self.price)
    }

    pub fn has_known_area(&self) -> bool {
        !self.area.is_empty() && self.area != crate::config::consts::UNKNOWN
    }
}
