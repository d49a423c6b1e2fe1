// src/scrape/mod.rs
pub mod apify;
mod scrape;

pub use apify::{Account, ApifyClient, ListingSource};
pub use scrape::{collect, test_connection, ScrapeOutcome};
