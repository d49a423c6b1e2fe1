// src/specs/mod.rs
//! # Listing-site specs
//!
//! Site-specific knowledge lives here: how to ask a listing site for the homes
//! we want, and how to read what the scraper hands back.
//!
//! ## What lives here
//! - **Search URL construction** from an [`Area`](crate::criteria::Area) and the
//!   [`Requirements`](crate::criteria::Requirements).
//! - **Tolerant extraction** of raw scraper items into [`Listing`](crate::listing::Listing):
//!   field-name fallbacks, string-or-number values, trimming of long text.
//! - **Identity**: the stable id a listing is deduplicated by.
//!
//! ## What does **not** live here
//! - Talking to the scraper service (`scrape::apify`).
//! - Deciding whether a listing is wanted (`criteria`).
//! - Persistence of seen ids and listing files (`store`).
//!
//! ## Typical call chain
//! ```text
//! runner → scrape::collect → specs::<site>::search_url → ListingSource::fetch
//!                          ↘ specs::<site>::to_listing → criteria::evaluate
//! ```
pub mod rightmove;
