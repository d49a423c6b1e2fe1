// src/sheets/mod.rs
pub mod auth;
pub mod client;
pub mod manager;

pub use auth::{Credentials, GoogleAuth, StaticToken, TokenSource};
pub use client::{SheetsApi, SheetsClient, Tab};
pub use manager::{create_sheet, ensure_sheet, listing_row, seen_ids, sheet_url, upload_listings};

use crate::config::Secrets;
use crate::error::Result;

/// Authenticated client from whatever credentials are configured.
pub fn connect(secrets: &Secrets) -> Result<SheetsClient> {
    let auth = GoogleAuth::from_secrets(secrets)?;
    SheetsClient::new(Box::new(auth))
}
