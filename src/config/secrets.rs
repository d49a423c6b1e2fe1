// src/config/secrets.rs
//
// API tokens and credentials. A local TOML file keyed by the same names as the
// environment variables; any non-empty environment variable overrides the file
// so CI can run without one.

use std::{fmt, fs, path::Path};

use serde::Deserialize;

use super::consts::{CREDENTIALS_FILE, DEFAULT_WHATSAPP_FROM};
use crate::error::{Error, Result};

#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Secrets {
    #[serde(rename = "APIFY_API_TOKEN")]
    pub apify_api_token: Option<String>,
    #[serde(rename = "TWILIO_ACCOUNT_SID")]
    pub twilio_account_sid: Option<String>,
    #[serde(rename = "TWILIO_AUTH_TOKEN")]
    pub twilio_auth_token: Option<String>,
    #[serde(rename = "TWILIO_WHATSAPP_FROM")]
    pub twilio_whatsapp_from: Option<String>,
    #[serde(rename = "WHATSAPP_TO")]
    pub whatsapp_to: Option<String>,
    /// Service-account key JSON, inline.
    #[serde(rename = "GOOGLE_SERVICE_ACCOUNT")]
    pub google_service_account: Option<String>,
    #[serde(rename = "GOOGLE_SHEET_ID")]
    pub google_sheet_id: Option<String>,
    #[serde(rename = "GOOGLE_CREDENTIALS_FILE")]
    pub google_credentials_file: Option<String>,
}

const KEYS: &[&str] = &[
    "APIFY_API_TOKEN",
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
    "TWILIO_WHATSAPP_FROM",
    "WHATSAPP_TO",
    "GOOGLE_SERVICE_ACCOUNT",
    "GOOGLE_SHEET_ID",
    "GOOGLE_CREDENTIALS_FILE",
];

impl Secrets {
    /// Read `path` if it exists, then apply the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let text = if path.exists() {
            tracing::debug!(path = %path.display(), "reading secrets file");
            Some(fs::read_to_string(path)?)
        } else {
            None
        };
        Self::from_sources(text.as_deref(), |key| std::env::var(key).ok())
    }

    /// Merge an optional TOML document with a variable lookup (env wins).
    pub fn from_sources<F>(file_text: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut secrets: Secrets = match file_text {
            Some(text) => toml::from_str(text)?,
            None => Secrets::default(),
        };
        for key in KEYS {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *secrets.slot(key) = Some(value);
            }
        }
        Ok(secrets)
    }

    fn slot(&mut self, key: &str) -> &mut Option<String> {
        match key {
            "APIFY_API_TOKEN" => &mut self.apify_api_token,
            "TWILIO_ACCOUNT_SID" => &mut self.twilio_account_sid,
            "TWILIO_AUTH_TOKEN" => &mut self.twilio_auth_token,
            "TWILIO_WHATSAPP_FROM" => &mut self.twilio_whatsapp_from,
            "WHATSAPP_TO" => &mut self.whatsapp_to,
            "GOOGLE_SERVICE_ACCOUNT" => &mut self.google_service_account,
            "GOOGLE_SHEET_ID" => &mut self.google_sheet_id,
            _ => &mut self.google_credentials_file,
        }
    }

    pub fn apify_token(&self) -> Result<&str> {
        required(&self.apify_api_token, "APIFY_API_TOKEN")
    }

    pub fn whatsapp_from(&self) -> &str {
        optional(&self.twilio_whatsapp_from).unwrap_or(DEFAULT_WHATSAPP_FROM)
    }

    pub fn credentials_file(&self) -> &str {
        optional(&self.google_credentials_file).unwrap_or(CREDENTIALS_FILE)
    }
}

/// A configured value, trimmed; blank counts as unset.
fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Borrow a configured value or explain which key is missing.
pub fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    optional(value)
        .ok_or_else(|| Error::config(format!("{key} not set (environment or secrets file)")))
}

fn mask(value: &Option<String>) -> &'static str {
    if value.is_some() { "<set>" } else { "<unset>" }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("apify_api_token", &mask(&self.apify_api_token))
            .field("twilio_account_sid", &mask(&self.twilio_account_sid))
            .field("twilio_auth_token", &mask(&self.twilio_auth_token))
            .field("twilio_whatsapp_from", &self.twilio_whatsapp_from)
            .field("whatsapp_to", &mask(&self.whatsapp_to))
            .field("google_service_account", &mask(&self.google_service_account))
            .field("google_sheet_id", &self.google_sheet_id)
            .field("google_credentials_file", &self.google_credentials_file)
            .finish()
    }
}
