// src/notify/whatsapp.rs
//
// Messaging client: WhatsApp through Twilio's Messages API.

use std::path::Path;

use reqwest::blocking::Client;
use serde::Deserialize;

use super::message::format_batch_message;
use crate::config::consts::TWILIO_BASE;
use crate::config::secrets::{required, Secrets};
use crate::core::net;
use crate::error::Result;
use crate::file::read_json;
use crate::listing::Listing;

const SERVICE: &str = "Twilio";

/// Sends one text message; returns the provider's message id.
pub trait Messenger {
    fn send(&self, body: &str) -> Result<String>;
}

#[derive(Deserialize)]
struct MessageResource {
    sid: String,
}

pub struct TwilioClient {
    http: Client,
    base: String,
    account_sid: String,
    auth_token: String,
    from: String,
    to: String,
}

/// Twilio routes by channel prefix; a bare number would go out as SMS.
fn whatsapp_address(number: &str) -> String {
    let n = number.trim();
    if n.starts_with("whatsapp:") { n.to_string() } else { format!("whatsapp:{n}") }
}

impl TwilioClient {
    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        Self::with_base(TWILIO_BASE, secrets)
    }

    pub fn with_base(base: &str, secrets: &Secrets) -> Result<Self> {
        let account_sid = required(&secrets.twilio_account_sid, "TWILIO_ACCOUNT_SID")?;
        let auth_token = required(&secrets.twilio_auth_token, "TWILIO_AUTH_TOKEN")?;
        let to = required(&secrets.whatsapp_to, "WHATSAPP_TO")?;
        Ok(Self {
            http: net::client()?,
            base: net::trim_base(base),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from: whatsapp_address(secrets.whatsapp_from()),
            to: whatsapp_address(to),
        })
    }
}

impl Messenger for TwilioClient {
    fn send(&self, body: &str) -> Result<String> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base, self.account_sid
        );
        let resp = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", self.from.as_str()), ("To", self.to.as_str()), ("Body", body)])
            .send()?;
        let msg: MessageResource = net::json(SERVICE, resp)?;
        tracing::info!(sid = %msg.sid, chars = body.chars().count(), "WhatsApp sent");
        Ok(msg.sid)
    }
}

/// Message the listings stored at `path`.
/// `Ok(false)` when there is no file (nothing was scraped); an empty list is a
/// success with nothing sent.
pub fn notify_new_listings(
    messenger: &dyn Messenger,
    path: &Path,
    sheet_url: Option<&str>,
) -> Result<bool> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "no listings file to notify about");
        return Ok(false);
    }
    let listings: Vec<Listing> = read_json(path)?;
    notify_listings(messenger, &listings, sheet_url).map(|_| true)
}

/// Send the batch message; `None` if there was nothing to send.
pub fn notify_listings(
    messenger: &dyn Messenger,
    listings: &[Listing],
    sheet_url: Option<&str>,
) -> Result<Option<String>> {
    if listings.is_empty() {
        return Ok(None);
    }
    let body = format_batch_message(listings, sheet_url);
    messenger.send(&body).map(Some)
}
