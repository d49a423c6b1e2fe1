// src/core/net.rs
//
// Shared blocking HTTP plumbing. Each integration owns its own client and
// endpoints; this only fixes timeouts, user agent and status handling.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::config::consts::{HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::core::sanitize::truncate_chars;
use crate::error::{Error, Result};

pub fn client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Pass 2xx responses through; turn anything else into `Error::Status`
/// carrying the (trimmed) body so API error messages reach the user.
pub fn check(service: &'static str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    tracing::debug!(service, status = status.as_u16(), %body, "request failed");
    Err(Error::Status {
        service,
        status: status.as_u16(),
        body: truncate_chars(body.trim(), 500),
    })
}

/// `check` then decode the JSON body.
pub fn json<T: DeserializeOwned>(service: &'static str, resp: Response) -> Result<T> {
    let resp = check(service, resp)?;
    let bytes = resp.bytes()?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Strip a trailing slash so `format!("{base}/path")` is always well-formed.
pub fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}
