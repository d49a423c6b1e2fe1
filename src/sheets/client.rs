// src/sheets/client.rs
//
// Spreadsheet client: the handful of Sheets v4 calls the manager needs.

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::auth::TokenSource;
use crate::config::consts::SHEETS_BASE;
use crate::core::net;
use crate::error::{Error, Result};

const SERVICE: &str = "Google Sheets";

/// A tab to create with the spreadsheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tab {
    pub id: u32,
    pub title: &'static str,
    pub frozen_rows: u32,
}

pub trait SheetsApi {
    /// Create a spreadsheet with the given tabs; returns its id.
    fn create(&self, title: &str, tabs: &[Tab]) -> Result<String>;
    /// Overwrite `range` with `values` (RAW input).
    fn update_values(&self, spreadsheet: &str, range: &str, values: &[Vec<String>]) -> Result<()>;
    /// Append rows after the last row of the table in `range`.
    fn append_values(&self, spreadsheet: &str, range: &str, values: &[Vec<String>]) -> Result<()>;
    fn get_values(&self, spreadsheet: &str, range: &str) -> Result<Vec<Vec<String>>>;
    /// Insert `count` empty rows before zero-based row `start` of tab `tab_id`.
    fn insert_rows(&self, spreadsheet: &str, tab_id: u32, start: usize, count: usize) -> Result<()>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Created {
    spreadsheet_id: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub struct SheetsClient {
    http: Client,
    base: String,
    auth: Box<dyn TokenSource>,
}

impl SheetsClient {
    pub fn new(auth: Box<dyn TokenSource>) -> Result<Self> {
        Self::with_base(SHEETS_BASE, auth)
    }

    pub fn with_base(base: &str, auth: Box<dyn TokenSource>) -> Result<Self> {
        Ok(Self { http: net::client()?, base: net::trim_base(base), auth })
    }

    /// `{base}/{segments...}` with each segment percent-encoded (ranges have
    /// spaces and `!`).
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base)?;
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("Sheets base URL cannot take a path: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        Ok(req.bearer_auth(self.auth.access_token()?))
    }
}

impl SheetsApi for SheetsClient {
    fn create(&self, title: &str, tabs: &[Tab]) -> Result<String> {
        let sheets: Vec<Value> = tabs
            .iter()
            .map(|t| {
                json!({ "properties": {
                    "sheetId": t.id,
                    "title": t.title,
                    "gridProperties": { "frozenRowCount": t.frozen_rows },
                }})
            })
            .collect();
        let body = json!({ "properties": { "title": title }, "sheets": sheets });

        let req = self.http.post(self.url(&[])?).json(&body);
        let created: Created = net::json(SERVICE, self.authed(req)?.send()?)?;
        tracing::info!(id = %created.spreadsheet_id, %title, "created spreadsheet");
        Ok(created.spreadsheet_id)
    }

    fn update_values(&self, spreadsheet: &str, range: &str, values: &[Vec<String>]) -> Result<()> {
        let url = self.url(&[spreadsheet, "values", range])?;
        let req = self
            .http
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": values }));
        net::check(SERVICE, self.authed(req)?.send()?)?;
        Ok(())
    }

    fn append_values(&self, spreadsheet: &str, range: &str, values: &[Vec<String>]) -> Result<()> {
        let url = self.url(&[spreadsheet, "values", &format!("{range}:append")])?;
        let req = self
            .http
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "majorDimension": "ROWS", "values": values }));
        net::check(SERVICE, self.authed(req)?.send()?)?;
        Ok(())
    }

    fn get_values(&self, spreadsheet: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.url(&[spreadsheet, "values", range])?;
        let req = self.http.get(url);
        let vr: ValueRange = net::json(SERVICE, self.authed(req)?.send()?)?;
        Ok(vr
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    fn insert_rows(&self, spreadsheet: &str, tab_id: u32, start: usize, count: usize) -> Result<()> {
        let url = self.url(&[&format!("{spreadsheet}:batchUpdate")])?;
        let body = json!({ "requests": [{
            "insertDimension": {
                "range": {
                    "sheetId": tab_id,
                    "dimension": "ROWS",
                    "startIndex": start,
                    "endIndex": start + count,
                },
                "inheritFromBefore": false,
            }
        }]});
        let req = self.http.post(url).json(&body);
        net::check(SERVICE, self.authed(req)?.send()?)?;
        Ok(())
    }
}
