// src/store.rs
//
// Local state between runs, all under one output directory:
//   listings.json       every listing from the last scrape
//   new_listings.json   the ones that passed the filter and were not seen before
//   seen_listings.json  ids ever examined (sorted JSON array)
//   sheet_id.txt        spreadsheet id once one has been created
//   sheet_preview.csv   dry-run stand-in for the sheet upload

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::config::{consts::*, Secrets};
use crate::error::Result;
use crate::file::{read_json, read_json_or_default, write_atomic, write_json};
use crate::listing::Listing;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet(BTreeSet<String>);

impl SeenSet {
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// True if the id was not there before.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SeenSet(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone, Debug)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path { &self.dir }
    pub fn listings_path(&self) -> PathBuf { self.dir.join(LISTINGS_FILE) }
    pub fn new_listings_path(&self) -> PathBuf { self.dir.join(NEW_LISTINGS_FILE) }
    pub fn seen_path(&self) -> PathBuf { self.dir.join(SEEN_FILE) }
    pub fn sheet_id_path(&self) -> PathBuf { self.dir.join(SHEET_ID_FILE) }
    pub fn preview_path(&self) -> PathBuf { self.dir.join(SHEET_PREVIEW_FILE) }
    pub fn log_path(&self) -> PathBuf { self.dir.join(LOG_FILE) }

    pub fn load_seen(&self) -> Result<SeenSet> {
        read_json_or_default(&self.seen_path())
    }

    pub fn save_seen(&self, seen: &SeenSet) -> Result<()> {
        write_json(&self.seen_path(), seen)
    }

    pub fn save_listings(&self, all: &[Listing], new: &[Listing]) -> Result<()> {
        write_json(&self.listings_path(), all)?;
        write_json(&self.new_listings_path(), new)?;
        tracing::debug!(
            dir = %self.dir.display(),
            all = all.len(),
            new = new.len(),
            "saved listings"
        );
        Ok(())
    }

    /// New listings from the last scrape; `None` if no scrape has written the file.
    pub fn load_new_listings(&self) -> Result<Option<Vec<Listing>>> {
        let path = self.new_listings_path();
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    /// `GOOGLE_SHEET_ID` wins (CI has no persistent disk), then the saved file.
    pub fn sheet_id(&self, secrets: &Secrets) -> Option<String> {
        if let Some(id) = secrets.google_sheet_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return Some(id.to_string());
        }
        let text = fs::read_to_string(self.sheet_id_path()).ok()?;
        let id = text.trim();
        if id.is_empty() { None } else { Some(id.to_string()) }
    }

    pub fn save_sheet_id(&self, id: &str) -> Result<()> {
        write_atomic(&self.sheet_id_path(), id.as_bytes())
    }
}

/// Load listings from any JSON file (`sheets --upload FILE`).
pub fn load_listings(path: &Path) -> Result<Vec<Listing>> {
    read_json(path)
}
