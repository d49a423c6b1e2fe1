// src/sheets/manager.rs
//
// Spreadsheet layout and the upload policy.
//
// Tabs (fixed ids so row inserts can address them):
//   0 "Property Listings"  newest first, one row per listing
//   1 "Search Areas"       the criteria area table
//   2 "Seen Listings"      listing id + first-seen timestamp, append-only

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::client::{SheetsApi, Tab};
use crate::config::{consts::DEFAULT_SHEET_TITLE, Secrets};
use crate::criteria::Criteria;
use crate::error::Result;
use crate::listing::Listing;
use crate::store::{SeenSet, Workspace};

pub const LISTINGS_TAB: Tab = Tab { id: 0, title: "Property Listings", frozen_rows: 1 };
pub const AREAS_TAB: Tab = Tab { id: 1, title: "Search Areas", frozen_rows: 1 };
pub const SEEN_TAB: Tab = Tab { id: 2, title: "Seen Listings", frozen_rows: 1 };

pub const LISTING_HEADERS: [&str; 11] = [
    "Date Added", "Date Listed", "Area", "Distance (km)", "Price",
    "Address", "Bedrooms", "Property Type", "URL", "Status", "Notes",
];
pub const AREA_HEADERS: [&str; 5] = [
    "Area", "Commute to Moorgate", "Grammar Schools", "Outstanding Primary", "Priority",
];
pub const SEEN_HEADERS: [&str; 2] = ["Listing ID", "First Seen Date"];

const STATUS_NEW: &str = "New";

pub fn sheet_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{id}")
}

fn header_row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

/// Column letter for a 1-based column index (1 → A, 11 → K, 27 → AA).
fn column_letter(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn range(tab: &Tab, first_row: usize, cols: usize, last_row: usize) -> String {
    format!("{}!A{first_row}:{}{last_row}", tab.title, column_letter(cols))
}

/// New spreadsheet with all three tabs and their header rows; returns its id.
pub fn create_sheet(api: &dyn SheetsApi, title: &str, criteria: &Criteria) -> Result<String> {
    let id = api.create(title, &[LISTINGS_TAB, AREAS_TAB, SEEN_TAB])?;

    api.update_values(
        &id,
        &range(&LISTINGS_TAB, 1, LISTING_HEADERS.len(), 1),
        &[header_row(&LISTING_HEADERS)],
    )?;

    let mut area_rows = vec![header_row(&AREA_HEADERS)];
    area_rows.extend(criteria.areas.iter().map(|a| a.table_row()));
    api.update_values(&id, &range(&AREAS_TAB, 1, AREA_HEADERS.len(), area_rows.len()), &area_rows)?;

    api.update_values(
        &id,
        &range(&SEEN_TAB, 1, SEEN_HEADERS.len(), 1),
        &[header_row(&SEEN_HEADERS)],
    )?;

    Ok(id)
}

/// Ids in the Seen Listings tab (header skipped).
pub fn seen_ids(api: &dyn SheetsApi, id: &str) -> Result<SeenSet> {
    let rows = api.get_values(id, &format!("{}!A:A", SEEN_TAB.title))?;
    Ok(rows
        .into_iter()
        .skip(1)
        .filter_map(|r| r.into_iter().next())
        .filter(|cell| !cell.is_empty())
        .collect())
}

/// The eleven cells of a Property Listings row.
pub fn listing_row(listing: &Listing, criteria: &Criteria, now: DateTime<Utc>) -> Vec<String> {
    let distance = criteria
        .area(&listing.area)
        .map(|a| a.distance_km.to_string())
        .unwrap_or_default();
    let kind = if listing.property_type.is_empty() {
        listing.description.clone()
    } else {
        listing.property_type.clone()
    };
    vec![
        now.format("%Y-%m-%d").to_string(),
        listing.added_date.clone(),
        listing.area.clone(),
        distance,
        listing.price.clone(),
        listing.address.clone(),
        listing.bedrooms.map(|b| b.to_string()).unwrap_or_default(),
        kind,
        listing.url.clone(),
        STATUS_NEW.to_string(),
        String::new(),
    ]
}

/// Put listings at the top of the Property Listings tab and record their ids
/// in Seen Listings.
///
/// With `mark_new`, ids already in Seen Listings are skipped. Listings whose
/// area could not be determined never go in. Returns the listings recorded as
/// seen for the first time.
pub fn upload_listings(
    api: &dyn SheetsApi,
    id: &str,
    listings: &[Listing],
    mark_new: bool,
    criteria: &Criteria,
    now: DateTime<Utc>,
) -> Result<Vec<Listing>> {
    let seen = seen_ids(api, id)?;

    let candidates: Vec<&Listing> = listings
        .iter()
        .filter(|l| !mark_new || !seen.contains(&l.id))
        .collect();
    if candidates.is_empty() {
        tracing::info!("no new listings to upload");
        return Ok(Vec::new());
    }

    let candidates: Vec<&Listing> = candidates.into_iter().filter(|l| l.has_known_area()).collect();
    if candidates.is_empty() {
        tracing::info!("no listings with a known area to upload");
        return Ok(Vec::new());
    }

    let mut rows = Vec::with_capacity(candidates.len());
    let mut seen_rows = Vec::new();
    let mut recorded = Vec::new();
    let mut batch_ids: HashSet<&str> = HashSet::new();

    for l in &candidates {
        rows.push(listing_row(l, criteria, now));
        let key = if l.id.is_empty() { l.url.as_str() } else { l.id.as_str() };
        if !seen.contains(key) && batch_ids.insert(key) {
            seen_rows.push(vec![key.to_string(), now.to_rfc3339()]);
            recorded.push((*l).clone());
        }
    }

    // newest at the top, under the header
    api.insert_rows(id, LISTINGS_TAB.id, 1, rows.len())?;
    api.update_values(id, &range(&LISTINGS_TAB, 2, LISTING_HEADERS.len(), rows.len() + 1), &rows)?;

    if !seen_rows.is_empty() {
        api.append_values(id, &format!("{}!A:B", SEEN_TAB.title), &seen_rows)?;
    }

    tracing::info!(rows = rows.len(), first_seen = recorded.len(), url = %sheet_url(id), "uploaded listings");
    Ok(recorded)
}

/// The configured spreadsheet id, creating "London Home Search" when there is none.
pub fn ensure_sheet(
    api: &dyn SheetsApi,
    ws: &Workspace,
    secrets: &Secrets,
    criteria: &Criteria,
) -> Result<String> {
    if let Some(id) = ws.sheet_id(secrets) {
        return Ok(id);
    }
    tracing::info!("no sheet found, creating one");
    let id = create_sheet(api, DEFAULT_SHEET_TITLE, criteria)?;
    ws.save_sheet_id(&id)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(11), "K");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
    }

    #[test]
    fn ranges_are_a1() {
        assert_eq!(range(&LISTINGS_TAB, 2, 11, 4), "Property Listings!A2:K4");
        assert_eq!(range(&AREAS_TAB, 1, 5, 12), "Search Areas!A1:E12");
    }
}
