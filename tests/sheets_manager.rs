// tests/sheets_manager.rs
use std::cell::RefCell;

use chrono::{TimeZone, Utc};

use home_search::config::Secrets;
use home_search::criteria::Criteria;
use home_search::error::Result;
use home_search::listing::Listing;
use home_search::sheets::manager::{AREA_HEADERS, LISTING_HEADERS, SEEN_HEADERS};
use home_search::sheets::{
    create_sheet, ensure_sheet, listing_row, seen_ids, sheet_url, upload_listings, SheetsApi, Tab,
};
use home_search::store::Workspace;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create(String, Vec<String>),
    Update(String, usize),
    Append(String, Vec<Vec<String>>),
    Insert(u32, usize, usize),
}

/// In-memory spreadsheet: records calls; Seen Listings column A comes from `seen`.
#[derive(Default)]
struct FakeSheets {
    calls: RefCell<Vec<Call>>,
    seen: Vec<String>,
}

impl SheetsApi for FakeSheets {
    fn create(&self, title: &str, tabs: &[Tab]) -> Result<String> {
        let names = tabs.iter().map(|t| t.title.to_string()).collect();
        self.calls.borrow_mut().push(Call::Create(title.into(), names));
        Ok("sheet-1".into())
    }
    fn update_values(&self, _id: &str, range: &str, values: &[Vec<String>]) -> Result<()> {
        self.calls.borrow_mut().push(Call::Update(range.into(), values.len()));
        Ok(())
    }
    fn append_values(&self, _id: &str, range: &str, values: &[Vec<String>]) -> Result<()> {
        self.calls.borrow_mut().push(Call::Append(range.into(), values.to_vec()));
        Ok(())
    }
    fn get_values(&self, _id: &str, _range: &str) -> Result<Vec<Vec<String>>> {
        let mut rows = vec![vec![SEEN_HEADERS[0].to_string()]];
        rows.extend(self.seen.iter().map(|s| vec![s.clone()]));
        Ok(rows)
    }
    fn insert_rows(&self, _id: &str, tab_id: u32, start: usize, count: usize) -> Result<()> {
        self.calls.borrow_mut().push(Call::Insert(tab_id, start, count));
        Ok(())
    }
}

fn listing(id: &str, area: &str) -> Listing {
    Listing {
        id: id.into(),
        url: format!("https://www.rightmove.co.uk/properties/{id}"),
        price: "£700,000".into(),
        address: "1 Oak Road".into(),
        bedrooms: Some(4),
        bathrooms: None,
        property_type: "Detached".into(),
        description: "Lovely".into(),
        agent: String::new(),
        added_date: "Added on 01/03/2026".into(),
        images: vec![],
        area: area.into(),
        scraped_at: Utc::now(),
        source: "rightmove".into(),
    }
}

#[test]
fn create_lays_out_three_tabs() {
    let api = FakeSheets::default();
    let criteria = Criteria::builtin();
    let id = create_sheet(&api, "Houses", &criteria).unwrap();
    assert_eq!(id, "sheet-1");

    let calls = api.calls.borrow();
    assert_eq!(
        calls[0],
        Call::Create(
            "Houses".into(),
            vec!["Property Listings".into(), "Search Areas".into(), "Seen Listings".into()]
        )
    );
    assert_eq!(calls[1], Call::Update("Property Listings!A1:K1".into(), 1));
    assert_eq!(calls[2], Call::Update("Search Areas!A1:E12".into(), 12));
    assert_eq!(calls[3], Call::Update("Seen Listings!A1:B1".into(), 1));
}

#[test]
fn area_tab_headers_match_the_sheet() {
    assert_eq!(
        AREA_HEADERS,
        ["Area", "Commute to Moorgate", "Grammar Schools", "Outstanding Primary", "Priority"]
    );
}

#[test]
fn row_has_eleven_cells() {
    let criteria = Criteria::builtin();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap();
    let row = listing_row(&listing("9", "Barnet"), &criteria, now);
    assert_eq!(row.len(), LISTING_HEADERS.len());
    assert_eq!(row[0], "2026-03-02");
    assert_eq!(row[2], "Barnet");
    assert_eq!(row[3], "16");
    assert_eq!(row[7], "Detached");
    assert_eq!(row[9], "New");
    assert_eq!(row[10], "");
}

#[test]
fn upload_skips_seen_and_unknown_areas() {
    let api = FakeSheets { seen: vec!["1".into()], ..Default::default() };
    let criteria = Criteria::builtin();
    let now = Utc::now();
    let ls = vec![listing("1", "Barnet"), listing("2", "Sutton"), listing("3", "Unknown"), listing("4", "Purley")];

    let recorded = upload_listings(&api, "sheet-1", &ls, true, &criteria, now).unwrap();
    let ids: Vec<&str> = recorded.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["2", "4"]);

    let calls = api.calls.borrow();
    assert_eq!(calls[0], Call::Insert(0, 1, 2));
    assert_eq!(calls[1], Call::Update("Property Listings!A2:K3".into(), 2));
    match &calls[2] {
        Call::Append(range, rows) => {
            assert_eq!(range, "Seen Listings!A:B");
            let seen: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
            assert_eq!(seen, ["2", "4"]);
        }
        other => panic!("expected append, got {other:?}"),
    }
}

#[test]
fn upload_without_mark_new_rewrites_but_only_records_unseen() {
    let api = FakeSheets { seen: vec!["1".into()], ..Default::default() };
    let criteria = Criteria::builtin();
    let ls = vec![listing("1", "Barnet"), listing("2", "Sutton")];

    let recorded = upload_listings(&api, "sheet-1", &ls, false, &criteria, Utc::now()).unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(api.calls.borrow()[0], Call::Insert(0, 1, 2));
}

#[test]
fn nothing_to_upload_makes_no_writes() {
    let api = FakeSheets { seen: vec!["1".into()], ..Default::default() };
    let criteria = Criteria::builtin();
    let ls = vec![listing("1", "Barnet"), listing("5", "Unknown")];

    let recorded = upload_listings(&api, "sheet-1", &ls, true, &criteria, Utc::now()).unwrap();
    assert!(recorded.is_empty());
    assert!(api.calls.borrow().is_empty());
}

#[test]
fn seen_ids_skip_header() {
    let api = FakeSheets { seen: vec!["7".into(), "8".into()], ..Default::default() };
    let ids = seen_ids(&api, "sheet-1").unwrap();
    assert_eq!(ids.iter().collect::<Vec<_>>(), ["7", "8"]);
}

#[test]
fn ensure_sheet_creates_once_and_remembers() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let api = FakeSheets::default();
    let secrets = Secrets::default();
    let criteria = Criteria::builtin();

    assert_eq!(ensure_sheet(&api, &ws, &secrets, &criteria).unwrap(), "sheet-1");
    assert_eq!(ws.sheet_id(&secrets).as_deref(), Some("sheet-1"));
    let created = api.calls.borrow().len();

    assert_eq!(ensure_sheet(&api, &ws, &secrets, &criteria).unwrap(), "sheet-1");
    assert_eq!(api.calls.borrow().len(), created);

    assert_eq!(sheet_url("abc"), "https://docs.google.com/spreadsheets/d/abc");
}
