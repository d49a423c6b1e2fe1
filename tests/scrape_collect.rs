// tests/scrape_collect.rs
use std::{collections::HashMap, sync::Mutex};

use serde_json::{json, Value};
use url::Url;

use home_search::config::{AreaSelector, ScrapeOptions};
use home_search::criteria::Criteria;
use home_search::error::{Error, Result};
use home_search::progress::RecordingProgress;
use home_search::scrape::{collect, ListingSource};
use home_search::store::Workspace;

/// Items keyed by Rightmove region id; regions listed in `fail` error out.
#[derive(Default)]
struct FakeSource {
    items: HashMap<String, Vec<Value>>,
    fail: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    fn with(mut self, region: u32, items: Vec<Value>) -> Self {
        self.items.insert(format!("REGION^{region}"), items);
        self
    }
}

fn region(url: &Url) -> String {
    url.query_pairs()
        .find(|(k, _)| k == "locationIdentifier")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

impl ListingSource for FakeSource {
    fn fetch(&self, search_url: &Url, _max_items: u32) -> Result<Vec<Value>> {
        let r = region(search_url);
        self.calls.lock().unwrap().push(r.clone());
        if self.fail.contains(&r) {
            return Err(Error::Status { service: "fake", status: 502, body: "down".into() });
        }
        Ok(self.items.get(&r).cloned().unwrap_or_default())
    }
}

fn item(id: u32, beds: u32, kind: &str) -> Value {
    json!({
        "url": format!("https://www.rightmove.co.uk/properties/{id}"),
        "price": "£700,000",
        "address": format!("{id} Test Road"),
        "bedrooms": beds,
        "propertySubType": kind,
    })
}

fn opts(areas: &str) -> ScrapeOptions {
    ScrapeOptions {
        areas: AreaSelector::parse_list(areas),
        workers: 2,
        pause_ms: 0,
        ..ScrapeOptions::default()
    }
}

const BARNET: u32 = 93536;
const SUTTON: u32 = 40444;

#[test]
fn filters_dedupes_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let criteria = Criteria::builtin();
    let source = FakeSource::default()
        .with(BARNET, vec![item(1, 4, "Detached"), item(2, 3, "Detached"), item(3, 4, "Semi-Detached")])
        // 3 again: listed in two neighbouring areas
        .with(SUTTON, vec![item(3, 4, "Semi-Detached"), item(4, 4, "Flat")]);

    let mut progress = RecordingProgress::default();
    let out = collect(&source, &criteria, &opts("Barnet,Sutton"), &ws, Some(&mut progress)).unwrap();

    assert_eq!(out.all.len(), 4);
    let new: Vec<&str> = out.new.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(new, ["1", "3"]);
    assert_eq!(out.rejected, 2);
    assert_eq!(out.new[1].area, "Barnet");
    assert!(out.failed_areas.is_empty());
    assert!(progress.finished);
    assert_eq!(progress.done.len(), 2);

    // everything examined is remembered, accepted or not
    let seen = ws.load_seen().unwrap();
    assert_eq!(seen.iter().collect::<Vec<_>>(), ["1", "2", "3", "4"]);
    assert_eq!(ws.load_new_listings().unwrap().unwrap().len(), 2);
}

#[test]
fn second_run_finds_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let criteria = Criteria::builtin();
    let source = FakeSource::default().with(BARNET, vec![item(1, 4, "Detached")]);

    let first = collect(&source, &criteria, &opts("Barnet"), &ws, None).unwrap();
    assert_eq!(first.new.len(), 1);

    let second = collect(&source, &criteria, &opts("Barnet"), &ws, None).unwrap();
    assert_eq!(second.all.len(), 1);
    assert!(second.new.is_empty());
    assert_eq!(ws.load_new_listings().unwrap(), Some(vec![]));
}

#[test]
fn one_failing_area_does_not_stop_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let criteria = Criteria::builtin();
    let source = FakeSource {
        fail: vec![format!("REGION^{SUTTON}")],
        ..FakeSource::default().with(BARNET, vec![item(1, 4, "Detached")])
    };

    let mut progress = RecordingProgress::default();
    let out = collect(&source, &criteria, &opts("Barnet,Sutton"), &ws, Some(&mut progress)).unwrap();
    assert_eq!(out.new.len(), 1);
    assert_eq!(out.failed_areas, ["Sutton"]);
    assert_eq!(progress.failed, ["Sutton"]);
}

#[test]
fn every_area_failing_is_an_error_and_saves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let criteria = Criteria::builtin();
    let source = FakeSource { fail: vec![format!("REGION^{BARNET}")], ..Default::default() };

    let err = collect(&source, &criteria, &opts("Barnet"), &ws, None).unwrap_err();
    assert!(matches!(err, Error::Status { status: 502, .. }));
    assert!(!ws.seen_path().exists());
}

#[test]
fn unknown_areas_are_reported_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let criteria = Criteria::builtin();
    let source = FakeSource::default();

    let out = collect(&source, &criteria, &opts("Atlantis"), &ws, None).unwrap();
    assert_eq!(out.unknown_areas, ["Atlantis"]);
    assert!(out.all.is_empty());
    assert!(source.calls.lock().unwrap().is_empty());
}

#[test]
fn all_areas_are_fetched_once_each() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let criteria = Criteria::builtin();
    let source = FakeSource::default();

    collect(&source, &criteria, &opts(""), &ws, None).unwrap();
    let mut calls = source.calls.lock().unwrap().clone();
    calls.sort();
    calls.dedup();
    assert_eq!(calls.len(), criteria.areas.len());
}
