// src/scrape/scrape.rs
use std::{
    collections::HashSet,
    sync::{atomic::{AtomicUsize, Ordering}, mpsc},
    thread,
    time::Duration,
};

use chrono::Utc;
use serde_json::Value;
use url::Url;

use super::apify::{Account, ApifyClient, ListingSource};
use crate::{
    config::{consts::JITTER_MS, ScrapeOptions},
    criteria::Criteria,
    error::Result,
    listing::Listing,
    progress::Progress,
    specs::rightmove,
    store::Workspace,
};

/// What one scrape produced.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    /// Everything examined this run, accepted or not.
    pub all: Vec<Listing>,
    /// Accepted by the criteria and never seen before.
    pub new: Vec<Listing>,
    pub rejected: usize,
    pub failed_areas: Vec<String>,
    pub unknown_areas: Vec<String>,
}

/// Scrape the selected areas, filter, dedupe against earlier runs and persist.
///
/// One area failing is reported and skipped; only when every area fails is the
/// first error returned. Every listing examined is marked seen, so a rejected
/// listing is not re-evaluated tomorrow.
pub fn collect(
    source: &dyn ListingSource,
    criteria: &Criteria,
    opts: &ScrapeOptions,
    ws: &Workspace,
    mut progress: Option<&mut (dyn Progress + '_)>,
) -> Result<ScrapeOutcome> {
    let mut outcome = ScrapeOutcome::default();

    let (areas, unknown) = criteria.select(&opts.areas);
    for name in &unknown {
        tracing::warn!(area = %name, "unknown area");
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("Unknown area: {name}"));
        }
    }
    outcome.unknown_areas = unknown;

    if areas.is_empty() {
        tracing::warn!("no valid areas to scrape");
        if let Some(p) = progress.as_deref_mut() {
            p.log("No valid areas to scrape");
        }
        return Ok(outcome);
    }

    let jobs: Vec<(String, Url)> = areas
        .iter()
        .map(|a| Ok((a.name.clone(), rightmove::search_url(a, &criteria.requirements)?)))
        .collect::<Result<_>>()?;

    if let Some(p) = progress.as_deref_mut() {
        p.begin(jobs.len());
        p.log(&format!("Scraping {} areas...", jobs.len()));
    }

    let results = fetch_all(source, &jobs, opts, progress.as_deref_mut());

    let scraped_at = Utc::now();
    let mut seen = ws.load_seen()?;
    let mut this_run: HashSet<String> = HashSet::new();
    let mut first_error = None;

    for ((area, _), result) in jobs.iter().zip(results) {
        let items = match result {
            Ok(items) => items,
            Err(e) => {
                outcome.failed_areas.push(area.clone());
                first_error.get_or_insert(e);
                continue;
            }
        };

        for raw in &items {
            let Some(listing) = rightmove::to_listing(raw, area, scraped_at) else {
                tracing::debug!(%area, "skipping item without id or url");
                continue;
            };
            // same house can show up under two neighbouring areas
            if !this_run.insert(listing.id.clone()) {
                continue;
            }

            let verdict = criteria.evaluate(&listing);
            let fresh = seen.insert(listing.id.clone());
            if !verdict.is_accepted() {
                outcome.rejected += 1;
                tracing::debug!(id = %listing.id, %area, reasons = %verdict.reasons(), "rejected");
            } else if fresh {
                outcome.new.push(listing.clone());
            }
            outcome.all.push(listing);
        }
    }

    if outcome.failed_areas.len() == jobs.len() {
        if let Some(e) = first_error {
            if let Some(p) = progress.as_deref_mut() {
                p.finish();
            }
            return Err(e);
        }
    }

    ws.save_seen(&seen)?;
    ws.save_listings(&outcome.all, &outcome.new)?;

    tracing::info!(
        total = outcome.all.len(),
        new = outcome.new.len(),
        rejected = outcome.rejected,
        failed_areas = outcome.failed_areas.len(),
        "scrape finished"
    );
    if let Some(p) = progress.as_deref_mut() {
        p.log(&format!(
            "Total: {} listings, {} new, {} filtered out",
            outcome.all.len(),
            outcome.new.len(),
            outcome.rejected
        ));
        p.finish();
    }
    Ok(outcome)
}

/// Fetch every job on a small worker pool. Results come back in job order.
fn fetch_all(
    source: &dyn ListingSource,
    jobs: &[(String, Url)],
    opts: &ScrapeOptions,
    mut progress: Option<&mut (dyn Progress + '_)>,
) -> Vec<Result<Vec<Value>>> {
    let counter = AtomicUsize::new(0);
    let (res_tx, res_rx) = mpsc::channel::<(usize, Result<Vec<Value>>)>();
    let workers = opts.workers.min(jobs.len()).max(1);

    let mut slots: Vec<Option<Result<Vec<Value>>>> = (0..jobs.len()).map(|_| None).collect();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = res_tx.clone();
            let counter = &counter;
            scope.spawn(move || {
                loop {
                    let i = counter.fetch_add(1, Ordering::Relaxed);
                    let Some((area, url)) = jobs.get(i) else { break };
                    tracing::debug!(%area, %url, "fetching area");
                    let result = source.fetch(url, opts.max_items);
                    if tx.send((i, result)).is_err() {
                        break;
                    }
                    if opts.pause_ms > 0 {
                        let jitter = (i as u64 * 37) % JITTER_MS;
                        thread::sleep(Duration::from_millis(opts.pause_ms + jitter)); // be polite
                    }
                }
            });
        }
        drop(res_tx); // main thread is sole receiver now

        for (i, result) in res_rx.iter() {
            let area = jobs[i].0.as_str();
            match &result {
                Ok(items) => {
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_done(area, &format!("{} listings", items.len()));
                    }
                }
                Err(e) => {
                    tracing::error!(%area, error = %e, "area scrape failed");
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_failed(area, &e.to_string());
                    }
                }
            }
            slots[i] = Some(result);
        }
    });

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(crate::error::Error::config("worker exited early"))))
        .collect()
}

/// `scrape --test`: prove the token works.
pub fn test_connection(client: &ApifyClient) -> Result<Account> {
    let account = client.whoami()?;
    tracing::info!(user = %account.username, plan = ?account.plan, "connected to Apify");
    Ok(account)
}
