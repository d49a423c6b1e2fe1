// src/runner.rs
//
// Daily pipeline: scrape → (nothing new? stop) → record in sheet → notify.
//
// Services are passed in as trait objects so the CLI can hand over real
// clients and tests can hand over fakes. A missing spreadsheet is a warning.
// A missing scraper is an error when a scrape is asked for. A missing or
// failing messenger fails the run: scraping marks listings seen, so an
// unannounced listing would never be announced.

use std::path::PathBuf;

use chrono::Utc;

use crate::{
    config::{AppOptions, Secrets, Stage},
    criteria::Criteria,
    error::{Error, Result},
    export::write_table_to_path,
    listing::Listing,
    notify::{format_batch_message, notify_listings, Messenger},
    progress::Progress,
    scrape::{self, ListingSource},
    sheets::{self, manager::LISTING_HEADERS, SheetsApi},
    store::Workspace,
};

/// Read-only inputs shared by every stage.
pub struct Context<'a> {
    pub options: &'a AppOptions,
    pub secrets: &'a Secrets,
    pub criteria: &'a Criteria,
    pub ws: &'a Workspace,
}

/// Whichever integrations could be set up. `None` means "not configured".
#[derive(Default)]
pub struct Services<'a> {
    pub source: Option<&'a dyn ListingSource>,
    pub sheets: Option<&'a dyn SheetsApi>,
    pub messenger: Option<&'a dyn Messenger>,
}

/// Summary of what a run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub new: usize,
    pub uploaded: usize,
    pub notified: bool,
    /// Dry run: where the sheet rows went instead.
    pub preview: Option<PathBuf>,
    /// Dry run: the message that would have been sent.
    pub message: Option<String>,
}

fn say(progress: &mut Option<&mut (dyn Progress + '_)>, msg: &str) {
    if let Some(p) = progress.as_deref_mut() {
        p.log(msg);
    }
}

/// Checked before scraping: listings marked seen must be announced.
fn require_messenger(ctx: &Context, services: &Services) -> Result<()> {
    if ctx.options.run.dry_run || services.messenger.is_some() {
        return Ok(());
    }
    Err(Error::config(
        "messaging not configured (TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, WHATSAPP_TO)",
    ))
}

pub fn run(
    ctx: &Context,
    services: &Services,
    mut progress: Option<&mut (dyn Progress + '_)>,
) -> Result<RunSummary> {
    let run = &ctx.options.run;
    tracing::info!(stage = ?run.stage, dry_run = run.dry_run, "pipeline start");

    match run.stage {
        Stage::ScrapeOnly => {
            let mut summary = RunSummary::default();
            scrape_step(ctx, services, &mut summary, progress.as_deref_mut())?;
            Ok(summary)
        }
        Stage::NotifyOnly => {
            require_messenger(ctx, services)?;
            let mut summary = RunSummary::default();
            let Some(listings) = ctx.ws.load_new_listings()? else {
                say(&mut progress, "No listings file; run a scrape first");
                return Ok(summary);
            };
            summary.new = listings.len();
            notify_step(ctx, services, &listings, &mut summary, &mut progress)?;
            Ok(summary)
        }
        Stage::Full => run_pipeline(ctx, services, progress),
    }
}

pub fn run_pipeline(
    ctx: &Context,
    services: &Services,
    mut progress: Option<&mut (dyn Progress + '_)>,
) -> Result<RunSummary> {
    require_messenger(ctx, services)?;
    let mut summary = RunSummary::default();
    say(&mut progress, &"=".repeat(40));
    say(&mut progress, "Starting pipeline");

    let new = scrape_step(ctx, services, &mut summary, progress.as_deref_mut())?;
    if new.is_empty() {
        say(&mut progress, "No new listings");
        return Ok(summary);
    }

    sheet_step(ctx, services, &new, &mut summary, &mut progress)?;
    notify_step(ctx, services, &new, &mut summary, &mut progress)?;

    say(&mut progress, "Done!");
    tracing::info!(?summary, "pipeline finished");
    Ok(summary)
}

fn scrape_step(
    ctx: &Context,
    services: &Services,
    summary: &mut RunSummary,
    mut progress: Option<&mut (dyn Progress + '_)>,
) -> Result<Vec<Listing>> {
    say(&mut progress, "Scraping...");
    let source = services
        .source
        .ok_or_else(|| Error::config("scraper not configured (APIFY_API_TOKEN)"))?;
    let outcome = scrape::collect(
        source,
        ctx.criteria,
        &ctx.options.scrape,
        ctx.ws,
        progress.as_deref_mut(),
    )?;
    summary.total = outcome.all.len();
    summary.new = outcome.new.len();
    say(
        &mut progress,
        &format!("Found {} total, {} new", outcome.all.len(), outcome.new.len()),
    );
    Ok(outcome.new)
}

fn sheet_step(
    ctx: &Context,
    services: &Services,
    listings: &[Listing],
    summary: &mut RunSummary,
    progress: &mut Option<&mut (dyn Progress + '_)>,
) -> Result<()> {
    let now = Utc::now();

    if ctx.options.run.dry_run {
        let rows: Vec<Vec<String>> = listings
            .iter()
            .filter(|l| l.has_known_area())
            .map(|l| sheets::listing_row(l, ctx.criteria, now))
            .collect();
        let path = ctx.ws.preview_path();
        write_table_to_path(&path, &LISTING_HEADERS, &rows)?;
        say(progress, &format!("Dry run: {} sheet rows written to {}", rows.len(), path.display()));
        summary.preview = Some(path);
        return Ok(());
    }

    let Some(api) = services.sheets else {
        tracing::warn!("spreadsheet not configured; skipping upload");
        say(progress, "Spreadsheet not configured, skipping");
        return Ok(());
    };

    say(progress, "Updating sheet...");
    let uploaded = sheets::ensure_sheet(api, ctx.ws, ctx.secrets, ctx.criteria)
        .and_then(|id| sheets::upload_listings(api, &id, listings, true, ctx.criteria, now));
    match uploaded {
        Ok(recorded) => summary.uploaded = recorded.len(),
        Err(e) => {
            // the message still goes out without the sheet
            tracing::error!(error = %e, "sheet upload failed");
            say(progress, &format!("Sheet upload failed: {e}"));
        }
    }
    Ok(())
}

fn notify_step(
    ctx: &Context,
    services: &Services,
    listings: &[Listing],
    summary: &mut RunSummary,
    progress: &mut Option<&mut (dyn Progress + '_)>,
) -> Result<()> {
    let sheet_url = ctx.ws.sheet_id(ctx.secrets).map(|id| sheets::sheet_url(&id));

    if ctx.options.run.dry_run {
        let body = format_batch_message(listings, sheet_url.as_deref());
        say(progress, "Dry run: message not sent:");
        for line in body.lines() {
            say(progress, &format!("  | {line}"));
        }
        summary.message = Some(body);
        return Ok(());
    }

    let messenger = services
        .messenger
        .ok_or_else(|| Error::config("messaging not configured"))?;

    say(progress, "Sending WhatsApp...");
    summary.notified = notify_listings(messenger, listings, sheet_url.as_deref())?.is_some();
    Ok(())
}
