// src/cli.rs
//
// One binary, one subcommand per pipeline piece:
//   home_search scrape [--test | --list-areas | --areas "A,B" | --all]
//   home_search notify [--test | --message TEXT | --listings FILE]
//   home_search sheets [--create TITLE | --upload FILE | --add-new FILE | --sheet-url]
//   home_search run    [--dry-run] [--scrape-only | --notify-only]
//   home_search areas  [NAME]

use std::{path::PathBuf, process::ExitCode};

use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};

use crate::config::{consts::*, AppOptions, AreaSelector, Secrets, Stage};
use crate::criteria::{Area, Criteria};
use crate::notify::{notify_new_listings, Messenger, TwilioClient};
use crate::progress::ConsoleProgress;
use crate::runner::{self, Context, Services};
use crate::scrape::{self, ApifyClient};
use crate::sheets::{self, SheetsClient};
use crate::store::{load_listings, Workspace};

#[derive(Parser, Debug)]
#[command(name = "home_search", version, about = "Scrape, filter and announce homes for sale")]
pub struct Cli {
    /// Where listings, seen ids, the sheet id and debug.log live.
    #[arg(long, global = true, value_name = "DIR", default_value = OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// TOML file of API keys; environment variables override it.
    #[arg(long, global = true, value_name = "FILE", default_value = SECRETS_FILE)]
    pub secrets: PathBuf,

    /// TOML criteria file replacing the built-in requirements and areas.
    #[arg(long, global = true, value_name = "FILE")]
    pub criteria: Option<PathBuf>,

    /// More console logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape listings for the search areas.
    Scrape(ScrapeArgs),
    /// Send a WhatsApp message.
    Notify(NotifyArgs),
    /// Manage the results spreadsheet.
    Sheets(SheetsArgs),
    /// Daily pipeline: scrape, record, notify.
    Run(RunArgs),
    /// Print the area table and which areas pass the requirements.
    Areas {
        /// Show only this area.
        name: Option<String>,
    },
}

#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct ScrapeArgs {
    /// Check the Apify connection and exit.
    #[arg(long)]
    pub test: bool,
    /// Print the searchable area names and exit.
    #[arg(long)]
    pub list_areas: bool,
    /// Comma-separated area names.
    #[arg(long, value_name = "A,B")]
    pub areas: Option<String>,
    /// Every area that meets the requirements (default).
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct NotifyArgs {
    /// Send a fixed test message.
    #[arg(long)]
    pub test: bool,
    /// Send this text as-is.
    #[arg(long, value_name = "TEXT")]
    pub message: Option<String>,
    /// Summarise the listings in this JSON file (default: the last scrape's new listings).
    #[arg(long, value_name = "FILE")]
    pub listings: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(multiple = false, required = true)]
pub struct SheetsArgs {
    /// Create a spreadsheet with this title.
    #[arg(long, value_name = "TITLE")]
    pub create: Option<String>,
    /// Upload every listing in the JSON file.
    #[arg(long, value_name = "FILE")]
    pub upload: Option<PathBuf>,
    /// Upload only listings not yet in the Seen Listings tab.
    #[arg(long, value_name = "FILE")]
    pub add_new: Option<PathBuf>,
    /// Print the configured sheet URL.
    #[arg(long)]
    pub sheet_url: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scrape, but write the sheet rows to a CSV and print the message instead.
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long, conflicts_with = "notify_only")]
    pub scrape_only: bool,
    /// Message the listings from the last scrape.
    #[arg(long)]
    pub notify_only: bool,
}

impl Cli {
    pub fn options(&self) -> AppOptions {
        let mut opts = AppOptions {
            output_dir: self.output_dir.clone(),
            secrets_file: self.secrets.clone(),
            criteria_file: self.criteria.clone(),
            ..AppOptions::default()
        };
        match &self.command {
            Command::Scrape(a) => {
                if let Some(list) = &a.areas {
                    opts.scrape.areas = AreaSelector::parse_list(list);
                }
            }
            Command::Run(a) => {
                opts.run.dry_run = a.dry_run;
                opts.run.stage = if a.scrape_only {
                    Stage::ScrapeOnly
                } else if a.notify_only {
                    Stage::NotifyOnly
                } else {
                    Stage::Full
                };
            }
            _ => {}
        }
        opts
    }
}

pub fn run() -> color_eyre::Result<ExitCode> {
    execute(Cli::parse())
}

pub fn execute(cli: Cli) -> color_eyre::Result<ExitCode> {
    let opts = cli.options();
    crate::log::init(&opts.output_dir, cli.verbose).wrap_err("setting up logging")?;

    let secrets = Secrets::load(&opts.secrets_file)
        .wrap_err_with(|| format!("reading {}", opts.secrets_file.display()))?;
    let criteria = Criteria::resolve(opts.criteria_file.as_deref()).wrap_err("loading criteria")?;
    let ws = Workspace::new(&opts.output_dir);
    tracing::debug!(?opts, ?secrets, "starting");

    match &cli.command {
        Command::Scrape(a) => cmd_scrape(a, &opts, &secrets, &criteria, &ws),
        Command::Notify(a) => cmd_notify(a, &secrets, &ws),
        Command::Sheets(a) => cmd_sheets(a, &secrets, &criteria, &ws),
        Command::Run(_) => cmd_run(&opts, &secrets, &criteria, &ws),
        Command::Areas { name } => {
            print_areas(&criteria, name.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn cmd_scrape(
    args: &ScrapeArgs,
    opts: &AppOptions,
    secrets: &Secrets,
    criteria: &Criteria,
    ws: &Workspace,
) -> color_eyre::Result<ExitCode> {
    if args.list_areas {
        for area in criteria.eligible_areas() {
            println!("{}", area.name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if args.test {
        let result = ApifyClient::from_secrets(secrets).and_then(|c| scrape::test_connection(&c));
        return Ok(match result {
            Ok(account) => {
                println!("Connected to Apify as: {}", account.username);
                println!("Plan: {}", account.plan.as_deref().unwrap_or(UNKNOWN));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("ERROR connecting to Apify: {e}");
                ExitCode::FAILURE
            }
        });
    }

    let client = ApifyClient::from_secrets(secrets)?;
    let mut progress = ConsoleProgress::default();
    let outcome = scrape::collect(&client, criteria, &opts.scrape, ws, Some(&mut progress))?;

    for l in &outcome.new {
        println!("  {} | {} | {}", l.price, l.area, l.address);
    }
    println!("Saved to {}", ws.new_listings_path().display());
    if !outcome.failed_areas.is_empty() {
        eprintln!("Failed areas: {}", outcome.failed_areas.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_notify(args: &NotifyArgs, secrets: &Secrets, ws: &Workspace) -> color_eyre::Result<ExitCode> {
    let send = |body: &str| -> ExitCode {
        match TwilioClient::from_secrets(secrets).and_then(|c| c.send(body)) {
            Ok(sid) => {
                println!("WhatsApp sent! SID: {sid}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("ERROR: {e}");
                ExitCode::FAILURE
            }
        }
    };

    if args.test {
        return Ok(send(TEST_MESSAGE));
    }
    if let Some(text) = &args.message {
        return Ok(send(text));
    }

    let path = args.listings.clone().unwrap_or_else(|| ws.new_listings_path());
    let client = TwilioClient::from_secrets(secrets)?;
    let sheet_url = ws.sheet_id(secrets).map(|id| sheets::sheet_url(&id));
    match notify_new_listings(&client, &path, sheet_url.as_deref()) {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => {
            eprintln!("File not found: {}", path.display());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("ERROR: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_sheets(
    args: &SheetsArgs,
    secrets: &Secrets,
    criteria: &Criteria,
    ws: &Workspace,
) -> color_eyre::Result<ExitCode> {
    if args.sheet_url {
        match ws.sheet_id(secrets) {
            Some(id) => println!("{}", sheets::sheet_url(&id)),
            None => println!("No sheet configured. Run with --create first."),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let api = sheets::connect(secrets).wrap_err("connecting to Google Sheets")?;

    if let Some(title) = &args.create {
        let id = sheets::create_sheet(&api, title, criteria)?;
        ws.save_sheet_id(&id)?;
        println!("Created sheet: {}", sheets::sheet_url(&id));
        return Ok(ExitCode::SUCCESS);
    }

    let (path, mark_new) = match (&args.upload, &args.add_new) {
        (Some(p), _) => (p, false),
        (None, Some(p)) => (p, true),
        (None, None) => return Err(eyre!("nothing to do")),
    };
    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        return Ok(ExitCode::FAILURE);
    }
    let listings = load_listings(path)?;
    upload(&api, ws, secrets, criteria, &listings, mark_new)
}

fn upload(
    api: &SheetsClient,
    ws: &Workspace,
    secrets: &Secrets,
    criteria: &Criteria,
    listings: &[crate::listing::Listing],
    mark_new: bool,
) -> color_eyre::Result<ExitCode> {
    let id = sheets::ensure_sheet(api, ws, secrets, criteria)?;
    println!("Uploading {} listings...", listings.len());
    let recorded = sheets::upload_listings(api, &id, listings, mark_new, criteria, Utc::now())?;
    println!("Recorded {} listings in: {}", recorded.len(), sheets::sheet_url(&id));
    Ok(ExitCode::SUCCESS)
}

fn cmd_run(
    opts: &AppOptions,
    secrets: &Secrets,
    criteria: &Criteria,
    ws: &Workspace,
) -> color_eyre::Result<ExitCode> {
    // each integration is optional here; the runner decides what a gap means
    let source = optional("scraper", ApifyClient::from_secrets(secrets));
    let messenger = optional("messaging", TwilioClient::from_secrets(secrets));
    let sheets_api = optional("spreadsheet", sheets::connect(secrets));

    let services = Services {
        source: source.as_ref().map(|c| c as &dyn scrape::ListingSource),
        sheets: sheets_api.as_ref().map(|c| c as &dyn sheets::SheetsApi),
        messenger: messenger.as_ref().map(|c| c as &dyn Messenger),
    };
    let ctx = Context { options: opts, secrets, criteria, ws };

    let mut progress = ConsoleProgress::default();
    let summary = runner::run(&ctx, &services, Some(&mut progress))?;

    if let Some(body) = &summary.message {
        tracing::info!(chars = body.chars().count(), "dry run message prepared");
    }
    println!(
        "Total {} | new {} | uploaded {} | notified {}",
        summary.total,
        summary.new,
        summary.uploaded,
        if summary.notified { "yes" } else { "no" }
    );
    Ok(ExitCode::SUCCESS)
}

fn optional<T>(what: &str, built: crate::Result<T>) -> Option<T> {
    match built {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(%what, error = %e, "integration unavailable");
            None
        }
    }
}

fn print_areas(criteria: &Criteria, only: Option<&str>) -> crate::Result<()> {
    let areas: Vec<&Area> = match only {
        Some(name) => vec![criteria.require_area(name)?],
        None => criteria.areas.iter().collect(),
    };
    let req = &criteria.requirements;
    println!(
        "Requirements: {} bed, commute <= {} min, grammar drive <= {} min, {:?} primary, £{}-£{}",
        req.bedrooms,
        req.max_commute_mins,
        req.max_grammar_drive_mins,
        req.required_ofsted,
        req.min_price,
        req.max_price
    );
    println!();
    for area in areas {
        let verdict = criteria.evaluate_area(area);
        let mark = if verdict.is_accepted() { "ok" } else { "--" };
        let row = area.table_row();
        println!("{mark} {:<22} {:<12} {}", row[0], row[1], row[4]);
        println!("   grammar: {}", row[2]);
        println!("   primary: {}", row[3]);
        if !verdict.is_accepted() {
            println!("   excluded: {}", verdict.reasons());
        }
    }
    Ok(())
}
