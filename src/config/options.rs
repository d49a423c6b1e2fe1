// src/config/options.rs
use std::path::PathBuf;
use super::consts::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    pub output_dir: PathBuf,
    pub secrets_file: PathBuf,
    /// Replaces the built-in area table and requirements when set.
    pub criteria_file: Option<PathBuf>,
    pub scrape: ScrapeOptions,
    pub run: RunOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(OUTPUT_DIR),
            secrets_file: PathBuf::from(SECRETS_FILE),
            criteria_file: None,
            scrape: ScrapeOptions::default(),
            run: RunOptions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AreaSelector {
    All,
    Named(Vec<String>),
}

impl AreaSelector {
    /// Comma-separated names as typed on the command line; blanks are dropped.
    pub fn parse_list(text: &str) -> Self {
        let names: Vec<String> = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() { AreaSelector::All } else { AreaSelector::Named(names) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub areas: AreaSelector,
    pub max_items: u32,
    pub workers: usize,
    pub pause_ms: u64,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            areas: AreaSelector::All,
            max_items: MAX_ITEMS_PER_AREA,
            workers: WORKERS,
            pause_ms: REQUEST_PAUSE_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Full,
    ScrapeOnly,
    NotifyOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub stage: Stage,
    /// Scrape for real, but keep sheet and message local.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { stage: Stage::Full, dry_run: false }
    }
}
