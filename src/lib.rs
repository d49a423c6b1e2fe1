// src/lib.rs

pub mod config;
pub mod core;
pub mod criteria;
pub mod specs;

pub mod error;
pub mod export;
pub mod file;
pub mod listing;
pub mod log;
pub mod notify;
pub mod progress;
pub mod runner;
pub mod scrape;
pub mod sheets;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
