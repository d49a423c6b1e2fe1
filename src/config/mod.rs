// src/config/mod.rs

pub mod consts;
pub mod options;
pub mod secrets;

pub use options::{AppOptions, AreaSelector, RunOptions, ScrapeOptions, Stage};
pub use secrets::Secrets;
