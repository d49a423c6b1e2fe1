// src/log.rs
//
// Two sinks:
// - stderr: warnings and errors only unless -v is given (progress lines already
//   tell the user what is happening)
// - <output_dir>/debug.log: everything at debug and above, appended, no colour.
// RUST_LOG overrides the file filter.

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use crate::config::consts::LOG_FILE;
use crate::error::{Error, Result};
use crate::file::ensure_directory;

pub fn init(dir: &Path, verbosity: u8) -> Result<()> {
    ensure_directory(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;

    let console_level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("home_search=debug,warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .with_filter(console_level),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(file_filter),
        )
        .try_init()
        .map_err(|e| Error::config(format!("logging: {e}")))?;

    tracing::debug!(dir = %dir.display(), verbosity, "logging initialised");
    Ok(())
}
