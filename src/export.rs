// src/export.rs
//
// Sheet rows as a local CSV: what a dry run would have uploaded.

use std::{io::Write, path::Path};

use crate::error::Result;
use crate::file::ensure_parent;

/// Write header + rows to any writer.
pub fn write_table<W: Write>(out: W, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut w = csv::WriterBuilder::new().flexible(false).from_writer(out);
    w.write_record(headers)?;
    for row in rows {
        w.write_record(row)?;
    }
    w.flush()?;
    Ok(())
}

/// Create/truncate `path` and write the table.
pub fn write_table_to_path(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    ensure_parent(path)?;
    let file = std::fs::File::create(path)?;
    write_table(std::io::BufWriter::new(file), headers, rows)
}

/// Parse a table back (header row first); used to inspect previews.
pub fn read_table(text: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut r = csv::ReaderBuilder::new().has_headers(true).from_reader(text.as_bytes());
    let headers = r.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for rec in r.records() {
        rows.push(rec?.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}
