use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use log::debug;

use crate::event::ExtractedEvent;

pub const DEFAULT_OUTPUT_FILE: &str = "ExtractedEvents.csv";

#[cfg(windows)]
pub const LINE_TERMINATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &str = "\n";

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Quotes `field` only if it would otherwise break the row.
fn escape_field(field: &str) -> String {
    if field.contains([DELIMITER, QUOTE, '\r', '\n']) {
        let mut escaped = String::with_capacity(field.len() + 2);
        escaped.push(QUOTE);
        for c in field.chars() {
            if c == QUOTE {
                escaped.push(QUOTE);
            }
            escaped.push(c);
        }
        escaped.push(QUOTE);
        escaped
    } else {
        field.to_owned()
    }
}

fn write_row<W: Write>(writer: &mut W, fields: &[&str]) -> Result<()> {
    let row = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<String>>()
        .join(&DELIMITER.to_string());
    writer.write_all(row.as_bytes())?;
    writer.write_all(LINE_TERMINATOR.as_bytes())?;
    Ok(())
}

/// Writes the header row followed by one row per event.
pub fn write_csv<W: Write>(writer: &mut W, events: &[ExtractedEvent]) -> Result<()> {
    write_row(writer, &ExtractedEvent::COLUMNS).context("Failed to write CSV header")?;
    for event in events {
        write_row(writer, &event.fields()).with_context(|| {
            format!("Failed to write CSV row for event {}", event.event_id())
        })?;
    }
    Ok(())
}

/// Creates (or truncates) `path` and writes `events` to it.
pub fn export_to_file(path: &Path, events: &[ExtractedEvent]) -> Result<()> {
    debug!("Open file {}", path.display());
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, events)
        .with_context(|| format!("Failed to export events to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    debug!("Wrote {} rows to {}", events.len(), path.display());
    Ok(())
}
