//! Log line rendering.

use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat};

use crate::monitoring::LogEntry;

/// Label shown next to each line unless labels are disabled.
pub const SHOWN_LABEL: &str = "pod";

/// `<timestamp> {pod="..."} <line>`, or `<timestamp> <line>` without labels.
pub fn format_entry(entry: &LogEntry, show_labels: bool) -> String {
    let timestamp = DateTime::from_timestamp_nanos(entry.timestamp_ns)
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    match entry.labels.get(SHOWN_LABEL).filter(|_| show_labels) {
        Some(value) => format!(
            "{} {{{}=\"{}\"}} {}",
            timestamp,
            SHOWN_LABEL,
            value,
            entry.line.trim_end()
        ),
        None => format!("{} {}", timestamp, entry.line.trim_end()),
    }
}

pub fn write_entries<W: Write>(
    out: &mut W,
    entries: &[LogEntry],
    show_labels: bool,
) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{}", format_entry(entry, show_labels))?;
    }
    Ok(())
}
