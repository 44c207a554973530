//! Append-only JSONL audit logs.
//!
//! Two logs are written per run: the raw attendee list of every fetched
//! event (before grouping), and the full payload of every successfully
//! created group event.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

/// Appends one record to `path` as a single JSON line.
///
/// The file is created if absent and opened in append mode. The handle is
/// flushed and released before returning, including when the write fails.
pub fn append_line<T: Serialize + ?Sized>(path: &Path, record: &T) -> std::io::Result<()> {
    let line = serde_json::to_string(record).map_err(std::io::Error::other)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    file.flush()
}
