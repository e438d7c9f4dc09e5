//! File persistence for log output
//!
//! Appends every log line to a dated file under the logs directory. Writes go
//! through a buffered writer guarded by a mutex; `flush_file_logging()` is
//! called on shutdown so the tail of a run is never lost.

use crate::paths::get_logs_directory;
use chrono::Local;
use once_cell::sync::Lazy;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::sync::Mutex;

static LOG_FILE: Lazy<Mutex<Option<BufWriter<std::fs::File>>>> = Lazy::new(|| Mutex::new(None));

/// Open today's log file for appending
///
/// Failures are reported to stderr and leave file logging disabled; console
/// logging still works.
pub fn init_file_logging() {
    let file_name = format!("telescrape_{}.log", Local::now().format("%Y-%m-%d"));
    let path = get_logs_directory().join(file_name);

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            if let Ok(mut guard) = LOG_FILE.lock() {
                *guard = Some(BufWriter::new(file));
            }
        }
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
        }
    }
}

/// Append one line to the log file (no-op when file logging is disabled)
pub fn write_to_file(line: &str) {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(writer) = guard.as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

/// Flush pending writes to disk
pub fn flush_file_logging() {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(writer) = guard.as_mut() {
            let _ = writer.flush();
        }
    }
}
