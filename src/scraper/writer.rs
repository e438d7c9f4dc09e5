//! Durable writer for per-channel message documents
//!
//! One JSON document per (channel, run): a pretty-printed array of message
//! records under `<root>/<YYYY-MM-DD>/<channel>/`, named with the channel,
//! date and time of write. Documents are written to a temp file and renamed
//! into place so downstream stages never see a half-written batch — file
//! presence means "complete batch available".

use crate::errors::ScrapeError;
use crate::logger::{self, LogTag};
use crate::scraper::types::MessageRecord;
use chrono::Local;
use std::path::{Path, PathBuf};

pub struct MessageWriter {
    messages_root: PathBuf,
}

impl MessageWriter {
    pub fn new(messages_root: PathBuf) -> Self {
        Self { messages_root }
    }

    /// Write one channel's records as a dated JSON document
    ///
    /// Returns the path of the finished document. Two writes for the same
    /// channel on the same day never collide: the name carries the
    /// time-of-write, and an already-taken path gets a numeric suffix.
    pub fn write(
        &self,
        channel_dir: &str,
        records: &[MessageRecord],
    ) -> Result<PathBuf, ScrapeError> {
        let now = Local::now();
        let date = now.format("%Y-%m-%d").to_string();
        let time = now.format("%H%M%S").to_string();

        let dir = self.messages_root.join(&date).join(channel_dir);
        std::fs::create_dir_all(&dir)
            .map_err(|e| ScrapeError::storage(dir.display().to_string(), e.to_string()))?;

        let path = available_path(&dir, channel_dir, &date, &time);

        let body = serde_json::to_string_pretty(records)?;

        // Temp file in the same directory so the rename stays on one filesystem
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, body.as_bytes())
            .map_err(|e| ScrapeError::storage(tmp_path.display().to_string(), e.to_string()))?;
        std::fs::rename(&tmp_path, &path).map_err(|e| {
            // Don't leave the temp file behind on a failed rename
            let _ = std::fs::remove_file(&tmp_path);
            ScrapeError::storage(path.display().to_string(), e.to_string())
        })?;

        logger::info(
            LogTag::Storage,
            &format!("Saved {} messages to {}", records.len(), path.display()),
        );

        Ok(path)
    }
}

/// First non-colliding document path for this channel/date/time
fn available_path(dir: &Path, channel_dir: &str, date: &str, time: &str) -> PathBuf {
    let base = dir.join(format!("{}_{}_{}.json", channel_dir, date, time));
    if !base.exists() {
        return base;
    }

    let mut attempt = 1u32;
    loop {
        let candidate = dir.join(format!("{}_{}_{}_{}.json", channel_dir, date, time, attempt));
        if !candidate.exists() {
            return candidate;
        }
        attempt += 1;
    }
}
