//! Core data types for the ingestion pipeline

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stable identity of a resolved channel, immutable within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelIdentity {
    pub id: i64,
    pub title: String,
    pub username: Option<String>,
}

/// Kind of visual media carried by a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// No supported visual attachment
    None,
    /// Native platform photo
    Photo,
    /// Document with an image content type
    DocumentImage,
}

/// Normalized snapshot of one platform message, as written to disk
///
/// Invariants:
/// - `has_media == (media_kind != MediaKind::None)`
/// - `media_file_path` is `Some` iff a download succeeded; a visual message
///   whose download failed or was skipped keeps `has_media = true` with
///   `media_file_path = None` — consumers must treat that as "known missing",
///   not "no media".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub message_id: i64,
    pub sender_id: Option<i64>,
    pub sender_kind: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub text: Option<String>,
    pub view_count: Option<i32>,
    pub forward_count: Option<i32>,
    pub reply_count: Option<i32>,
    pub has_media: bool,
    pub media_kind: MediaKind,
    pub media_file_path: Option<String>,
    pub grouped_id: Option<i64>,
    pub post_author: Option<String>,
    pub is_channel_post: bool,
    pub channel_id: i64,
    pub channel_title: String,
    pub channel_username: Option<String>,
    /// Opaque snapshot of the raw platform payload, copied through unmodified
    pub raw_payload: serde_json::Value,
}

/// Bookkeeping entry for one successful media download
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadedImage {
    pub message_id: i64,
    pub channel_id: i64,
    pub file_path: String,
    pub media_kind: MediaKind,
}

/// Terminal status of one channel pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    Success,
    FloodWait,
    Error,
}

impl ScrapeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeStatus::Success => "success",
            ScrapeStatus::FloodWait => "flood_wait",
            ScrapeStatus::Error => "error",
        }
    }
}

/// Terminal summary for one channel, consumed by the run summary only
#[derive(Debug, Clone)]
pub struct ChannelRunResult {
    pub channel_url: String,
    pub channel_id: Option<i64>,
    pub channel_title: Option<String>,
    pub status: ScrapeStatus,
    pub messages_count: usize,
    pub images_downloaded_count: usize,
    pub error_detail: Option<String>,
    pub output_file: Option<PathBuf>,
}

impl ChannelRunResult {
    /// Result for a channel that failed before or during iteration
    pub fn failed(channel_url: &str, status: ScrapeStatus, detail: String) -> Self {
        Self {
            channel_url: channel_url.to_string(),
            channel_id: None,
            channel_title: None,
            status,
            messages_count: 0,
            images_downloaded_count: 0,
            error_detail: Some(detail),
            output_file: None,
        }
    }
}

static NAME_CLEANER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid channel name regex"));

/// Clean a channel title into a directory-safe name
///
/// Lowercase, strip everything outside word characters / whitespace / hyphen,
/// collapse spaces to underscores. An empty result maps to a fixed
/// placeholder so paths are never built from an empty segment.
pub fn clean_channel_name(title: &str) -> String {
    let cleaned = NAME_CLEANER
        .replace_all(title, "")
        .replace(' ', "_")
        .to_lowercase();

    if cleaned.is_empty() {
        "unknown_channel".to_string()
    } else {
        cleaned
    }
}
