//! Platform client abstraction
//!
//! The scraping core talks to Telegram only through the [`TelegramApi`]
//! trait. The production implementation lives in [`grammers`]; tests supply
//! an in-memory mock. Raw platform payloads are normalized into
//! [`RawMessage`] at this boundary, including the one-time classification of
//! the attachment shape, so nothing downstream ever inspects platform types.

pub mod grammers;

use crate::errors::ScrapeError;
use crate::scraper::types::ChannelIdentity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;

pub use grammers::GrammersApi;

/// Attachment shape, decided once when the raw platform payload is received
///
/// Only native photos and image-typed documents are ever downloaded; every
/// other media shape is carried as `Other` and skipped without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// No media on the message
    None,
    /// Native platform photo
    Photo,
    /// Document whose declared content type is an image
    DocumentImage {
        mime_type: String,
        file_name: Option<String>,
    },
    /// Any other media shape (video, audio, poll, ...)
    Other,
}

impl Attachment {
    /// Whether this attachment is a supported visual type
    pub fn is_visual(&self) -> bool {
        matches!(self, Attachment::Photo | Attachment::DocumentImage { .. })
    }
}

/// Normalized snapshot of one raw platform message
///
/// Field coverage follows what the output record needs; `raw` is an opaque
/// pass-through snapshot kept for schema flexibility downstream.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub id: i64,
    pub sender_id: Option<i64>,
    pub sender_kind: Option<String>,
    pub date: DateTime<Utc>,
    pub text: Option<String>,
    pub views: Option<i32>,
    pub forwards: Option<i32>,
    pub replies: Option<i32>,
    pub grouped_id: Option<i64>,
    pub post_author: Option<String>,
    pub is_post: bool,
    pub attachment: Attachment,
    pub raw: serde_json::Value,
}

/// Client-side view of the messaging platform
///
/// One in-flight call at a time by design: the rate-limit strategy assumes
/// strictly sequential requests, so implementations take `&self` but are only
/// ever driven from a single logical flow.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// Resolve a channel URL or handle to its stable identity
    async fn resolve_channel(&self, target: &str) -> Result<ChannelIdentity, ScrapeError>;

    /// Fetch one page of history, newest-to-oldest
    ///
    /// `offset_id = 0` starts from the latest message; otherwise only messages
    /// with id strictly below `offset_id` are returned. An empty page means
    /// the history is exhausted.
    async fn fetch_history(
        &self,
        channel: &ChannelIdentity,
        offset_id: i64,
        limit: usize,
    ) -> Result<Vec<RawMessage>, ScrapeError>;

    /// Download the message's media payload to `dest`
    ///
    /// Only called for messages whose attachment is a supported visual type.
    async fn download_media(
        &self,
        channel: &ChannelIdentity,
        message: &RawMessage,
        dest: &Path,
    ) -> Result<(), ScrapeError>;
}
