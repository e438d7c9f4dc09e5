//! Media downloader for visual attachments
//!
//! Only native photos and image-typed documents are fetched; everything else
//! is skipped without error. Download failures never fail a channel: they
//! degrade to "known missing" and the pass continues.

use crate::client::{Attachment, RawMessage, TelegramApi};
use crate::errors::ScrapeError;
use crate::logger::{self, LogTag};
use crate::scraper::rate::RateGovernor;
use crate::scraper::types::{ChannelIdentity, MediaKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

/// Fallback for image types whose extension cannot be determined
const FALLBACK_EXTENSION: &str = ".bin";

static MIME_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(jpeg|png|gif|webp)$").expect("valid mime suffix regex"));

pub struct MediaDownloader {
    images_root: PathBuf,
}

impl MediaDownloader {
    pub fn new(images_root: PathBuf) -> Self {
        Self { images_root }
    }

    /// Download the message's visual attachment, if it has one
    ///
    /// Returns the landed file path and the media kind. Unsupported
    /// attachments yield `(None, MediaKind::None)` without error; failed
    /// downloads of supported attachments yield `(None, kind)` so the caller
    /// can record the media as known-missing. This function never raises:
    /// a throttle is absorbed locally (governor wait, then skip) and any
    /// other failure is logged and skipped.
    pub async fn download(
        &self,
        api: &dyn TelegramApi,
        governor: &RateGovernor,
        channel: &ChannelIdentity,
        channel_dir: &str,
        message: &RawMessage,
    ) -> (Option<String>, MediaKind) {
        let kind = match &message.attachment {
            Attachment::Photo => MediaKind::Photo,
            Attachment::DocumentImage { .. } => MediaKind::DocumentImage,
            Attachment::None | Attachment::Other => return (None, MediaKind::None),
        };

        let extension = derive_extension(&message.attachment);
        let dir = self.images_root.join(channel_dir);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            logger::error(
                LogTag::Media,
                &format!("Failed to create {}: {}", dir.display(), e),
            );
            return (None, kind);
        }

        // Message id + timestamp keeps names unique without getting long
        let file_name = format!(
            "{}_{}{}",
            message.id,
            message.date.format("%Y%m%d%H%M%S"),
            extension
        );
        let dest = dir.join(file_name);

        logger::debug(
            LogTag::Media,
            &format!("Downloading media {} to {}", message.id, dest.display()),
        );

        match api.download_media(channel, message, &dest).await {
            Ok(()) => {
                governor.after_media_download().await;
                (Some(dest.display().to_string()), kind)
            }
            Err(ScrapeError::FloodWait { seconds }) => {
                // Absorbed here: wait it out, skip this file, keep going.
                // The next run picks the download up again.
                governor.on_download_throttle(seconds).await;
                (None, kind)
            }
            Err(e) => {
                logger::error(
                    LogTag::Media,
                    &format!(
                        "Error downloading media for message {} in channel {}: {}",
                        message.id, channel_dir, e
                    ),
                );
                (None, kind)
            }
        }
    }
}

/// Derive a file extension for a visual attachment
///
/// Priority: fixed `.jpg` for native photos, then the content-type suffix
/// against a small allow-list, then the original file name's extension, then
/// a generic fallback. Never fails.
pub fn derive_extension(attachment: &Attachment) -> String {
    match attachment {
        // The platform serves photos as JPEG
        Attachment::Photo => ".jpg".to_string(),
        Attachment::DocumentImage {
            mime_type,
            file_name,
        } => {
            if let Some(captures) = MIME_EXTENSION.captures(mime_type) {
                return format!(".{}", &captures[1]);
            }
            if let Some(name) = file_name {
                if let Some((_, ext)) = name.rsplit_once('.') {
                    if !ext.is_empty() {
                        return format!(".{}", ext);
                    }
                }
            }
            FALLBACK_EXTENSION.to_string()
        }
        Attachment::None | Attachment::Other => FALLBACK_EXTENSION.to_string(),
    }
}
