//! Channel iterator - one channel's full scrape pass
//!
//! Resolves the channel reference, walks its history above the watermark,
//! builds message records (downloading visual media along the way), and hands
//! the collected sequence to the durable writer. Errors are contained at the
//! narrowest scope that preserves forward progress; only an account ban
//! escapes this module.

use crate::client::{RawMessage, TelegramApi};
use crate::errors::ScrapeError;
use crate::logger::{self, LogTag};
use crate::scraper::media::MediaDownloader;
use crate::scraper::rate::RateGovernor;
use crate::scraper::types::{
    clean_channel_name, ChannelIdentity, ChannelRunResult, DownloadedImage, MediaKind,
    MessageRecord, ScrapeStatus,
};
use crate::scraper::writer::MessageWriter;

pub struct ChannelScraper<'a> {
    api: &'a dyn TelegramApi,
    governor: &'a RateGovernor,
    downloader: &'a MediaDownloader,
    writer: &'a MessageWriter,
    batch_size: usize,
}

impl<'a> ChannelScraper<'a> {
    pub fn new(
        api: &'a dyn TelegramApi,
        governor: &'a RateGovernor,
        downloader: &'a MediaDownloader,
        writer: &'a MessageWriter,
        batch_size: usize,
    ) -> Self {
        Self {
            api,
            governor,
            downloader,
            writer,
            batch_size: batch_size.max(1),
        }
    }

    /// Scrape one channel's history above the watermark
    ///
    /// Only messages with id strictly greater than `watermark` are ingested,
    /// in the order the platform serves them (newest first). `Err` is
    /// reserved for fatal conditions that must abort the whole run; every
    /// per-channel failure comes back as a `ChannelRunResult`.
    pub async fn scrape_channel(
        &self,
        target: &str,
        watermark: i64,
    ) -> Result<ChannelRunResult, ScrapeError> {
        let identity = match self.api.resolve_channel(target).await {
            Ok(identity) => identity,
            Err(e) if e.is_fatal() => return Err(e),
            Err(ScrapeError::FloodWait { seconds }) => {
                self.governor.on_throttle_signal(seconds).await;
                return Ok(ChannelRunResult::failed(
                    target,
                    ScrapeStatus::FloodWait,
                    format!("throttled while resolving (server wait {}s)", seconds),
                ));
            }
            Err(e) => {
                logger::error(LogTag::Channel, &format!("{}", e));
                return Ok(ChannelRunResult::failed(
                    target,
                    ScrapeStatus::Error,
                    e.to_string(),
                ));
            }
        };

        let channel_dir = clean_channel_name(&identity.title);
        logger::info(
            LogTag::Channel,
            &format!("Scraping channel: {} (ID: {})", identity.title, identity.id),
        );

        let mut records: Vec<MessageRecord> = Vec::new();
        let mut downloaded: Vec<DownloadedImage> = Vec::new();
        let mut status = ScrapeStatus::Success;
        let mut error_detail: Option<String> = None;

        let mut offset_id: i64 = 0;
        let mut processed: usize = 0;

        'pages: loop {
            let page = match self
                .api
                .fetch_history(&identity, offset_id, self.batch_size)
                .await
            {
                Ok(page) => page,
                Err(e) if e.is_fatal() => return Err(e),
                Err(ScrapeError::FloodWait { seconds }) => {
                    // Terminal for this channel only; what we have still lands
                    self.governor.on_throttle_signal(seconds).await;
                    status = ScrapeStatus::FloodWait;
                    error_detail = Some(format!("server throttle, waited {}s+", seconds));
                    break 'pages;
                }
                Err(e) => {
                    logger::error(
                        LogTag::Channel,
                        &format!("Error scraping channel {}: {}", target, e),
                    );
                    status = ScrapeStatus::Error;
                    error_detail = Some(e.to_string());
                    break 'pages;
                }
            };

            if page.is_empty() {
                break 'pages;
            }

            let page_len = page.len();
            for raw in page {
                if raw.id <= watermark {
                    break 'pages;
                }

                let record = self
                    .build_record(&identity, &channel_dir, &raw, &mut downloaded)
                    .await;
                offset_id = record.message_id;
                logger::verbose(
                    LogTag::Channel,
                    &format!("Ingested message {} from {}", record.message_id, identity.title),
                );
                records.push(record);

                processed += 1;
                self.governor.after_message().await;
                if processed % self.batch_size == 0 {
                    logger::debug(
                        LogTag::Channel,
                        &format!("Processed {} messages from {}", processed, identity.title),
                    );
                    self.governor.after_batch(self.batch_size).await;
                }
            }

            if page_len < self.batch_size {
                // Short page means the history is exhausted
                break 'pages;
            }
        }

        let mut output_file = None;
        if status != ScrapeStatus::Error {
            if records.is_empty() {
                logger::info(
                    LogTag::Channel,
                    &format!("No new messages found for '{}'", identity.title),
                );
            } else {
                match self.writer.write(&channel_dir, &records) {
                    Ok(path) => output_file = Some(path),
                    Err(e) => {
                        logger::error(
                            LogTag::Storage,
                            &format!("Failed to write document for '{}': {}", identity.title, e),
                        );
                        status = ScrapeStatus::Error;
                        error_detail = Some(e.to_string());
                    }
                }
            }
        }

        Ok(ChannelRunResult {
            channel_url: target.to_string(),
            channel_id: Some(identity.id),
            channel_title: Some(identity.title.clone()),
            status,
            messages_count: records.len(),
            images_downloaded_count: downloaded.len(),
            error_detail,
            output_file,
        })
    }

    /// Build one message record, downloading its visual media if present
    async fn build_record(
        &self,
        identity: &ChannelIdentity,
        channel_dir: &str,
        raw: &RawMessage,
        downloaded: &mut Vec<DownloadedImage>,
    ) -> MessageRecord {
        let media_kind = if raw.attachment.is_visual() {
            match self
                .downloader
                .download(self.api, self.governor, identity, channel_dir, raw)
                .await
            {
                (Some(path), kind) => {
                    downloaded.push(DownloadedImage {
                        message_id: raw.id,
                        channel_id: identity.id,
                        file_path: path.clone(),
                        media_kind: kind,
                    });
                    return self.record_from(identity, raw, kind, Some(path));
                }
                // Download failed or was skipped: the media is known missing
                (None, kind) => kind,
            }
        } else {
            MediaKind::None
        };

        self.record_from(identity, raw, media_kind, None)
    }

    fn record_from(
        &self,
        identity: &ChannelIdentity,
        raw: &RawMessage,
        media_kind: MediaKind,
        media_file_path: Option<String>,
    ) -> MessageRecord {
        MessageRecord {
            message_id: raw.id,
            sender_id: raw.sender_id,
            sender_kind: raw.sender_kind.clone(),
            timestamp: raw.date,
            text: raw.text.clone(),
            view_count: raw.views,
            forward_count: raw.forwards,
            reply_count: raw.replies,
            has_media: media_kind != MediaKind::None,
            media_kind,
            media_file_path,
            grouped_id: raw.grouped_id,
            post_author: raw.post_author.clone(),
            is_channel_post: raw.is_post,
            channel_id: identity.id,
            channel_title: identity.title.clone(),
            channel_username: identity.username.clone(),
            raw_payload: raw.raw.clone(),
        }
    }
}
