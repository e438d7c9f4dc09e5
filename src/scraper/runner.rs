//! Run controller - drives the channel list end to end
//!
//! Channels are processed strictly sequentially; concurrency would defeat the
//! rate-limiting strategy. Per-channel failures are collected and the run
//! moves on. An account ban stops the loop immediately, discarding the
//! remaining channels.

use crate::client::TelegramApi;
use crate::config::ScraperConfig;
use crate::logger::{self, LogTag};
use crate::scraper::channel::ChannelScraper;
use crate::scraper::media::MediaDownloader;
use crate::scraper::rate::RateGovernor;
use crate::scraper::types::ChannelRunResult;
use crate::scraper::writer::MessageWriter;
use std::collections::HashMap;
use std::path::PathBuf;

/// Outcome of a full run
///
/// `fatal` is set when the run aborted early; `results` then covers only the
/// channels attempted before the abort.
#[derive(Debug)]
pub struct RunOutcome {
    pub results: Vec<ChannelRunResult>,
    pub fatal: Option<String>,
}

impl RunOutcome {
    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }
}

pub struct ScrapeRunner<A: TelegramApi> {
    api: A,
    config: ScraperConfig,
    governor: RateGovernor,
    downloader: MediaDownloader,
    writer: MessageWriter,
    /// Per-channel watermark overrides; channels not listed use the
    /// configured default (start_message_id, normally 0 = full scan)
    watermarks: HashMap<String, i64>,
}

impl<A: TelegramApi> ScrapeRunner<A> {
    pub fn new(api: A, config: ScraperConfig, messages_root: PathBuf, images_root: PathBuf) -> Self {
        let governor = RateGovernor::new(config.clone());
        Self {
            api,
            config,
            governor,
            downloader: MediaDownloader::new(images_root),
            writer: MessageWriter::new(messages_root),
            watermarks: HashMap::new(),
        }
    }

    /// Supply externally persisted watermarks (keyed by channel reference)
    pub fn with_watermarks(mut self, watermarks: HashMap<String, i64>) -> Self {
        self.watermarks = watermarks;
        self
    }

    /// Process the configured channel list sequentially
    pub async fn run(&self) -> RunOutcome {
        let scraper = ChannelScraper::new(
            &self.api,
            &self.governor,
            &self.downloader,
            &self.writer,
            self.config.batch_size,
        );

        let mut results = Vec::with_capacity(self.config.channels.len());
        let mut fatal = None;

        for channel_url in &self.config.channels {
            logger::info(
                LogTag::Channel,
                &format!("Starting scrape for {}...", channel_url),
            );

            let watermark = self
                .watermarks
                .get(channel_url)
                .copied()
                .unwrap_or(self.config.start_message_id);

            match scraper.scrape_channel(channel_url, watermark).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    // Ban or other fatal condition: continuing would likely
                    // escalate the penalty. Remaining channels are discarded.
                    logger::error(
                        LogTag::System,
                        &format!("FATAL: aborting run after {}: {}", channel_url, e),
                    );
                    fatal = Some(e.to_string());
                    break;
                }
            }

            self.governor.after_channel().await;
        }

        self.log_summary(&results, fatal.as_deref());

        RunOutcome { results, fatal }
    }

    /// Per-channel summary block at the end of the run
    fn log_summary(&self, results: &[ChannelRunResult], fatal: Option<&str>) {
        logger::info(LogTag::Summary, "--- Scraping Summary ---");
        for result in results {
            let name = result
                .channel_title
                .as_deref()
                .unwrap_or(&result.channel_url);
            logger::info(
                LogTag::Summary,
                &format!(
                    "Channel: {} - Status: {} - Messages: {} - Images: {}",
                    name,
                    result.status.as_str(),
                    result.messages_count,
                    result.images_downloaded_count
                ),
            );
        }

        let (messages, batches, channels, downloads, throttles) = self.governor.stats().snapshot();
        logger::info(
            LogTag::Summary,
            &format!(
                "Pacing: {} message waits, {} batch waits, {} channel waits, {} download waits, {} throttle waits",
                messages, batches, channels, downloads, throttles
            ),
        );

        if let Some(detail) = fatal {
            logger::error(
                LogTag::Summary,
                &format!("Run aborted early: {}", detail),
            );
        }
    }
}
