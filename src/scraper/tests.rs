#[cfg(test)]
mod tests {
    use crate::client::{Attachment, RawMessage, TelegramApi};
    use crate::config::ScraperConfig;
    use crate::errors::ScrapeError;
    use crate::scraper::channel::ChannelScraper;
    use crate::scraper::media::{derive_extension, MediaDownloader};
    use crate::scraper::rate::RateGovernor;
    use crate::scraper::runner::ScrapeRunner;
    use crate::scraper::types::{
        clean_channel_name, ChannelIdentity, ChannelRunResult, MediaKind, MessageRecord,
        ScrapeStatus,
    };
    use crate::scraper::writer::MessageWriter;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Scripted in-memory platform: serves a fixed descending-id history and
    /// injects failures where a test asks for them.
    struct MockApi {
        identity: ChannelIdentity,
        messages: Vec<RawMessage>,
        banned_targets: HashSet<String>,
        unresolvable_targets: HashSet<String>,
        flood_at_offset: Option<i64>,
        failing_downloads: HashSet<i64>,
        flooding_downloads: HashSet<i64>,
        downloads: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl TelegramApi for MockApi {
        async fn resolve_channel(&self, target: &str) -> Result<ChannelIdentity, ScrapeError> {
            if self.banned_targets.contains(target) {
                return Err(ScrapeError::banned("PHONE_NUMBER_BANNED"));
            }
            if self.unresolvable_targets.contains(target) {
                return Err(ScrapeError::resolution(target, "no such channel"));
            }
            Ok(self.identity.clone())
        }

        async fn fetch_history(
            &self,
            _channel: &ChannelIdentity,
            offset_id: i64,
            limit: usize,
        ) -> Result<Vec<RawMessage>, ScrapeError> {
            if self.flood_at_offset == Some(offset_id) {
                return Err(ScrapeError::FloodWait { seconds: 0 });
            }
            Ok(self
                .messages
                .iter()
                .filter(|m| offset_id == 0 || m.id < offset_id)
                .take(limit)
                .cloned()
                .collect())
        }

        async fn download_media(
            &self,
            _channel: &ChannelIdentity,
            message: &RawMessage,
            dest: &Path,
        ) -> Result<(), ScrapeError> {
            if self.flooding_downloads.contains(&message.id) {
                return Err(ScrapeError::FloodWait { seconds: 0 });
            }
            if self.failing_downloads.contains(&message.id) {
                return Err(ScrapeError::download(message.id, "server refused the file"));
            }
            std::fs::write(dest, b"image-bytes").unwrap();
            self.downloads.lock().unwrap().push(message.id);
            Ok(())
        }
    }

    fn identity() -> ChannelIdentity {
        ChannelIdentity {
            id: 4242,
            title: "Test Channel".to_string(),
            username: Some("testchannel".to_string()),
        }
    }

    fn mock(messages: Vec<RawMessage>) -> MockApi {
        MockApi {
            identity: identity(),
            messages,
            banned_targets: HashSet::new(),
            unresolvable_targets: HashSet::new(),
            flood_at_offset: None,
            failing_downloads: HashSet::new(),
            flooding_downloads: HashSet::new(),
            downloads: Mutex::new(Vec::new()),
        }
    }

    fn raw(id: i64, attachment: Attachment) -> RawMessage {
        RawMessage {
            id,
            sender_id: Some(1001),
            sender_kind: Some("channel".to_string()),
            date: DateTime::from_timestamp(1_700_000_000 + id, 0).unwrap(),
            text: Some(format!("message {}", id)),
            views: Some(10),
            forwards: Some(1),
            replies: None,
            grouped_id: None,
            post_author: None,
            is_post: true,
            attachment,
            raw: json!({ "id": id }),
        }
    }

    fn plain(id: i64) -> RawMessage {
        raw(id, Attachment::None)
    }

    /// All delay ranges zeroed so tests never actually sleep
    fn instant_config(batch_size: usize) -> ScraperConfig {
        let mut cfg = ScraperConfig::default();
        cfg.batch_size = batch_size;
        cfg.min_message_delay_ms = 0;
        cfg.max_message_delay_ms = 0;
        cfg.min_batch_delay_ms = 0;
        cfg.max_batch_delay_ms = 0;
        cfg.min_channel_delay_secs = 0;
        cfg.max_channel_delay_secs = 0;
        cfg.media_download_delay_ms = 0;
        cfg.min_flood_buffer_secs = 0;
        cfg.max_flood_buffer_secs = 0;
        cfg.min_download_flood_buffer_secs = 0;
        cfg.max_download_flood_buffer_secs = 0;
        cfg
    }

    async fn scrape_with(
        api: &MockApi,
        governor: &RateGovernor,
        batch_size: usize,
        watermark: i64,
    ) -> (ChannelRunResult, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let downloader = MediaDownloader::new(dir.path().join("images"));
        let writer = MessageWriter::new(dir.path().join("messages"));
        let scraper = ChannelScraper::new(api, governor, &downloader, &writer, batch_size);
        let result = scraper
            .scrape_channel("https://t.me/testchannel", watermark)
            .await
            .unwrap();
        (result, dir)
    }

    fn read_records(path: &Path) -> Vec<MessageRecord> {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn unsupported_media_is_skipped_without_download() {
        let api = mock(vec![raw(3, Attachment::Other), plain(2), raw(1, Attachment::Other)]);
        let governor = RateGovernor::new(instant_config(10));

        let (result, _dir) = scrape_with(&api, &governor, 10, 0).await;

        assert_eq!(result.status, ScrapeStatus::Success);
        assert_eq!(result.messages_count, 3);
        assert_eq!(result.images_downloaded_count, 0);
        assert!(api.downloads.lock().unwrap().is_empty());

        let records = read_records(result.output_file.as_deref().unwrap());
        for record in &records {
            assert!(!record.has_media);
            assert_eq!(record.media_kind, MediaKind::None);
            assert_eq!(record.media_file_path, None);
        }
    }

    #[tokio::test]
    async fn failed_download_keeps_media_known_missing() {
        let mut api = mock(vec![raw(7, Attachment::Photo)]);
        api.failing_downloads.insert(7);
        let governor = RateGovernor::new(instant_config(10));

        let (result, _dir) = scrape_with(&api, &governor, 10, 0).await;

        assert_eq!(result.status, ScrapeStatus::Success);
        assert_eq!(result.messages_count, 1);
        assert_eq!(result.images_downloaded_count, 0);

        let records = read_records(result.output_file.as_deref().unwrap());
        assert!(records[0].has_media);
        assert_eq!(records[0].media_kind, MediaKind::Photo);
        assert_eq!(records[0].media_file_path, None);
    }

    #[tokio::test]
    async fn successful_download_records_the_landed_path() {
        let api = mock(vec![raw(2, Attachment::Photo), plain(1)]);
        let governor = RateGovernor::new(instant_config(10));

        let (result, _dir) = scrape_with(&api, &governor, 10, 0).await;

        assert_eq!(result.images_downloaded_count, 1);
        assert_eq!(*api.downloads.lock().unwrap(), vec![2]);

        let records = read_records(result.output_file.as_deref().unwrap());
        let with_media = records.iter().find(|r| r.message_id == 2).unwrap();
        assert!(with_media.has_media);
        let path = with_media.media_file_path.as_deref().unwrap();
        assert!(Path::new(path).exists());
        assert!(path.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn download_throttle_skips_only_that_file() {
        let mut api = mock(vec![
            raw(3, Attachment::Photo),
            raw(2, Attachment::Photo),
            raw(1, Attachment::Photo),
        ]);
        api.flooding_downloads.insert(2);
        let governor = RateGovernor::new(instant_config(10));

        let (result, _dir) = scrape_with(&api, &governor, 10, 0).await;

        assert_eq!(result.status, ScrapeStatus::Success);
        assert_eq!(result.messages_count, 3);
        assert_eq!(result.images_downloaded_count, 2);
        assert_eq!(*api.downloads.lock().unwrap(), vec![3, 1]);

        let records = read_records(result.output_file.as_deref().unwrap());
        let skipped = records.iter().find(|r| r.message_id == 2).unwrap();
        assert!(skipped.has_media);
        assert_eq!(skipped.media_file_path, None);

        let (_, _, _, downloads, throttles) = governor.stats().snapshot();
        assert_eq!(downloads, 2);
        assert_eq!(throttles, 1);
    }

    #[tokio::test]
    async fn watermark_bounds_the_walk() {
        let api = mock((1..=5).rev().map(plain).collect());
        let governor = RateGovernor::new(instant_config(10));

        let (result, _dir) = scrape_with(&api, &governor, 10, 3).await;

        assert_eq!(result.messages_count, 2);
        let records = read_records(result.output_file.as_deref().unwrap());
        let ids: Vec<i64> = records.iter().map(|r| r.message_id).collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[tokio::test]
    async fn unresolvable_channel_is_contained_per_channel() {
        let mut api = mock(vec![plain(1)]);
        api.unresolvable_targets
            .insert("https://t.me/testchannel".to_string());
        let governor = RateGovernor::new(instant_config(10));

        let (result, _dir) = scrape_with(&api, &governor, 10, 0).await;

        assert_eq!(result.status, ScrapeStatus::Error);
        assert_eq!(result.messages_count, 0);
        assert!(result.output_file.is_none());
        assert!(result.error_detail.is_some());
    }

    #[tokio::test]
    async fn flood_mid_scan_still_writes_collected_records() {
        let mut api = mock((1..=6).rev().map(plain).collect());
        // First page serves [6, 5]; the follow-up fetch at offset 5 throttles
        api.flood_at_offset = Some(5);
        let governor = RateGovernor::new(instant_config(2));

        let (result, _dir) = scrape_with(&api, &governor, 2, 0).await;

        assert_eq!(result.status, ScrapeStatus::FloodWait);
        assert_eq!(result.messages_count, 2);
        let records = read_records(result.output_file.as_deref().unwrap());
        let ids: Vec<i64> = records.iter().map(|r| r.message_id).collect();
        assert_eq!(ids, vec![6, 5]);
    }

    #[tokio::test]
    async fn batch_pause_fires_per_full_batch() {
        let api = mock((1..=250).rev().map(plain).collect());
        let governor = RateGovernor::new(instant_config(100));

        let (result, _dir) = scrape_with(&api, &governor, 100, 0).await;

        assert_eq!(result.messages_count, 250);
        let (messages, batches, _, _, _) = governor.stats().snapshot();
        assert_eq!(messages, 250);
        assert_eq!(batches, 2);
    }

    #[tokio::test]
    async fn account_ban_aborts_and_discards_remaining_channels() {
        let mut api = mock(vec![plain(2), plain(1)]);
        api.banned_targets.insert("https://t.me/second".to_string());

        let mut cfg = instant_config(10);
        cfg.channels = vec![
            "https://t.me/first".to_string(),
            "https://t.me/second".to_string(),
            "https://t.me/third".to_string(),
        ];

        let dir = tempfile::tempdir().unwrap();
        let runner = ScrapeRunner::new(
            api,
            cfg,
            dir.path().join("messages"),
            dir.path().join("images"),
        );

        let outcome = runner.run().await;

        assert!(outcome.is_fatal());
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].status, ScrapeStatus::Success);
        assert_eq!(outcome.results[0].messages_count, 2);
    }

    #[test]
    fn writer_round_trips_record_fields() {
        let dir = tempfile::tempdir().unwrap();
        let writer = MessageWriter::new(dir.path().to_path_buf());

        let records: Vec<MessageRecord> = vec![
            record_fixture(11, MediaKind::Photo, Some("/tmp/11.jpg".to_string())),
            record_fixture(10, MediaKind::None, None),
        ];

        let path = writer.write("round_trip", &records).unwrap();
        assert_eq!(read_records(&path), records);
    }

    #[test]
    fn writer_never_collides_within_one_second() {
        let dir = tempfile::tempdir().unwrap();
        let writer = MessageWriter::new(dir.path().to_path_buf());
        let records = vec![record_fixture(1, MediaKind::None, None)];

        let first = writer.write("collide", &records).unwrap();
        let second = writer.write("collide", &records).unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }

    fn record_fixture(
        id: i64,
        media_kind: MediaKind,
        media_file_path: Option<String>,
    ) -> MessageRecord {
        MessageRecord {
            message_id: id,
            sender_id: Some(1001),
            sender_kind: Some("channel".to_string()),
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000 + id, 0).unwrap(),
            text: Some(format!("message {}", id)),
            view_count: Some(10),
            forward_count: Some(1),
            reply_count: None,
            has_media: media_kind != MediaKind::None,
            media_kind,
            media_file_path,
            grouped_id: None,
            post_author: Some("editor".to_string()),
            is_channel_post: true,
            channel_id: 4242,
            channel_title: "Test Channel".to_string(),
            channel_username: Some("testchannel".to_string()),
            raw_payload: json!({ "id": id }),
        }
    }

    #[test]
    fn channel_names_are_directory_safe() {
        assert_eq!(clean_channel_name("My Channel!"), "my_channel");
        assert_eq!(clean_channel_name("Crypto-News 24/7"), "crypto-news_247");
        assert_eq!(clean_channel_name(""), "unknown_channel");
        assert_eq!(clean_channel_name("✨✨"), "unknown_channel");
    }

    #[test]
    fn extension_priority_is_photo_then_mime_then_file_name() {
        assert_eq!(derive_extension(&Attachment::Photo), ".jpg");
        assert_eq!(
            derive_extension(&Attachment::DocumentImage {
                mime_type: "image/png".to_string(),
                file_name: Some("ignored.gif".to_string()),
            }),
            ".png"
        );
        assert_eq!(
            derive_extension(&Attachment::DocumentImage {
                mime_type: "image/svg+xml".to_string(),
                file_name: Some("diagram.svg".to_string()),
            }),
            ".svg"
        );
        assert_eq!(
            derive_extension(&Attachment::DocumentImage {
                mime_type: "image/x-unknown".to_string(),
                file_name: None,
            }),
            ".bin"
        );
    }
}
