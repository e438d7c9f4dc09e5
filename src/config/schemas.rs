/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the config_struct! macro which provides:
/// - Single-source definition (no repetition)
/// - Embedded defaults
/// - Serde support
///
/// Delay defaults are deliberately conservative: naive request bursts get the
/// account throttled or banned, so every suspension point carries a jittered
/// pause that approximates human cadence.
use crate::config_struct;

// ============================================================================
// TELEGRAM CREDENTIALS
// ============================================================================

config_struct! {
    /// Platform API credentials and session persistence
    pub struct TelegramConfig {
        /// API identifier from my.telegram.org
        api_id: i32 = 0,
        /// API secret from my.telegram.org
        api_hash: String = String::new(),
        /// Account phone number in international format
        phone_number: String = String::new(),
        /// Two-factor secret, empty when the account has none
        password: String = String::new(),
        /// Session file name (relative names live under the data directory)
        session_file: String = "telegram.session".to_string(),
    }
}

// ============================================================================
// SCRAPER CONFIGURATION
// ============================================================================

config_struct! {
    /// Channel list, batching and the full delay policy
    pub struct ScraperConfig {
        /// Channel URLs or handles to scrape, processed sequentially
        channels: Vec<String> = vec![],

        /// Messages per batch; a batch boundary triggers the batch delay
        batch_size: usize = 100,

        /// Watermark default: only messages with id > this are ingested
        start_message_id: i64 = 0,

        // Per-message pacing
        min_message_delay_ms: u64 = 100,
        max_message_delay_ms: u64 = 500,

        // Pacing after each full batch
        min_batch_delay_ms: u64 = 500,
        max_batch_delay_ms: u64 = 2000,

        // Pacing between channels
        min_channel_delay_secs: u64 = 10,
        max_channel_delay_secs: u64 = 30,

        // Pacing after each media download
        media_download_delay_ms: u64 = 500,

        // Safety buffer added on top of a server-mandated wait
        min_flood_buffer_secs: u64 = 5,
        max_flood_buffer_secs: u64 = 15,

        // Smaller buffer for throttles hit during a single media download
        min_download_flood_buffer_secs: u64 = 2,
        max_download_flood_buffer_secs: u64 = 5,
    }
}

// ============================================================================
// GENERAL CONFIGURATION
// ============================================================================

config_struct! {
    /// Miscellaneous runtime settings
    pub struct GeneralConfig {
        log_level: String = "info".to_string(),
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration loaded from config.toml
    pub struct Config {
        telegram: TelegramConfig = TelegramConfig::default(),
        scraper: ScraperConfig = ScraperConfig::default(),
        general: GeneralConfig = GeneralConfig::default(),
    }
}
