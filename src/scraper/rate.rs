//! Rate governor - all delay policy in one place
//!
//! Every suspension point in the pipeline goes through this type: after each
//! message, after each full batch, after each channel, after each media
//! download, and whenever the server signals a throttle. Delays are drawn
//! uniform-random from the configured ranges; a server-mandated wait is never
//! shortened, only extended by a jittered safety buffer.
//!
//! The duration pickers are pure and public so the policy can be asserted on
//! without sleeping; the async primitives wrap them with `tokio::time::sleep`
//! and keep invocation counters for the run summary.

use crate::config::ScraperConfig;
use crate::logger::{self, LogTag};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Invocation counters, reported at the end of a run
#[derive(Debug, Default)]
pub struct GovernorStats {
    pub messages_paced: AtomicU64,
    pub batches_paced: AtomicU64,
    pub channels_paced: AtomicU64,
    pub downloads_paced: AtomicU64,
    pub throttle_waits: AtomicU64,
}

impl GovernorStats {
    pub fn snapshot(&self) -> (u64, u64, u64, u64, u64) {
        (
            self.messages_paced.load(Ordering::Relaxed),
            self.batches_paced.load(Ordering::Relaxed),
            self.channels_paced.load(Ordering::Relaxed),
            self.downloads_paced.load(Ordering::Relaxed),
            self.throttle_waits.load(Ordering::Relaxed),
        )
    }
}

/// Stateless delay policy (the counters are observability, not behavior)
pub struct RateGovernor {
    config: ScraperConfig,
    stats: GovernorStats,
}

impl RateGovernor {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            stats: GovernorStats::default(),
        }
    }

    pub fn stats(&self) -> &GovernorStats {
        &self.stats
    }

    // ------------------------------------------------------------------
    // Pure duration pickers
    // ------------------------------------------------------------------

    /// Jittered pause after processing a single message
    pub fn message_delay(&self) -> Duration {
        uniform_ms(
            self.config.min_message_delay_ms,
            self.config.max_message_delay_ms,
        )
    }

    /// Jittered pause after a full batch of messages
    pub fn batch_delay(&self) -> Duration {
        uniform_ms(
            self.config.min_batch_delay_ms,
            self.config.max_batch_delay_ms,
        )
    }

    /// Jittered pause between channels
    pub fn channel_delay(&self) -> Duration {
        uniform_ms(
            self.config.min_channel_delay_secs * 1000,
            self.config.max_channel_delay_secs * 1000,
        )
    }

    /// Fixed pause after each media download
    pub fn media_delay(&self) -> Duration {
        Duration::from_millis(self.config.media_download_delay_ms)
    }

    /// Wait for a server throttle raised during channel iteration
    ///
    /// Always at least the server-requested seconds, plus a jittered buffer.
    pub fn throttle_wait(&self, server_wait_secs: u64) -> Duration {
        Duration::from_secs(server_wait_secs)
            + uniform_ms(
                self.config.min_flood_buffer_secs * 1000,
                self.config.max_flood_buffer_secs * 1000,
            )
    }

    /// Wait for a server throttle raised during a single media download
    ///
    /// Same floor guarantee, smaller buffer: a download throttle only skips
    /// one file, so the penalty pause can be shorter.
    pub fn download_throttle_wait(&self, server_wait_secs: u64) -> Duration {
        Duration::from_secs(server_wait_secs)
            + uniform_ms(
                self.config.min_download_flood_buffer_secs * 1000,
                self.config.max_download_flood_buffer_secs * 1000,
            )
    }

    // ------------------------------------------------------------------
    // Suspension primitives
    // ------------------------------------------------------------------

    pub async fn after_message(&self) {
        self.stats.messages_paced.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(self.message_delay()).await;
    }

    pub async fn after_batch(&self, batch_size: usize) {
        self.stats.batches_paced.fetch_add(1, Ordering::Relaxed);
        let delay = self.batch_delay();
        logger::debug(
            LogTag::RateLimit,
            &format!(
                "Batch of {} processed, pausing {:.2}s",
                batch_size,
                delay.as_secs_f64()
            ),
        );
        tokio::time::sleep(delay).await;
    }

    pub async fn after_channel(&self) {
        self.stats.channels_paced.fetch_add(1, Ordering::Relaxed);
        let delay = self.channel_delay();
        logger::info(
            LogTag::RateLimit,
            &format!("Waiting {:.2}s before next channel", delay.as_secs_f64()),
        );
        tokio::time::sleep(delay).await;
    }

    pub async fn after_media_download(&self) {
        self.stats.downloads_paced.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(self.media_delay()).await;
    }

    /// Honor a server throttle signal raised mid-iteration
    pub async fn on_throttle_signal(&self, server_wait_secs: u64) {
        self.stats.throttle_waits.fetch_add(1, Ordering::Relaxed);
        let wait = self.throttle_wait(server_wait_secs);
        logger::warning(
            LogTag::RateLimit,
            &format!(
                "Server throttle: requested {}s, waiting {:.2}s",
                server_wait_secs,
                wait.as_secs_f64()
            ),
        );
        tokio::time::sleep(wait).await;
    }

    /// Honor a server throttle signal raised during a media download
    pub async fn on_download_throttle(&self, server_wait_secs: u64) {
        self.stats.throttle_waits.fetch_add(1, Ordering::Relaxed);
        let wait = self.download_throttle_wait(server_wait_secs);
        logger::warning(
            LogTag::RateLimit,
            &format!(
                "Throttle during download: requested {}s, waiting {:.2}s",
                server_wait_secs,
                wait.as_secs_f64()
            ),
        );
        tokio::time::sleep(wait).await;
    }
}

/// Uniform-random duration between min and max milliseconds (inclusive floor)
fn uniform_ms(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governor() -> RateGovernor {
        RateGovernor::new(ScraperConfig::default())
    }

    #[test]
    fn throttle_wait_never_shortens_server_demand() {
        let g = governor();
        for requested in [0u64, 1, 30, 3600] {
            let wait = g.throttle_wait(requested);
            assert!(
                wait >= Duration::from_secs(requested),
                "wait {:?} shorter than requested {}s",
                wait,
                requested
            );
        }
    }

    #[test]
    fn download_throttle_wait_never_shortens_server_demand() {
        let g = governor();
        for requested in [0u64, 5, 120] {
            let wait = g.download_throttle_wait(requested);
            assert!(wait >= Duration::from_secs(requested));
        }
    }

    #[test]
    fn throttle_buffer_stays_within_configured_range() {
        let g = governor();
        let cfg = ScraperConfig::default();
        for _ in 0..100 {
            let buffer = g.throttle_wait(0);
            assert!(buffer >= Duration::from_secs(cfg.min_flood_buffer_secs));
            assert!(buffer <= Duration::from_secs(cfg.max_flood_buffer_secs));
        }
    }

    #[test]
    fn delays_fall_inside_their_ranges() {
        let g = governor();
        let cfg = ScraperConfig::default();
        for _ in 0..100 {
            let d = g.message_delay();
            assert!(d >= Duration::from_millis(cfg.min_message_delay_ms));
            assert!(d <= Duration::from_millis(cfg.max_message_delay_ms));

            let b = g.batch_delay();
            assert!(b >= Duration::from_millis(cfg.min_batch_delay_ms));
            assert!(b <= Duration::from_millis(cfg.max_batch_delay_ms));
        }
    }

    #[test]
    fn degenerate_range_uses_floor() {
        let mut cfg = ScraperConfig::default();
        cfg.min_message_delay_ms = 250;
        cfg.max_message_delay_ms = 250;
        let g = RateGovernor::new(cfg);
        assert_eq!(g.message_delay(), Duration::from_millis(250));
    }
}
