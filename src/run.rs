//! Top-level run lifecycle
//!
//! Staging: directories -> configuration -> authentication -> channel loop ->
//! summary. Authentication failure aborts before any channel is attempted; a
//! fatal outcome from the runner (account ban) surfaces as this function's
//! error so the orchestrator skips downstream pipeline steps.

use crate::client::grammers;
use crate::config;
use crate::logger::{self, LogLevel, LogTag, LoggerConfig};
use crate::paths;
use crate::scraper::ScrapeRunner;
use crate::arguments;

/// Main scraper execution function
pub async fn run_scraper() -> Result<(), String> {
    // Safety backup, already done in main.rs before logger init
    paths::ensure_all_directories()?;

    let config_path = arguments::get_config_override()
        .unwrap_or_else(|| paths::get_config_path().display().to_string());
    config::load_config_from_path(&config_path)?;
    logger::info(
        LogTag::Config,
        &format!("Configuration loaded from {}", config_path),
    );

    let cfg = config::get_config();
    apply_config_log_level(&cfg.general.log_level);

    if cfg.scraper.channels.is_empty() {
        logger::warning(
            LogTag::Config,
            "No channels configured ([scraper] channels in config.toml); nothing to do",
        );
        return Ok(());
    }

    // Authentication is verified before any channel work; without it there
    // are no per-channel results at all.
    let api = grammers::connect_and_authorize(&cfg.telegram)
        .await
        .map_err(|e| e.to_string())?;
    logger::info(LogTag::Auth, "Successfully authorized");

    let runner = ScrapeRunner::new(
        api,
        cfg.scraper.clone(),
        paths::get_messages_root(),
        paths::get_images_root(),
    );

    let outcome = runner.run().await;
    logger::info(LogTag::System, "Scraping process concluded");
    logger::flush();

    match outcome.fatal {
        Some(detail) => Err(detail),
        None => Ok(()),
    }
}

/// Honor the configured log level unless CLI flags already chose one
fn apply_config_log_level(level: &str) {
    let cli_controlled = arguments::get_arg_value("--log-level").is_some()
        || arguments::has_arg("--verbose")
        || arguments::has_arg("--quiet");
    if cli_controlled {
        return;
    }

    let mut logger_config = logger::get_logger_config();
    if let Some(level) = configured_min_level(&logger_config, level) {
        logger_config.min_level = level;
        logger::set_logger_config(logger_config);
    }
}

/// Level the configuration asks for
///
/// The config value wins in both directions (a quieter `log_level =
/// "warning"` lowers the threshold), except that an elevation from
/// `--debug-<tag>` flags is kept.
fn configured_min_level(current: &LoggerConfig, level: &str) -> Option<LogLevel> {
    let level = LogLevel::from_str(level)?;
    if current.debug_tags.is_empty() {
        Some(level)
    } else {
        Some(current.min_level.max(level))
    }
}

#[cfg(test)]
mod tests {
    use super::configured_min_level;
    use crate::logger::{LogLevel, LoggerConfig};

    #[test]
    fn config_level_is_honored_in_both_directions() {
        let current = LoggerConfig::default();
        assert_eq!(
            configured_min_level(&current, "warning"),
            Some(LogLevel::Warning)
        );
        assert_eq!(
            configured_min_level(&current, "error"),
            Some(LogLevel::Error)
        );
        assert_eq!(
            configured_min_level(&current, "verbose"),
            Some(LogLevel::Verbose)
        );
        assert_eq!(configured_min_level(&current, "nonsense"), None);
    }

    #[test]
    fn debug_flag_elevation_survives_a_quieter_config() {
        let mut current = LoggerConfig::default();
        current.debug_tags.insert("channel".to_string());
        current.min_level = LogLevel::Debug;
        assert_eq!(
            configured_min_level(&current, "warning"),
            Some(LogLevel::Debug)
        );
    }
}
