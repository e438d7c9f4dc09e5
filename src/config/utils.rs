/// Configuration utilities - loading and access helpers
///
/// This module provides utility functions for working with the configuration
/// system:
/// - Loading configuration from disk
/// - Environment-variable credential overrides
/// - Thread-safe access helpers
use super::schemas::Config;
use once_cell::sync::OnceCell;
use std::sync::RwLock;

/// Global configuration instance
///
/// This is the single source of truth for all configuration values.
/// Access it using the helper functions below.
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Load configuration from a specific file path and initialize the global CONFIG
///
/// If the config file doesn't exist, default values from the schema
/// definitions are used. Credentials can always be overridden from the
/// environment so they never have to live in the file.
///
/// # Returns
/// - `Ok(())` - Configuration loaded successfully
/// - `Err(String)` - Error message if loading failed
pub fn load_config_from_path(path: &str) -> Result<(), String> {
    let mut config = if std::path::Path::new(path).exists() {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;

        toml::from_str::<Config>(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))?
    } else {
        eprintln!("Config file '{}' not found, using default values", path);
        Config::default()
    };

    apply_env_overrides(&mut config);

    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| "Config already initialized".to_string())?;

    Ok(())
}

/// Apply credential overrides from the process environment
///
/// Mirrors the deployment convention of the rest of the pipeline: secrets are
/// injected via environment, everything else lives in config.toml.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(api_id) = std::env::var("TELEGRAM_API_ID") {
        if let Ok(parsed) = api_id.trim().parse::<i32>() {
            config.telegram.api_id = parsed;
        }
    }
    if let Ok(api_hash) = std::env::var("TELEGRAM_API_HASH") {
        if !api_hash.trim().is_empty() {
            config.telegram.api_hash = api_hash.trim().to_string();
        }
    }
    if let Ok(phone) = std::env::var("TELEGRAM_PHONE") {
        if !phone.trim().is_empty() {
            config.telegram.phone_number = phone.trim().to_string();
        }
    }
    if let Ok(password) = std::env::var("TELEGRAM_PASSWORD") {
        if !password.is_empty() {
            config.telegram.password = password;
        }
    }
}

/// Execute a function with read access to the configuration
///
/// This is the recommended way to read configuration values.
/// The closure receives an immutable reference to the Config.
///
/// # Example
/// ```rust,ignore
/// let batch_size = with_config(|cfg| cfg.scraper.batch_size);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    let config_lock = CONFIG
        .get()
        .expect("Config not initialized. Call load_config_from_path() first.");

    let config = config_lock
        .read()
        .expect("Failed to acquire config read lock");

    f(&config)
}

/// Get a clone of the entire configuration
///
/// Useful when values need to be held across await points.
/// Note: this clones the whole config; prefer with_config() for simple reads.
pub fn get_config() -> Config {
    with_config(|c| c.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_constants() {
        let config = Config::default();
        assert_eq!(config.scraper.batch_size, 100);
        assert_eq!(config.scraper.start_message_id, 0);
        assert_eq!(config.scraper.min_channel_delay_secs, 10);
        assert_eq!(config.scraper.max_channel_delay_secs, 30);
        assert!(config.scraper.channels.is_empty());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [scraper]
            channels = ["https://t.me/example"]
            batch_size = 50
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(parsed.scraper.channels.len(), 1);
        assert_eq!(parsed.scraper.batch_size, 50);
        // Untouched sections keep their defaults
        assert_eq!(parsed.scraper.min_message_delay_ms, 100);
        assert_eq!(parsed.telegram.session_file, "telegram.session");
    }
}
