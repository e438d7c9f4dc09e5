//! Logger configuration derived from command-line arguments
//!
//! Scans the argument list once at init and answers filtering questions for
//! the core module. Supported flags:
//! - `--debug-<tag>` enable Debug output for one tag (`--debug-all` for every tag)
//! - `--verbose` enable Verbose output globally
//! - `--verbose-<tag>` enable Verbose output for one tag
//! - `--quiet` raise the threshold to Warning
//! - `--log-level <level>` explicit minimum level

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments::{get_arg_value, get_cmd_args};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level that gets through (Error always does)
    pub min_level: LogLevel,
    /// Tags with Debug output enabled via --debug-<tag>
    pub debug_tags: HashSet<String>,
    /// Tags with Verbose output enabled via --verbose-<tag>
    pub verbose_tags: HashSet<String>,
    /// When non-empty, only these tags are shown at all
    pub enabled_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Build the logger configuration from the current command-line arguments
pub fn init_from_args() {
    let args = get_cmd_args();
    let mut config = LoggerConfig::default();

    for arg in &args {
        if let Some(tag) = arg.strip_prefix("--debug-") {
            if tag == "all" {
                for t in LogTag::all() {
                    config.debug_tags.insert(t.to_debug_key());
                }
            } else {
                config.debug_tags.insert(tag.to_string());
            }
        } else if let Some(tag) = arg.strip_prefix("--verbose-") {
            config.verbose_tags.insert(tag.to_string());
        }
    }

    if args.iter().any(|a| a == "--verbose") {
        config.min_level = LogLevel::Verbose;
    } else if args.iter().any(|a| a == "--quiet") {
        config.min_level = LogLevel::Warning;
    } else if !config.debug_tags.is_empty() {
        // Debug flags are pointless below the Debug threshold
        config.min_level = LogLevel::Debug;
    }

    if let Some(level) = get_arg_value("--log-level").and_then(|v| LogLevel::from_str(&v)) {
        config.min_level = level;
    }

    set_logger_config(config);
}

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}

pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut current) = LOGGER_CONFIG.write() {
        *current = config;
    }
}

/// Whether --debug-<tag> was passed for this tag
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    get_logger_config().debug_tags.contains(&tag.to_debug_key())
}

/// Whether --verbose-<tag> was passed for this tag
pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    get_logger_config()
        .verbose_tags
        .contains(&tag.to_debug_key())
}
