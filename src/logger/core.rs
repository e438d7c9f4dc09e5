//! Filtering core
//!
//! Decides whether a message is emitted at all, then hands it to the
//! formatter. All policy questions are answered against the current
//! [`LoggerConfig`](super::config::LoggerConfig) snapshot.

use super::config::{get_logger_config, is_debug_enabled_for_tag, is_verbose_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Filter decision for one message
///
/// Errors always pass. Everything else must clear the minimum-level
/// threshold; on top of that, Debug needs `--debug-<module>` for the tag,
/// Verbose needs the global `--verbose` or a per-tag override, and a
/// non-empty `enabled_tags` set restricts output to those tags.
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();
    if level > config.min_level {
        return false;
    }

    match level {
        LogLevel::Debug => is_debug_enabled_for_tag(tag),
        LogLevel::Verbose => {
            config.min_level == LogLevel::Verbose || is_verbose_enabled_for_tag(tag)
        }
        _ => config.enabled_tags.is_empty() || config.enabled_tags.contains(&tag.to_debug_key()),
    }
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if should_log(&tag, level) {
        super::format::format_and_log(tag, level.as_str(), message);
    }
}
