//! Structured logging for telescrape
//!
//! This module provides a clean, ergonomic logging API with:
//! - Automatic debug mode filtering from command-line arguments
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Dual output: colored console + file persistence
//!
//! ## Usage
//!
//! ```rust,ignore
//! use telescrape::logger::{self, LogTag};
//!
//! logger::error(LogTag::Auth, "Connection failed");
//! logger::warning(LogTag::RateLimit, "Server requested a long wait");
//! logger::info(LogTag::Channel, "Scraping channel: ...");
//! logger::debug(LogTag::Media, "Extension derived from mime type"); // Only if --debug-media
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, after the logs directory exists:
//! ```rust,ignore
//! logger::init();
//! ```

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

// Re-export public types
pub use config::{get_logger_config, init_from_args, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// This must be called once at application startup, before any logging occurs.
/// It parses command-line arguments for debug flags, configures per-module
/// debug modes and initializes file logging.
pub fn init() {
    // Initialize configuration from command-line arguments
    config::init_from_args();

    // Initialize file logging
    file::init_file_logging();
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics)
///
/// Debug logs are ONLY shown when the --debug-<module> flag is provided.
/// Automatically filtered based on the tag.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (very detailed tracing)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Force flush all pending log writes
///
/// Call this during shutdown to ensure all logs are written to disk.
pub fn flush() {
    file::flush_file_logging();
}
