//! Centralized path resolution for telescrape
//!
//! All file and directory paths are resolved through this module so the
//! scraper, logger and config agree on where data lives.
//!
//! ## Path Strategy
//!
//! The base directory is taken from `TELESCRAPE_DATA_DIR` (or the legacy
//! `DATA_LAKE_PATH`) when set, otherwise from the platform data directory:
//! - **macOS**: `~/Library/Application Support/Telescrape/`
//! - **Windows**: `%LOCALAPPDATA%\Telescrape\`
//! - **Linux**: `$XDG_DATA_HOME/Telescrape/` (fallback `~/.local/share/Telescrape/`)
//!
//! ## Directory Structure
//!
//! ```text
//! <base>/
//! ├── config.toml
//! ├── telegram.session
//! ├── telegram_messages/
//! │   └── <YYYY-MM-DD>/<channel>/<channel>_<YYYY-MM-DD>_<HHMMSS>.json
//! ├── telegram_images/
//! │   └── <channel>/<messageId>_<YYYYMMDDHHMMSS>.<ext>
//! └── logs/
//!     └── telescrape_<YYYY-MM-DD>.log
//! ```

use once_cell::sync::Lazy;
use std::path::PathBuf;

/// Lazy-initialized base directory (thread-safe)
static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(resolve_base_directory);

/// Resolves the base directory for all telescrape data
fn resolve_base_directory() -> PathBuf {
    const APP_DIR: &str = "Telescrape";

    // Explicit override wins; DATA_LAKE_PATH is the name the rest of the
    // pipeline uses for the raw-data root.
    for var in ["TELESCRAPE_DATA_DIR", "DATA_LAKE_PATH"] {
        if let Ok(dir) = std::env::var(var) {
            if !dir.trim().is_empty() {
                return PathBuf::from(dir);
            }
        }
    }

    if let Some(dir) = dirs::data_local_dir() {
        return dir.join(APP_DIR);
    }

    if let Some(dir) = dirs::data_dir() {
        return dir.join(APP_DIR);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(APP_DIR);
    }

    PathBuf::from(APP_DIR)
}

/// Returns the base directory for all telescrape data
pub fn get_base_directory() -> PathBuf {
    BASE_DIRECTORY.clone()
}

/// Returns the root directory for message JSON documents
pub fn get_messages_root() -> PathBuf {
    BASE_DIRECTORY.join("telegram_messages")
}

/// Returns the root directory for downloaded images
pub fn get_images_root() -> PathBuf {
    BASE_DIRECTORY.join("telegram_images")
}

/// Returns the logs directory path
pub fn get_logs_directory() -> PathBuf {
    BASE_DIRECTORY.join("logs")
}

/// Returns the main configuration file path
pub fn get_config_path() -> PathBuf {
    BASE_DIRECTORY.join("config.toml")
}

/// Returns the session file path for a configured session file name
///
/// Absolute names are used as-is so a mounted session file keeps working.
pub fn get_session_path(session_file: &str) -> PathBuf {
    let candidate = PathBuf::from(session_file);
    if candidate.is_absolute() {
        candidate
    } else {
        BASE_DIRECTORY.join(session_file)
    }
}

/// Ensures all required directories exist
///
/// Creates the base directory and all subdirectories needed for operation.
/// This should be called early in the application startup, before the logger
/// opens its file.
pub fn ensure_all_directories() -> Result<(), String> {
    let dirs_to_create = vec![
        ("base", get_base_directory()),
        ("messages", get_messages_root()),
        ("images", get_images_root()),
        ("logs", get_logs_directory()),
    ];

    for (name, dir) in dirs_to_create {
        std::fs::create_dir_all(&dir).map_err(|e| {
            format!(
                "Failed to create {} directory '{}': {}",
                name,
                dir.display(),
                e
            )
        })?;
    }

    Ok(())
}
