//! Telegram channel ingestion core
//!
//! Pulls message history and image media from a configured list of public
//! channels and lands them as dated JSON documents plus image files on disk.
//! Downstream pipeline stages (loader, enrichment, reporting) consume those
//! files; nothing in this crate reads them back.

pub mod arguments;
pub mod client;
pub mod config;
pub mod errors; // Structured error handling
pub mod logger;
pub mod paths;
pub mod run;
pub mod scraper;
