//! Channel ingestion core
//!
//! Components in dependency order: the rate governor is consulted at every
//! suspension point, the channel scraper walks history and builds records,
//! the media downloader lands visual attachments, the writer produces the
//! dated JSON documents, and the runner drives the channel list end to end.

pub mod channel;
pub mod media;
pub mod rate;
pub mod runner;
pub mod types;
pub mod writer;

mod tests;

pub use channel::ChannelScraper;
pub use media::MediaDownloader;
pub use rate::RateGovernor;
pub use runner::{RunOutcome, ScrapeRunner};
pub use types::{
    clean_channel_name, ChannelIdentity, ChannelRunResult, DownloadedImage, MediaKind,
    MessageRecord, ScrapeStatus,
};
pub use writer::MessageWriter;
