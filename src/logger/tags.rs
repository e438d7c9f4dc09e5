/// Log tags identifying the subsystem a message came from
///
/// Tags drive both the console prefix and per-module debug filtering:
/// `--debug-channel` enables Debug-level output for `LogTag::Channel` only.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    /// Startup, shutdown, directories, top-level lifecycle
    System,
    /// Configuration loading and overrides
    Config,
    /// Session establishment and interactive login
    Auth,
    /// Channel resolution and message iteration
    Channel,
    /// Media classification and downloads
    Media,
    /// Output document writing
    Storage,
    /// Delay policy and throttle waits
    RateLimit,
    /// End-of-run per-channel summary
    Summary,
}

impl LogTag {
    /// Key used for `--debug-<key>` / `--verbose-<key>` argument matching
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Auth => "auth",
            LogTag::Channel => "channel",
            LogTag::Media => "media",
            LogTag::Storage => "storage",
            LogTag::RateLimit => "ratelimit",
            LogTag::Summary => "summary",
        }
        .to_string()
    }

    /// Uncolored, uppercase form used for the log file
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Auth => "AUTH",
            LogTag::Channel => "CHANNEL",
            LogTag::Media => "MEDIA",
            LogTag::Storage => "STORAGE",
            LogTag::RateLimit => "RATELIMIT",
            LogTag::Summary => "SUMMARY",
        }
    }

    /// All tags, used when expanding `--debug-all`
    pub fn all() -> &'static [LogTag] {
        &[
            LogTag::System,
            LogTag::Config,
            LogTag::Auth,
            LogTag::Channel,
            LogTag::Media,
            LogTag::Storage,
            LogTag::RateLimit,
            LogTag::Summary,
        ]
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
