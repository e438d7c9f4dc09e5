/// Structured error handling for the scraper
///
/// One enum covers the whole error taxonomy. Variants carry enough context to
/// log a useful line without chasing the call site, and `is_fatal()` encodes
/// the propagation policy: only authentication failures and an account ban
/// abort the run, everything else is handled at channel or message scope.

#[derive(Debug, Clone)]
pub enum ScrapeError {
    /// Credentials missing or rejected; aborts before any channel is attempted
    Auth {
        message: String,
    },

    /// Platform banned the account; aborts immediately, no further calls
    AccountBanned {
        detail: String,
    },

    /// Server-signaled throttle (FLOOD_WAIT); recoverable after the wait
    FloodWait {
        seconds: u64,
    },

    /// Channel reference could not be resolved to an identity
    ChannelResolution {
        target: String,
        reason: String,
    },

    /// Media download failure for a single message
    Download {
        message_id: i64,
        reason: String,
    },

    /// Filesystem / output document failure
    Storage {
        path: String,
        reason: String,
    },

    /// Serialization and payload-shape failures
    Data {
        message: String,
    },

    /// Anything else that ends a channel pass
    Generic {
        message: String,
    },
}

impl std::fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeError::Auth { message } => write!(f, "Authentication error: {}", message),
            ScrapeError::AccountBanned { detail } => {
                write!(f, "Account banned by platform: {}", detail)
            }
            ScrapeError::FloodWait { seconds } => {
                write!(f, "Server throttle: must wait {} seconds", seconds)
            }
            ScrapeError::ChannelResolution { target, reason } => {
                write!(f, "Failed to resolve channel '{}': {}", target, reason)
            }
            ScrapeError::Download { message_id, reason } => {
                write!(
                    f,
                    "Media download failed for message {}: {}",
                    message_id, reason
                )
            }
            ScrapeError::Storage { path, reason } => {
                write!(f, "Storage error at '{}': {}", path, reason)
            }
            ScrapeError::Data { message } => write!(f, "Data error: {}", message),
            ScrapeError::Generic { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ScrapeError {}

impl ScrapeError {
    /// Fatal errors terminate the whole run, not just the current channel
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScrapeError::Auth { .. } | ScrapeError::AccountBanned { .. }
        )
    }

    pub fn auth(message: impl Into<String>) -> Self {
        ScrapeError::Auth {
            message: message.into(),
        }
    }

    pub fn banned(detail: impl Into<String>) -> Self {
        ScrapeError::AccountBanned {
            detail: detail.into(),
        }
    }

    pub fn resolution(target: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrapeError::ChannelResolution {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn download(message_id: i64, reason: impl Into<String>) -> Self {
        ScrapeError::Download {
            message_id,
            reason: reason.into(),
        }
    }

    pub fn storage(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrapeError::Storage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        ScrapeError::Generic {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(err: serde_json::Error) -> Self {
        ScrapeError::Data {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}
