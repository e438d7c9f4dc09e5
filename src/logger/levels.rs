//! Severity levels
//!
//! Ordered so a minimum-level threshold is a single comparison:
//! `Error < Warning < Info < Debug < Verbose`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Always emitted, cannot be filtered out
    Error = 0,
    /// Needs attention but the run continues
    Warning = 1,
    /// Normal operational output (the default threshold)
    Info = 2,
    /// Per-module diagnostics, gated by `--debug-<module>`
    Debug = 3,
    /// Trace-grade output, gated by `--verbose`
    Verbose = 4,
}

impl LogLevel {
    /// Uppercase form used in log prefixes
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Verbose => "VERBOSE",
        }
    }

    /// Case-insensitive parse, accepting the common aliases
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ERROR" => Some(LogLevel::Error),
            "WARNING" | "WARN" => Some(LogLevel::Warning),
            "INFO" => Some(LogLevel::Info),
            "DEBUG" => Some(LogLevel::Debug),
            "VERBOSE" | "TRACE" => Some(LogLevel::Verbose),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
