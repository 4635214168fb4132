use crate::error::LoggingError;
use std::fmt;
use std::str::FromStr;

/// How important a record is. Records below a logger's level are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Every level, least severe first
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    /// Tag written in every log line
    pub fn as_str(&self) -> &'static str {
        ["DEBUG", "INFO", "WARN", "ERROR"][*self as usize]
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    /// Case-insensitive; `warning` is an alias of `warn`.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = match name.trim() {
            alias if alias.eq_ignore_ascii_case("warning") => "WARN",
            other => other,
        };

        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LoggingError::UnknownLevel(name.to_string()))
    }
}
