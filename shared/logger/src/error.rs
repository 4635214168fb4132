//! Logger setup errors.

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, LoggingError>;

/// Why a logger could not be built or configured
#[derive(Debug)]
pub enum LoggingError {
    /// Opening the log file failed
    Io(io::Error),
    /// Level name not recognised
    UnknownLevel(String),
    /// Spawning the file writer thread failed
    Writer(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::Io(err) => write!(f, "Cannot open log file: {}", err),
            LoggingError::UnknownLevel(name) => write!(f, "Unknown log level: '{}'", name),
            LoggingError::Writer(msg) => write!(f, "Log writer error: {}", msg),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LoggingError {
    fn from(err: io::Error) -> Self {
        LoggingError::Io(err)
    }
}
