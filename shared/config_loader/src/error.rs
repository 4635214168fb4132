//! Configuration loading errors.

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    /// Nothing at the path, or none of the searched locations matched
    FileNotFound(String),
    /// The file is there but unreadable
    ReadError { path: String, source: io::Error },
    /// Content does not deserialize into the requested type
    ParseError(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "no config file at {}", path),
            ConfigError::ReadError { path, source } => write!(f, "cannot read {}: {}", path, source),
            ConfigError::ParseError(err) => write!(f, "bad config json: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileNotFound(_) => None,
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err)
    }
}
