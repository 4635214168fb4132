//! Error types for camera operations.
//!
//! Every fallible operation in this crate returns [`CameraError`]. Which
//! errors reach the caller depends on the call site: a start-up failure
//! during session construction is only logged, while the same failure from
//! an explicit `turn_on` is returned.

use config_loader::ConfigError;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, CameraError>;

/// Error type for camera operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The device activation side effect failed
    StartupFailure(String),
    /// Operation not allowed in the task's current lifecycle state
    InvalidState(String),
    /// A blocking wait was interrupted before the task finished
    InterruptedWait(String),
    /// The OS refused to spawn a worker thread
    TaskSpawn(String),
    /// A background task panicked
    TaskPanicked(String),
    /// Invalid or unreadable configuration
    Config(String),
}

impl CameraError {
    /// True for errors produced by a failed device activation.
    pub fn is_startup_failure(&self) -> bool {
        matches!(self, CameraError::StartupFailure(_))
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::StartupFailure(msg) => write!(f, "Camera error: {}", msg),
            CameraError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            CameraError::InterruptedWait(msg) => write!(f, "Interrupted wait: {}", msg),
            CameraError::TaskSpawn(msg) => write!(f, "Failed to spawn task: {}", msg),
            CameraError::TaskPanicked(msg) => write!(f, "Task panicked: {}", msg),
            CameraError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<io::Error> for CameraError {
    fn from(err: io::Error) -> Self {
        CameraError::TaskSpawn(err.to_string())
    }
}

impl From<ConfigError> for CameraError {
    fn from(err: ConfigError) -> Self {
        CameraError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_startup_failure() {
        let err = CameraError::StartupFailure("Some error occurred.".to_string());
        assert_eq!(err.to_string(), "Camera error: Some error occurred.");
        assert!(err.is_startup_failure());
    }

    #[test]
    fn test_error_display_invalid_state() {
        let err = CameraError::InvalidState("detection task already started".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid state: detection task already started"
        );
        assert!(!err.is_startup_failure());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::WouldBlock, "no threads left");
        let camera_err: CameraError = io_err.into();

        assert!(matches!(camera_err, CameraError::TaskSpawn(_)));
    }

    #[test]
    fn test_error_from_config() {
        let err: CameraError = ConfigError::FileNotFound("camera.json".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Config error: no config file at camera.json"
        );
    }

    #[test]
    fn test_error_is_error_trait() {
        let err = CameraError::InterruptedWait("join".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
