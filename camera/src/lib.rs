//! # Camera
//!
//! Lifecycle and synchronization core for a shared camera device.
//!
//! ## Public API
//!
//! - **`CameraSession`** - One handle on the camera: detection, video, on/off
//! - **`DeviceActivation`** - Gate that switches the device on at most once
//! - **`DetectionTask`** - Background detection loop with one-shot completion
//! - **`VideoTask`** - Background video stream: liveness, cancel, join
//! - **`Detector`**, **`BodyDetector`**, **`MotionDetector`**, **`HandDetector`** -
//!   Detection capabilities, with stub implementations
//! - **`CameraSettings`** - JSON configuration
//!
//! ## Example Usage
//!
//! ```no_run
//! use camera::{CameraSession, CameraSettings};
//! use logging::{LogLevel, Logger};
//!
//! let logger = Logger::console(LogLevel::Info);
//! let session = CameraSession::from_settings(&CameraSettings::default(), logger);
//!
//! session.start_video((1920, 1080, 30)).unwrap();
//! session.wait_for_detection();
//! session.turn_off();
//! session.join_video().unwrap();
//! assert!(!session.is_video_alive());
//! ```

pub mod config;
pub mod detection;
pub mod device;
pub mod error;
pub mod session;
pub mod task;

pub use config::{CameraSettings, LoggingConfig};
pub use detection::{
    BodyDetection, BodyDetector, CombinedDetector, Detector, HandCoordinates, HandDetection,
    HandDetector, MotionDetection, MotionDetector,
};
pub use device::{DeviceActivation, DeviceDriver, FaultInjectingDriver, SimulatedDriver};
pub use error::{CameraError, Result};
pub use session::{CameraSession, StreamFactory};
pub use task::{
    CancelToken, DetectionOutcome, DetectionPhase, DetectionResult, DetectionTask, IdleStream,
    VideoConfig, VideoRequest, VideoStream, VideoTask, WaitInterrupter,
};
