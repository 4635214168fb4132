//! Camera configuration

pub mod camera_settings;
pub mod logging_config;

pub use camera_settings::{CameraSettings, DetectionConfig, DeviceConfig, VideoDefaults};
pub use logging_config::LoggingConfig;
