//! Settings for the device, the detection loop and video defaults.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! {
//!     "device": { "fault_injection": false, "warmup_ms": 250 },
//!     "detection": { "poll_interval_ms": 50 },
//!     "logging": { "log_level": "debug" }
//! }
//! ```

use crate::config::LoggingConfig;
use crate::error::{CameraError, Result};
use crate::task::VideoConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable that may point at the settings file
pub const CONFIG_ENV_VAR: &str = "CAMERA_CONFIG";

/// Device start-up behaviour
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Use the driver whose power-on always fails
    pub fault_injection: bool,
    /// Delay after a successful power-on before the device counts as active
    pub warmup_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            fault_injection: true,
            warmup_ms: 0,
        }
    }
}

/// Detection loop settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Pause between detection passes that saw nothing
    pub poll_interval_ms: u64,
    pub hand_model: String,
    pub hand_gesture: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            hand_model: "ModelXYZ".to_string(),
            hand_gesture: "Gesture".to_string(),
        }
    }
}

/// Defaults applied to video requests
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VideoDefaults {
    /// Frame rate for requests given as `(width, height)`
    pub default_frame_rate: u32,
}

impl Default for VideoDefaults {
    fn default() -> Self {
        Self {
            default_frame_rate: VideoConfig::DEFAULT_FRAME_RATE,
        }
    }
}

/// Complete camera configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub logging: LoggingConfig,
    pub device: DeviceConfig,
    pub detection: DetectionConfig,
    pub video: VideoDefaults,
}

impl CameraSettings {
    /// Loads and validates settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: CameraSettings = config_loader::load_json(path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses and validates settings from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let settings: CameraSettings = config_loader::parse_json(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Searches `$CAMERA_CONFIG`, `./config/` and `./` for `filename`
    pub fn find_and_load(filename: &str) -> Result<Self> {
        let path = config_loader::find_config_file(filename, CONFIG_ENV_VAR)?;
        Self::load_from_file(path)
    }

    /// Rejects values the tasks cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.detection.poll_interval_ms == 0 {
            return Err(CameraError::Config(
                "detection.poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        // Any resolution will do; only the frame rate is under test here
        VideoConfig::new(1, 1, self.video.default_frame_rate)
            .validate()
            .map_err(|e| CameraError::Config(format!("video.default_frame_rate: {}", e)))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.detection.poll_interval_ms)
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.device.warmup_ms)
    }
}
