//! Stand-in detectors
//!
//! They always report a detection. The hand detector returns a fixed
//! position so callers can exercise the coordinate path end to end.

use super::traits::{BodyDetector, Detector, HandDetector, MotionDetector};
use logging::Logger;

/// Fixed X coordinate reported by [`HandDetection`]
pub const STUB_HAND_X: f32 = 1.245;
/// Fixed Y coordinate reported by [`HandDetection`]
pub const STUB_HAND_Y: f32 = 1.4567;

/// Body detector stub
pub struct BodyDetection {
    logger: Logger,
}

impl BodyDetection {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl Detector for BodyDetection {
    fn detect(&self) -> bool {
        self.logger.debug("Body detected.");
        true
    }

    fn name(&self) -> &str {
        "body"
    }
}

impl BodyDetector for BodyDetection {}

/// Motion detector stub
pub struct MotionDetection {
    logger: Logger,
}

impl MotionDetection {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl Detector for MotionDetection {
    fn detect(&self) -> bool {
        self.logger.debug("Motion detected.");
        true
    }

    fn name(&self) -> &str {
        "motion"
    }
}

impl MotionDetector for MotionDetection {}

/// Hand detector stub tagged with the model and gesture it would run
pub struct HandDetection {
    model: String,
    gesture: String,
    logger: Logger,
}

impl HandDetection {
    pub fn new(model: &str, gesture: &str, logger: Logger) -> Self {
        Self {
            model: model.to_string(),
            gesture: gesture.to_string(),
            logger,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn gesture(&self) -> &str {
        &self.gesture
    }
}

impl Detector for HandDetection {
    fn detect(&self) -> bool {
        self.logger.debug(&format!(
            "{} is detecting a hand ({}).",
            self.model, self.gesture
        ));
        true
    }

    fn name(&self) -> &str {
        "hand"
    }
}

impl HandDetector for HandDetection {
    fn coordinates_x(&self) -> f32 {
        STUB_HAND_X
    }

    fn coordinates_y(&self) -> f32 {
        STUB_HAND_Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::LogLevel;

    #[test]
    fn test_body_and_motion_always_detect() {
        let (logger, capture) = Logger::in_memory(LogLevel::Debug);

        assert!(BodyDetection::new(logger.clone()).detect());
        assert!(MotionDetection::new(logger).detect());
        assert!(capture.contains("Body detected."));
        assert!(capture.contains("Motion detected."));
    }

    #[test]
    fn test_hand_detection_reports_fixed_coordinates() {
        let (logger, capture) = Logger::in_memory(LogLevel::Debug);
        let hand = HandDetection::new("ModelXYZ", "Gesture", logger);

        assert!(hand.detect());
        assert_eq!(hand.coordinates_x(), 1.245);
        assert_eq!(hand.coordinates_y(), 1.4567);
        assert_eq!(hand.model(), "ModelXYZ");
        assert!(capture.contains("ModelXYZ is detecting a hand"));
    }
}
