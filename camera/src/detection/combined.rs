//! Combined detector used by the detection loop.

use super::stubs::{BodyDetection, HandDetection, MotionDetection};
use super::traits::{BodyDetector, Detector, HandDetector, MotionDetector};
use logging::Logger;

/// One body, one motion and one hand detector evaluated together
///
/// `detect()` is positive only when all three detect. Evaluation stops at
/// the first negative answer.
pub struct CombinedDetector {
    body: Box<dyn BodyDetector>,
    motion: Box<dyn MotionDetector>,
    hand: Box<dyn HandDetector>,
    logger: Logger,
}

impl CombinedDetector {
    pub fn new(
        body: Box<dyn BodyDetector>,
        motion: Box<dyn MotionDetector>,
        hand: Box<dyn HandDetector>,
        logger: Logger,
    ) -> Self {
        Self {
            body,
            motion,
            hand,
            logger,
        }
    }

    /// Builds the combination out of the stub detectors
    pub fn stubbed(hand_model: &str, hand_gesture: &str, logger: Logger) -> Self {
        Self::new(
            Box::new(BodyDetection::new(logger.clone())),
            Box::new(MotionDetection::new(logger.clone())),
            Box::new(HandDetection::new(hand_model, hand_gesture, logger.clone())),
            logger,
        )
    }

    fn check<D: Detector + ?Sized>(&self, detector: &D) -> bool {
        let seen = detector.detect();
        if !seen {
            self.logger
                .debug(&format!("{} detector reported nothing", detector.name()));
        }
        seen
    }
}

impl Detector for CombinedDetector {
    fn detect(&self) -> bool {
        self.logger.debug("Combined detection logic.");

        let detected =
            self.check(&*self.body) && self.check(&*self.motion) && self.check(&*self.hand);

        if detected {
            self.logger.info("Combined detection result: Detected.");
        }
        detected
    }

    fn name(&self) -> &str {
        "combined"
    }
}

impl HandDetector for CombinedDetector {
    fn coordinates_x(&self) -> f32 {
        self.hand.coordinates_x()
    }

    fn coordinates_y(&self) -> f32 {
        self.hand.coordinates_y()
    }
}
