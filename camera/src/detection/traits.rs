//! Detector traits
//!
//! Every detector answers one question, "is it there?", and may not block
//! indefinitely while doing so. Hand detectors also report where.

use std::fmt;

/// Base contract for all detectors
///
/// Detectors are shared with the detection thread, so they must be
/// `Send + Sync` and take `&self`.
pub trait Detector: Send + Sync {
    /// Runs one detection pass and reports whether the target was seen
    fn detect(&self) -> bool;

    /// Human-readable name used in log lines
    fn name(&self) -> &str;
}

/// Detects a human body in the frame
pub trait BodyDetector: Detector {}

/// Detects movement between frames
pub trait MotionDetector: Detector {}

/// Detects a hand and reports its position
///
/// Coordinates are meaningful after at least one successful `detect()`.
pub trait HandDetector: Detector {
    fn coordinates_x(&self) -> f32;

    fn coordinates_y(&self) -> f32;

    /// Both coordinates as one snapshot
    fn coordinates(&self) -> HandCoordinates {
        HandCoordinates::new(self.coordinates_x(), self.coordinates_y())
    }
}

/// Position of a detected hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandCoordinates {
    pub x: f32,
    pub y: f32,
}

impl HandCoordinates {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for HandCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
