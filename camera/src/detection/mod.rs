//! Detection capabilities
//!
//! Body, motion and hand recognition are opaque boolean signals here; the
//! real algorithms live behind the [`Detector`] traits.

pub mod combined;
pub mod stubs;
pub mod traits;

pub use combined::CombinedDetector;
pub use stubs::{BodyDetection, HandDetection, MotionDetection};
pub use traits::{BodyDetector, Detector, HandCoordinates, HandDetector, MotionDetector};
