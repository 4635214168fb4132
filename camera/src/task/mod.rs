//! Background units of work
//!
//! Each task runs on its own named OS thread and is observed from other
//! threads through a mutex/condvar pair.

pub mod cancel;
pub mod detection;
pub mod video;

pub use cancel::CancelToken;
pub use detection::{DetectionOutcome, DetectionPhase, DetectionResult, DetectionTask};
pub use video::{IdleStream, VideoConfig, VideoRequest, VideoStream, VideoTask, WaitInterrupter};

use std::any::Any;

/// Extracts a readable message from a thread panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
