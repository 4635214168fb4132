//! Thread-safe leveled logging shared by every camera component.
//!
//! A [`Logger`] writes to one [`LogSink`]: an append-only file drained by a
//! dedicated writer thread, the console, or an in-memory [`LogCapture`] that
//! tests can inspect.

pub mod error;
mod log_level;
mod log_message;
mod logger;
mod sink;

pub use error::{LoggingError, Result};
pub use log_level::LogLevel;
pub use logger::Logger;
pub use sink::{LogCapture, LogSink};
