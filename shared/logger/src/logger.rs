//! The [`Logger`] handle.

use crate::error::Result;
use crate::log_level::LogLevel;
use crate::log_message::LogMessage;
use crate::sink::{LogCapture, LogSink, SinkHandle};
use std::path::PathBuf;

/// Thread-safe, cloneable logger.
///
/// Clones and loggers derived with [`Logger::for_component`] share one sink,
/// so a whole process can write to a single file through one writer thread.
///
/// # Examples
///
/// ```
/// use logging::{LogLevel, Logger};
///
/// let (logger, capture) = Logger::in_memory(LogLevel::Info);
/// let device = logger.for_component("Device");
/// device.warn("power on failed");
/// assert!(capture.contains("Device: power on failed"));
/// ```
#[derive(Debug, Clone)]
pub struct Logger {
    sink: SinkHandle,
    level: LogLevel,
    component: Option<String>,
    console_echo: bool,
}

impl Logger {
    /// Creates a file logger; the file is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be opened or the writer thread
    /// cannot be spawned.
    pub fn new(log_path: PathBuf, level: LogLevel) -> Result<Self> {
        Self::with_sink(LogSink::File(log_path), level)
    }

    /// Creates a logger over any sink.
    pub fn with_sink(sink: LogSink, level: LogLevel) -> Result<Self> {
        Ok(Self {
            sink: SinkHandle::open(sink)?,
            level,
            component: None,
            console_echo: false,
        })
    }

    /// Logger printing straight to stdout.
    pub fn console(level: LogLevel) -> Self {
        Self {
            sink: SinkHandle::Console,
            level,
            component: None,
            console_echo: false,
        }
    }

    /// Logger keeping every line in memory; returns the capture to inspect.
    pub fn in_memory(level: LogLevel) -> (Self, LogCapture) {
        let capture = LogCapture::new();
        let logger = Self {
            sink: SinkHandle::Memory(capture.clone()),
            level,
            component: None,
            console_echo: false,
        };
        (logger, capture)
    }

    /// Also prints every recorded line to stdout (ignored for console sinks).
    pub fn with_console_echo(mut self, enabled: bool) -> Self {
        self.console_echo = enabled && !matches!(self.sink, SinkHandle::Console);
        self
    }

    /// Derives a logger tagged with `component` that shares this sink and level.
    pub fn for_component(&self, component: &str) -> Self {
        Self {
            sink: self.sink.clone(),
            level: self.level,
            component: Some(component.to_string()),
            console_echo: self.console_echo,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        if level < self.level {
            return;
        }

        let msg = LogMessage::new(level, self.component.as_deref(), message);
        if self.console_echo {
            println!("{}", msg.format());
        }
        self.sink.write(msg);
    }
}
