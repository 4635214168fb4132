//! A single formatted log record.

use crate::log_level::LogLevel;
use chrono::Local;
use std::thread;

#[derive(Debug, Clone)]
pub(crate) struct LogMessage {
    pub timestamp: String,
    pub level: LogLevel,
    pub thread: String,
    pub component: Option<String>,
    pub message: String,
}

impl LogMessage {
    /// Stamps a message with the local time and the emitting thread's name.
    pub fn new(level: LogLevel, component: Option<&str>, message: &str) -> Self {
        let current = thread::current();
        let thread = match current.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", current.id()),
        };

        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level,
            thread,
            component: component.map(str::to_string),
            message: message.to_string(),
        }
    }

    /// `[timestamp] LEVEL [thread] component: message` without a trailing newline.
    pub fn format(&self) -> String {
        match self.component {
            Some(ref component) => format!(
                "[{}] {} [{}] {}: {}",
                self.timestamp,
                self.level.as_str(),
                self.thread,
                component,
                self.message
            ),
            None => format!(
                "[{}] {} [{}]: {}",
                self.timestamp,
                self.level.as_str(),
                self.thread,
                self.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_component() {
        let msg = LogMessage::new(LogLevel::Warn, Some("Device"), "power on failed");
        let line = msg.format();

        assert!(line.contains("WARN"));
        assert!(line.contains("Device: power on failed"));
        assert!(!line.ends_with('\n'));
    }

    #[test]
    fn test_thread_name_is_recorded() {
        let handle = thread::Builder::new()
            .name("detection-7".to_string())
            .spawn(|| LogMessage::new(LogLevel::Info, None, "tick"))
            .unwrap();
        let msg = handle.join().unwrap();

        assert_eq!(msg.thread, "detection-7");
        assert!(msg.format().contains("[detection-7]: tick"));
    }

    #[test]
    fn test_timestamp_format() {
        let msg = LogMessage::new(LogLevel::Info, None, "Test");

        // YYYY-MM-DD HH:MM:SS.mmm
        assert_eq!(msg.timestamp.len(), 23);
        assert_eq!(&msg.timestamp[4..5], "-");
        assert_eq!(&msg.timestamp[19..20], ".");
    }
}
