//! Destinations a [`Logger`](crate::Logger) can write to.

use crate::error::{LoggingError, Result};
use crate::log_message::LogMessage;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread;

/// Where formatted log lines end up.
#[derive(Debug, Clone)]
pub enum LogSink {
    /// Append to a file through a background writer thread.
    File(PathBuf),
    /// Print to stdout from the calling thread.
    Console,
    /// Keep lines in memory, see [`LogCapture`].
    Memory(LogCapture),
}

/// Shared buffer of formatted log lines, mainly for assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line captured so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// True if any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    pub(crate) fn push(&self, line: String) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push(line);
    }
}

/// Open sink owned by a logger family (all clones and components share it).
#[derive(Debug, Clone)]
pub(crate) enum SinkHandle {
    File(Sender<LogMessage>),
    Console,
    Memory(LogCapture),
}

impl SinkHandle {
    pub fn open(sink: LogSink) -> Result<Self> {
        match sink {
            LogSink::File(path) => spawn_file_writer(&path).map(SinkHandle::File),
            LogSink::Console => Ok(SinkHandle::Console),
            LogSink::Memory(capture) => Ok(SinkHandle::Memory(capture)),
        }
    }

    pub fn write(&self, message: LogMessage) {
        match self {
            // The writer thread only goes away at process exit.
            SinkHandle::File(sender) => {
                let _ = sender.send(message);
            }
            SinkHandle::Console => println!("{}", message.format()),
            SinkHandle::Memory(capture) => capture.push(message.format()),
        }
    }
}

/// Opens `path` for append and drains messages into it on a dedicated thread.
fn spawn_file_writer(path: &Path) -> Result<Sender<LogMessage>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let (sender, receiver) = channel();

    thread::Builder::new()
        .name("log-writer".to_string())
        .spawn(move || run_file_writer(file, receiver))
        .map_err(|e| LoggingError::Writer(e.to_string()))?;

    Ok(sender)
}

fn run_file_writer(mut file: File, receiver: Receiver<LogMessage>) {
    for message in receiver {
        if let Err(e) = writeln!(file, "{}", message.format()).and_then(|_| file.flush()) {
            eprintln!("Error writing log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_level::LogLevel;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_creates_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("camera.log");

        let handle = SinkHandle::open(LogSink::File(log_path.clone()));
        assert!(handle.is_ok());
        assert!(log_path.exists());
    }

    #[test]
    fn test_file_sink_writes_in_background() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("camera.log");

        let handle = SinkHandle::open(LogSink::File(log_path.clone())).unwrap();
        handle.write(LogMessage::new(LogLevel::Info, None, "writer test"));
        drop(handle);
        thread::sleep(Duration::from_millis(100));

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("writer test"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_file_sink_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("missing").join("camera.log");

        let result = SinkHandle::open(LogSink::File(log_path));
        assert!(matches!(result, Err(LoggingError::Io(_))));
    }

    #[test]
    fn test_memory_sink_is_shared_between_clones() {
        let capture = LogCapture::new();
        let handle = SinkHandle::open(LogSink::Memory(capture.clone())).unwrap();

        handle
            .clone()
            .write(LogMessage::new(LogLevel::Debug, Some("Video"), "frame"));

        assert_eq!(capture.lines().len(), 1);
        assert!(capture.contains("Video: frame"));
    }
}
