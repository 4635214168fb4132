//! Video capture task
//!
//! A video stream runs on its own thread next to the detection loop. Its
//! owner can poll liveness, request a cooperative stop and join it. A join
//! can be interrupted from another thread through a [`WaitInterrupter`].

use crate::error::{CameraError, Result};
use crate::task::cancel::CancelToken;
use crate::task::panic_message;
use logging::Logger;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Resolved capture parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl VideoConfig {
    /// Frame rate used when a request leaves it out
    pub const DEFAULT_FRAME_RATE: u32 = 30;
    /// Minimum valid frame rate
    const MIN_FRAME_RATE: u32 = 1;
    /// Maximum valid frame rate
    const MAX_FRAME_RATE: u32 = 240;
    /// Minimum valid resolution dimension
    const MIN_DIMENSION: u32 = 1;
    /// Maximum valid resolution dimension (8K)
    const MAX_DIMENSION: u32 = 7680;

    pub fn new(width: u32, height: u32, frame_rate: u32) -> Self {
        Self {
            width,
            height,
            frame_rate,
        }
    }

    pub fn with_default_rate(width: u32, height: u32) -> Self {
        Self::new(width, height, Self::DEFAULT_FRAME_RATE)
    }

    /// Checks resolution and frame rate bounds
    ///
    /// # Returns
    /// * `Err(CameraError::Config)` - If a dimension or the frame rate is
    ///   out of range
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [("Width", self.width), ("Height", self.height)] {
            if !(Self::MIN_DIMENSION..=Self::MAX_DIMENSION).contains(&value) {
                return Err(CameraError::Config(format!(
                    "{} must be between {} and {}, got {}",
                    label,
                    Self::MIN_DIMENSION,
                    Self::MAX_DIMENSION,
                    value
                )));
            }
        }

        if !(Self::MIN_FRAME_RATE..=Self::MAX_FRAME_RATE).contains(&self.frame_rate) {
            return Err(CameraError::Config(format!(
                "Frame rate must be between {} and {}, got {}",
                Self::MIN_FRAME_RATE,
                Self::MAX_FRAME_RATE,
                self.frame_rate
            )));
        }

        Ok(())
    }
}

/// A capture request as callers write it, frame rate optional
///
/// Built from `(width, height, frame_rate)` or `(width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoRequest {
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<u32>,
}

impl VideoRequest {
    /// Fills in a missing frame rate with `default_frame_rate`
    pub fn resolve(self, default_frame_rate: u32) -> VideoConfig {
        VideoConfig::new(
            self.width,
            self.height,
            self.frame_rate.unwrap_or(default_frame_rate),
        )
    }
}

impl From<(u32, u32, u32)> for VideoRequest {
    fn from((width, height, frame_rate): (u32, u32, u32)) -> Self {
        Self {
            width,
            height,
            frame_rate: Some(frame_rate),
        }
    }
}

impl From<(u32, u32)> for VideoRequest {
    fn from((width, height): (u32, u32)) -> Self {
        Self {
            width,
            height,
            frame_rate: None,
        }
    }
}

impl From<VideoConfig> for VideoRequest {
    fn from(config: VideoConfig) -> Self {
        (config.width, config.height, config.frame_rate).into()
    }
}

/// The work a video task performs on its thread
///
/// Implementations should return soon after `cancel` is set.
pub trait VideoStream: Send + 'static {
    fn run(&mut self, config: &VideoConfig, cancel: &CancelToken);
}

impl<F> VideoStream for F
where
    F: FnMut(&VideoConfig, &CancelToken) + Send + 'static,
{
    fn run(&mut self, config: &VideoConfig, cancel: &CancelToken) {
        self(config, cancel)
    }
}

/// Stream that captures nothing and returns at once
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleStream;

impl VideoStream for IdleStream {
    fn run(&mut self, _config: &VideoConfig, _cancel: &CancelToken) {}
}

#[derive(Debug, Default)]
struct VideoState {
    started: bool,
    finished: bool,
    interrupted: bool,
}

#[derive(Debug, Default)]
struct VideoSignal {
    state: Mutex<VideoState>,
    changed: Condvar,
}

impl VideoSignal {
    fn lock(&self) -> MutexGuard<'_, VideoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_finished(&self) {
        self.lock().finished = true;
        self.changed.notify_all();
    }
}

/// Marks the task finished when the stream thread exits, even by panic
struct FinishGuard(Arc<VideoSignal>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.mark_finished();
    }
}

/// Wakes a blocked [`VideoTask::join`], making it fail with `InterruptedWait`
///
/// If nobody is joining yet, the next join consumes the interrupt. A join
/// on a task that was never started returns `Ok` and discards it.
#[derive(Debug, Clone)]
pub struct WaitInterrupter {
    signal: Arc<VideoSignal>,
}

impl WaitInterrupter {
    pub fn interrupt(&self) {
        self.signal.lock().interrupted = true;
        self.signal.changed.notify_all();
    }
}

/// Independent video capture stream on a background thread
pub struct VideoTask {
    id: String,
    config: VideoConfig,
    cancel: CancelToken,
    signal: Arc<VideoSignal>,
    handle: Mutex<Option<JoinHandle<()>>>,
    logger: Logger,
}

impl VideoTask {
    /// Creates a task that has not started yet
    ///
    /// # Returns
    /// * `Err(CameraError::Config)` - If `config` is out of range
    pub fn new(id: &str, config: VideoConfig, logger: Logger) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            id: id.to_string(),
            config,
            cancel: CancelToken::new(),
            signal: Arc::new(VideoSignal::default()),
            handle: Mutex::new(None),
            logger,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> VideoConfig {
        self.config
    }

    /// Spawns the stream thread. A task can only be started once.
    pub fn start(&self, stream: Box<dyn VideoStream>) -> Result<()> {
        {
            let mut state = self.signal.lock();
            if state.started {
                return Err(CameraError::InvalidState(format!(
                    "video task {} already started",
                    self.id
                )));
            }
            state.started = true;
        }

        self.logger.info(&format!(
            "Capturing video at {}x{} @ {} fps",
            self.config.width, self.config.height, self.config.frame_rate
        ));

        let config = self.config;
        let cancel = self.cancel.clone();
        let signal = Arc::clone(&self.signal);
        let logger = self.logger.clone();

        let spawned = thread::Builder::new()
            .name(format!("video-{}", self.id))
            .spawn(move || {
                let mut stream = stream;
                let _finish = FinishGuard(signal);
                stream.run(&config, &cancel);
                logger.debug("Video stream returned");
            });

        match spawned {
            Ok(handle) => {
                *self.lock_handle() = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.signal.mark_finished();
                Err(CameraError::TaskSpawn(format!("video task {}: {}", self.id, e)))
            }
        }
    }

    /// True while the stream thread is running. Never blocks on the stream.
    pub fn is_alive(&self) -> bool {
        self.lock_handle()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// True once the stream has returned (or failed to spawn)
    pub fn is_finished(&self) -> bool {
        self.signal.lock().finished
    }

    /// Asks the stream to stop; it is up to the stream to notice
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn interrupter(&self) -> WaitInterrupter {
        WaitInterrupter {
            signal: Arc::clone(&self.signal),
        }
    }

    /// Blocks until the stream thread has finished.
    ///
    /// # Returns
    /// * `Ok(())` - The stream finished, or the task was never started, or
    ///   it was already joined
    /// * `Err(CameraError::InterruptedWait)` - A [`WaitInterrupter`] fired
    ///   before the stream finished
    /// * `Err(CameraError::TaskPanicked)` - The stream panicked
    pub fn join(&self) -> Result<()> {
        {
            let mut state = self.signal.lock();
            if !state.started {
                state.interrupted = false;
                return Ok(());
            }

            let mut state = self
                .signal
                .changed
                .wait_while(state, |state| !state.finished && !state.interrupted)
                .unwrap_or_else(PoisonError::into_inner);

            let interrupted = state.interrupted && !state.finished;
            state.interrupted = false;
            if interrupted {
                return Err(CameraError::InterruptedWait(format!(
                    "join on video task {} was interrupted",
                    self.id
                )));
            }
        }

        let handle = self.lock_handle().take();
        if let Some(handle) = handle
            && let Err(payload) = handle.join()
        {
            let reason = panic_message(payload.as_ref());
            self.logger
                .error(&format!("Video task {} panicked: {}", self.id, reason));
            return Err(CameraError::TaskPanicked(reason));
        }

        self.logger.debug(&format!("Video task {} joined", self.id));
        Ok(())
    }

    fn lock_handle(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for VideoTask {
    fn drop(&mut self) {
        self.cancel.cancel();

        let handle = match self.handle.get_mut() {
            Ok(handle) => handle.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}
