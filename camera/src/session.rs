//! Camera session
//!
//! A [`CameraSession`] is one handle on the shared camera. It owns the
//! current detection task and at most one video task, and holds a shared
//! reference to the [`DeviceActivation`] gate.
//!
//! All operations take `&self`, so a session can be wrapped in an `Arc` and
//! used from many threads. Blocking calls (`wait_for_detection`,
//! `join_video`) never hold a session lock while they wait.

use crate::config::CameraSettings;
use crate::detection::{CombinedDetector, HandCoordinates, HandDetector};
use crate::device::{DeviceActivation, driver_for};
use crate::error::{CameraError, Result};
use crate::task::{
    DetectionOutcome, DetectionPhase, DetectionTask, IdleStream, VideoRequest, VideoStream,
    VideoTask, WaitInterrupter,
};
use logging::Logger;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Builds the stream each `start_video` call runs
pub type StreamFactory = Arc<dyn Fn() -> Box<dyn VideoStream> + Send + Sync>;

/// Handle on the shared camera device
pub struct CameraSession {
    id: String,
    activation: Arc<DeviceActivation>,
    detector: Arc<dyn HandDetector>,
    poll_interval: Duration,
    default_frame_rate: u32,
    detection: Mutex<Arc<DetectionTask>>,
    detection_generation: AtomicU64,
    video: Mutex<Option<Arc<VideoTask>>>,
    video_count: AtomicU64,
    stream_factory: StreamFactory,
    logger: Logger,
}

impl CameraSession {
    /// Creates a session, starts its detection loop and activates the device.
    ///
    /// An activation failure is logged and otherwise ignored: construction
    /// always succeeds. Use [`turn_on`](Self::turn_on) to see the error.
    pub fn new(
        activation: Arc<DeviceActivation>,
        detector: Arc<dyn HandDetector>,
        settings: &CameraSettings,
        logger: Logger,
    ) -> Self {
        let id = format!("cam_{:08x}", rand::random::<u32>());
        let logger = logger.for_component(&format!("Camera {}", id));

        let session = Self {
            detection: Mutex::new(Self::spawn_detection(
                &id,
                0,
                &detector,
                settings.poll_interval(),
                &logger,
            )),
            id,
            activation,
            detector,
            poll_interval: settings.poll_interval(),
            default_frame_rate: settings.video.default_frame_rate,
            detection_generation: AtomicU64::new(1),
            video: Mutex::new(None),
            video_count: AtomicU64::new(0),
            stream_factory: Arc::new(|| -> Box<dyn VideoStream> { Box::new(IdleStream) }),
            logger,
        };

        session.activate_quietly();
        session
    }

    /// Creates a session wired from `settings`: the process-wide activation
    /// gate and the stub detectors.
    pub fn from_settings(settings: &CameraSettings, logger: Logger) -> Self {
        let activation = DeviceActivation::global(|| {
            DeviceActivation::new(
                driver_for(settings.device.fault_injection),
                logger.for_component("Device"),
            )
            .with_warmup(settings.warmup())
        });
        let detector = Arc::new(CombinedDetector::stubbed(
            &settings.detection.hand_model,
            &settings.detection.hand_gesture,
            logger.for_component("Detection"),
        ));

        Self::new(activation, detector, settings, logger)
    }

    /// Session built from [`CameraSettings::default`]
    pub fn with_defaults(logger: Logger) -> Self {
        Self::from_settings(&CameraSettings::default(), logger)
    }

    /// Replaces the stream run by later `start_video` calls
    pub fn with_video_stream(mut self, factory: StreamFactory) -> Self {
        self.stream_factory = factory;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn activation(&self) -> &Arc<DeviceActivation> {
        &self.activation
    }

    /// Restarts detection and re-invokes the device driver.
    ///
    /// A fresh detection task always replaces the current one (which is
    /// cancelled if it had not completed). The driver result is returned
    /// as is; with fault injection enabled it is always
    /// `CameraError::StartupFailure`.
    pub fn turn_on(&self) -> Result<()> {
        let generation = self.detection_generation.fetch_add(1, Ordering::SeqCst);
        let fresh = Self::spawn_detection(
            &self.id,
            generation,
            &self.detector,
            self.poll_interval,
            &self.logger,
        );
        let previous = mem::replace(&mut *self.lock_detection(), fresh);
        previous.cancel();

        let result = self.activation.power_on();
        if let Err(ref e) = result {
            self.logger.warn(&format!("turn_on failed: {}", e));
        }
        result
    }

    /// Cancels the current detection task. Calling it again does nothing.
    pub fn turn_off(&self) {
        if self.current_detection().cancel() {
            self.logger.info("Camera is OFF.");
        } else {
            self.logger.debug("turn_off: detection already finished");
        }
    }

    /// Blocks until the current detection task completes or is cancelled
    pub fn wait_for_detection(&self) -> DetectionOutcome {
        self.current_detection().wait_for_completion()
    }

    pub fn detection_phase(&self) -> DetectionPhase {
        self.current_detection().phase()
    }

    pub fn hand_coordinates(&self) -> HandCoordinates {
        self.detector.coordinates()
    }

    /// Starts a video stream.
    ///
    /// Accepts `(width, height, frame_rate)` or `(width, height)`; the
    /// latter uses the configured default frame rate. A previous stream
    /// that has finished is joined and replaced.
    ///
    /// # Returns
    /// * `Err(CameraError::InvalidState)` - The previous stream still runs
    /// * `Err(CameraError::Config)` - Resolution or frame rate out of range
    pub fn start_video(&self, request: impl Into<VideoRequest>) -> Result<()> {
        let config = request.into().resolve(self.default_frame_rate);
        let mut video = self.lock_video();

        if let Some(previous) = video.as_ref() {
            if !previous.is_finished() {
                return Err(CameraError::InvalidState(format!(
                    "video task {} is still running",
                    previous.id()
                )));
            }
            if let Err(e) = previous.join() {
                self.logger
                    .warn(&format!("Previous video task {}: {}", previous.id(), e));
            }
        }

        let number = self.video_count.fetch_add(1, Ordering::SeqCst);
        let task = VideoTask::new(
            &format!("{}-v{}", self.id, number),
            config,
            self.logger.for_component(&format!("Video {}", self.id)),
        )?;
        task.start((self.stream_factory)())?;

        *video = Some(Arc::new(task));
        Ok(())
    }

    /// False when no video was started or the stream has finished
    pub fn is_video_alive(&self) -> bool {
        self.lock_video()
            .as_ref()
            .is_some_and(|task| task.is_alive())
    }

    /// Blocks until the video stream finishes. `Ok` if none was started.
    ///
    /// # Returns
    /// * `Err(CameraError::InterruptedWait)` - Interrupted through
    ///   [`video_interrupter`](Self::video_interrupter)
    /// * `Err(CameraError::TaskPanicked)` - The stream panicked
    pub fn join_video(&self) -> Result<()> {
        let Some(task) = self.current_video() else {
            self.logger.debug("join_video: no video task");
            return Ok(());
        };
        task.join()
    }

    /// Requests the video stream to stop
    pub fn cancel_video(&self) {
        if let Some(task) = self.current_video() {
            task.cancel();
        }
    }

    /// Handle that interrupts a pending `join_video`
    pub fn video_interrupter(&self) -> Option<WaitInterrupter> {
        self.current_video().map(|task| task.interrupter())
    }

    /// Logs and discards a start-up failure
    fn activate_quietly(&self) {
        if let Err(e) = self.activation.activate_once() {
            self.logger
                .error(&format!("Device activation failed, continuing: {}", e));
        }
    }

    fn spawn_detection(
        session_id: &str,
        generation: u64,
        detector: &Arc<dyn HandDetector>,
        poll_interval: Duration,
        logger: &Logger,
    ) -> Arc<DetectionTask> {
        let task = DetectionTask::new(
            &format!("{}-d{}", session_id, generation),
            Arc::clone(detector),
            poll_interval,
            logger.clone(),
        );
        // On failure the task is already cancelled, so waiters do not hang
        if let Err(e) = task.start() {
            logger.error(&format!("Detection task failed to start: {}", e));
        }
        Arc::new(task)
    }

    fn current_detection(&self) -> Arc<DetectionTask> {
        Arc::clone(&self.lock_detection())
    }

    fn current_video(&self) -> Option<Arc<VideoTask>> {
        self.lock_video().clone()
    }

    fn lock_detection(&self) -> MutexGuard<'_, Arc<DetectionTask>> {
        self.detection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_video(&self) -> MutexGuard<'_, Option<Arc<VideoTask>>> {
        self.video.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{FaultInjectingDriver, SimulatedDriver};
    use crate::task::{CancelToken, VideoConfig};
    use logging::{LogCapture, LogLevel};

    fn session_with(driver_fails: bool) -> (CameraSession, LogCapture) {
        let (logger, capture) = Logger::in_memory(LogLevel::Info);
        let activation = if driver_fails {
            DeviceActivation::new(Arc::new(FaultInjectingDriver), logger.clone())
        } else {
            DeviceActivation::new(Arc::new(SimulatedDriver), logger.clone())
        };
        let detector = Arc::new(CombinedDetector::stubbed(
            "ModelXYZ",
            "Gesture",
            logger.clone(),
        ));
        let session = CameraSession::new(
            Arc::new(activation),
            detector,
            &CameraSettings::default(),
            logger,
        );
        (session, capture)
    }

    fn blocking_stream() -> StreamFactory {
        Arc::new(|| -> Box<dyn VideoStream> {
            Box::new(|_: &VideoConfig, cancel: &CancelToken| {
                while !cancel.is_cancelled() {
                    std::thread::sleep(Duration::from_millis(2));
                }
            })
        })
    }

    #[test]
    fn test_construction_swallows_activation_failure() {
        let (session, capture) = session_with(true);

        assert!(session.id().starts_with("cam_"));
        assert!(!session.activation().is_activated());
        assert!(capture.contains("Device activation failed, continuing"));
        assert!(session.wait_for_detection().is_completed());
    }

    #[test]
    fn test_construction_activates_device() {
        let (session, _capture) = session_with(false);
        assert!(session.activation().is_activated());
    }

    #[test]
    fn test_turn_on_restarts_detection_and_reports_failure() {
        let (session, _capture) = session_with(true);
        session.wait_for_detection();

        let err = session.turn_on().unwrap_err();
        assert!(err.is_startup_failure());
        assert!(session.wait_for_detection().is_completed());
        assert_eq!(session.detection_phase(), DetectionPhase::Completed);
    }

    #[test]
    fn test_turn_off_is_idempotent() {
        let (session, _capture) = session_with(false);
        let before = session.wait_for_detection();

        session.turn_off();
        session.turn_off();
        assert_eq!(session.wait_for_detection(), before);
    }

    #[test]
    fn test_second_video_rejected_while_running() {
        let (session, _capture) = session_with(false);
        let session = session.with_video_stream(blocking_stream());

        session.start_video((640, 480)).unwrap();
        assert!(matches!(
            session.start_video((640, 480, 15)),
            Err(CameraError::InvalidState(_))
        ));

        session.cancel_video();
        session.join_video().unwrap();
        session.start_video((640, 480, 15)).unwrap();
        session.cancel_video();
        session.join_video().unwrap();
        assert!(!session.is_video_alive());
    }

    #[test]
    fn test_join_without_video_is_ok() {
        let (session, _capture) = session_with(false);
        assert!(!session.is_video_alive());
        assert!(session.join_video().is_ok());
        assert!(session.video_interrupter().is_none());
    }

    #[test]
    fn test_invalid_video_request() {
        let (session, _capture) = session_with(false);
        assert!(matches!(
            session.start_video((0, 1080, 30)),
            Err(CameraError::Config(_))
        ));
        assert!(!session.is_video_alive());
    }

    #[test]
    fn test_hand_coordinates() {
        let (session, _capture) = session_with(false);
        assert_eq!(session.hand_coordinates(), HandCoordinates::new(1.245, 1.4567));
    }
}
