//! Detection task
//!
//! Runs the combined detector on a background thread until it reports a
//! detection, then publishes the result once and wakes every waiter.
//!
//! # State machine
//!
//! ```text
//! Idle --start()--> Running --detected--> Completed
//!   |                  |
//!   +----cancel()------+-----------------> Cancelled
//! ```
//!
//! `Completed` and `Cancelled` are terminal. The phase and the result live
//! under one mutex, and the same condvar is used for publishing, for
//! cancellation and for the loop's poll delay, so a waiter can never miss
//! the transition it is waiting for.

use crate::detection::{HandCoordinates, HandDetector};
use crate::error::{CameraError, Result};
use crate::task::panic_message;
use chrono::{DateTime, Local};
use logging::Logger;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Lifecycle phase of a [`DetectionTask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl DetectionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DetectionPhase::Completed | DetectionPhase::Cancelled)
    }
}

impl fmt::Display for DetectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectionPhase::Idle => "idle",
            DetectionPhase::Running => "running",
            DetectionPhase::Completed => "completed",
            DetectionPhase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// What the detection loop published
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    pub completed: bool,
    pub timestamp: Option<DateTime<Local>>,
    /// Hand position sampled when the detection was published
    pub hand: Option<HandCoordinates>,
}

impl DetectionResult {
    fn completed_now(hand: HandCoordinates) -> Self {
        Self {
            completed: true,
            timestamp: Some(Local::now()),
            hand: Some(hand),
        }
    }
}

/// What a waiter gets back from [`DetectionTask::wait_for_completion`]
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    Completed(DetectionResult),
    /// The task was cancelled before anything was detected
    Cancelled,
}

impl DetectionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, DetectionOutcome::Completed(_))
    }
}

#[derive(Debug)]
struct DetectionState {
    phase: DetectionPhase,
    result: DetectionResult,
}

struct DetectionShared {
    state: Mutex<DetectionState>,
    changed: Condvar,
}

impl DetectionShared {
    fn lock(&self) -> MutexGuard<'_, DetectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background detection loop with a one-shot completion signal
pub struct DetectionTask {
    id: String,
    detector: Arc<dyn HandDetector>,
    poll_interval: Duration,
    shared: Arc<DetectionShared>,
    handle: Mutex<Option<JoinHandle<()>>>,
    logger: Logger,
}

impl DetectionTask {
    /// Creates an idle task; nothing runs until [`start`](Self::start).
    ///
    /// # Arguments
    /// * `id` - Task identifier, also used in the thread name
    /// * `detector` - Combined detector evaluated on every pass
    /// * `poll_interval` - Pause between negative passes
    pub fn new(
        id: &str,
        detector: Arc<dyn HandDetector>,
        poll_interval: Duration,
        logger: Logger,
    ) -> Self {
        Self {
            id: id.to_string(),
            detector,
            poll_interval,
            shared: Arc::new(DetectionShared {
                state: Mutex::new(DetectionState {
                    phase: DetectionPhase::Idle,
                    result: DetectionResult::default(),
                }),
                changed: Condvar::new(),
            }),
            handle: Mutex::new(None),
            logger,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> DetectionPhase {
        self.shared.lock().phase
    }

    /// Latest published result (`completed == false` until detection)
    pub fn result(&self) -> DetectionResult {
        self.shared.lock().result.clone()
    }

    /// Spawns the detection thread.
    ///
    /// # Returns
    /// * `Ok(())` - The loop is running
    /// * `Err(CameraError::InvalidState)` - The task already left `Idle`
    /// * `Err(CameraError::TaskSpawn)` - The thread could not be created;
    ///   the task is left `Cancelled` so waiters are released
    pub fn start(&self) -> Result<()> {
        {
            let mut state = self.shared.lock();
            if state.phase != DetectionPhase::Idle {
                return Err(CameraError::InvalidState(format!(
                    "detection task {} cannot start: already {}",
                    self.id, state.phase
                )));
            }
            state.phase = DetectionPhase::Running;
        }

        let shared = Arc::clone(&self.shared);
        let detector = Arc::clone(&self.detector);
        let poll_interval = self.poll_interval;
        let logger = self.logger.clone();

        let spawned = thread::Builder::new()
            .name(format!("detection-{}", self.id))
            .spawn(move || run_detection_loop(shared, detector, poll_interval, logger));

        match spawned {
            Ok(handle) => {
                *self.lock_handle() = Some(handle);
                self.logger
                    .debug(&format!("Detection task {} started", self.id));
                Ok(())
            }
            Err(e) => {
                self.finish_as_cancelled();
                Err(CameraError::TaskSpawn(format!(
                    "detection task {}: {}",
                    self.id, e
                )))
            }
        }
    }

    /// Blocks until the task reaches a terminal phase.
    ///
    /// Returns immediately if it already has. Any number of threads may
    /// wait at once; all of them are released by the same transition.
    pub fn wait_for_completion(&self) -> DetectionOutcome {
        let state = self.shared.lock();
        let state = self
            .shared
            .changed
            .wait_while(state, |state| !state.phase.is_terminal())
            .unwrap_or_else(PoisonError::into_inner);

        match state.phase {
            DetectionPhase::Completed => DetectionOutcome::Completed(state.result.clone()),
            _ => DetectionOutcome::Cancelled,
        }
    }

    /// Requests the loop to stop and releases waiters with `Cancelled`.
    ///
    /// Returns `false` (and changes nothing) if the task already completed
    /// or was cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self.finish_as_cancelled();
        if cancelled {
            self.logger
                .info(&format!("Detection task {} cancelled", self.id));
        }
        cancelled
    }

    fn finish_as_cancelled(&self) -> bool {
        let mut state = self.shared.lock();
        if state.phase.is_terminal() {
            return false;
        }
        state.phase = DetectionPhase::Cancelled;
        self.shared.changed.notify_all();
        true
    }

    fn lock_handle(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DetectionTask {
    fn drop(&mut self) {
        self.finish_as_cancelled();

        let handle = match self.handle.get_mut() {
            Ok(handle) => handle.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle
            && let Err(payload) = handle.join()
        {
            self.logger.error(&format!(
                "Detection task {} panicked: {}",
                self.id,
                panic_message(payload.as_ref())
            ));
        }
    }
}

/// Cancels a task whose thread exits while still `Running`, e.g. when the
/// detector panics
struct RunningGuard(Arc<DetectionShared>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        if state.phase == DetectionPhase::Running {
            state.phase = DetectionPhase::Cancelled;
            self.0.changed.notify_all();
        }
    }
}

/// Body of the detection thread
fn run_detection_loop(
    shared: Arc<DetectionShared>,
    detector: Arc<dyn HandDetector>,
    poll_interval: Duration,
    logger: Logger,
) {
    let _guard = RunningGuard(Arc::clone(&shared));
    logger.info("Capturing image or video frame...");

    loop {
        if shared.lock().phase != DetectionPhase::Running {
            break;
        }

        let detected = detector.detect();

        let state = shared.lock();
        if state.phase != DetectionPhase::Running {
            break;
        }

        if detected {
            publish(state, &shared, detector.coordinates());
            logger.info("Detection published");
            return;
        }

        // Poll delay; cancel() wakes us early through the same condvar
        let (state, _) = shared
            .changed
            .wait_timeout_while(state, poll_interval, |state| {
                state.phase == DetectionPhase::Running
            })
            .unwrap_or_else(PoisonError::into_inner);
        if state.phase != DetectionPhase::Running {
            break;
        }
    }

    logger.info("Detection loop stopped before a detection");
}

fn publish(
    mut state: MutexGuard<'_, DetectionState>,
    shared: &DetectionShared,
    hand: HandCoordinates,
) {
    state.phase = DetectionPhase::Completed;
    state.result = DetectionResult::completed_now(hand);
    shared.changed.notify_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Detector;
    use logging::LogLevel;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;

    /// Detects only once `open` is set; counts every pass
    struct Gated {
        open: AtomicBool,
        passes: AtomicUsize,
    }

    impl Gated {
        fn new(open: bool) -> Arc<Self> {
            Arc::new(Self {
                open: AtomicBool::new(open),
                passes: AtomicUsize::new(0),
            })
        }
    }

    impl Detector for Gated {
        fn detect(&self) -> bool {
            self.passes.fetch_add(1, Ordering::SeqCst);
            self.open.load(Ordering::SeqCst)
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    impl HandDetector for Gated {
        fn coordinates_x(&self) -> f32 {
            3.0
        }

        fn coordinates_y(&self) -> f32 {
            4.0
        }
    }

    fn task_with(detector: Arc<Gated>) -> DetectionTask {
        let logger = Logger::in_memory(LogLevel::Error).0;
        DetectionTask::new("t1", detector, Duration::from_millis(5), logger)
    }

    #[test]
    fn test_new_task_is_idle() {
        let task = task_with(Gated::new(true));
        assert_eq!(task.phase(), DetectionPhase::Idle);
        assert!(!task.result().completed);
    }

    #[test]
    fn test_completion_publishes_result() {
        let task = task_with(Gated::new(true));
        task.start().unwrap();

        let result = match task.wait_for_completion() {
            DetectionOutcome::Completed(result) => result,
            other => panic!("expected completion, got {:?}", other),
        };
        assert!(result.completed);
        assert!(result.timestamp.is_some());
        assert_eq!(result.hand, Some(HandCoordinates::new(3.0, 4.0)));
        assert_eq!(task.phase(), DetectionPhase::Completed);
    }

    #[test]
    fn test_double_start_is_invalid_state() {
        let detector = Gated::new(false);
        let task = task_with(Arc::clone(&detector));

        task.start().unwrap();
        let err = task.start().unwrap_err();
        assert!(matches!(err, CameraError::InvalidState(_)));

        task.cancel();
        drop(task);
        let passes = detector.passes.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(detector.passes.load(Ordering::SeqCst), passes);
    }

    #[test]
    fn test_waiters_block_until_published() {
        let detector = Gated::new(false);
        let task = Arc::new(task_with(Arc::clone(&detector)));
        task.start().unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter = {
            let task = Arc::clone(&task);
            thread::spawn(move || tx.send(task.wait_for_completion()).unwrap())
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        detector.open.store(true, Ordering::SeqCst);
        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(outcome.is_completed());
        waiter.join().unwrap();
    }

    #[test]
    fn test_cancel_releases_waiters() {
        let task = Arc::new(task_with(Gated::new(false)));
        task.start().unwrap();

        let waiter = {
            let task = Arc::clone(&task);
            thread::spawn(move || task.wait_for_completion())
        };

        thread::sleep(Duration::from_millis(20));
        assert!(task.cancel());
        assert_eq!(waiter.join().unwrap(), DetectionOutcome::Cancelled);
        assert_eq!(task.phase(), DetectionPhase::Cancelled);
    }

    #[test]
    fn test_cancel_after_completion_is_noop() {
        let task = task_with(Gated::new(true));
        task.start().unwrap();
        task.wait_for_completion();

        assert!(!task.cancel());
        assert_eq!(task.phase(), DetectionPhase::Completed);
        assert!(task.wait_for_completion().is_completed());
    }

    #[test]
    fn test_cancel_before_start_prevents_start() {
        let task = task_with(Gated::new(true));

        assert!(task.cancel());
        assert!(matches!(task.start(), Err(CameraError::InvalidState(_))));
        assert_eq!(task.wait_for_completion(), DetectionOutcome::Cancelled);
    }

    struct Exploding;

    impl Detector for Exploding {
        fn detect(&self) -> bool {
            panic!("sensor unplugged");
        }

        fn name(&self) -> &str {
            "exploding"
        }
    }

    impl HandDetector for Exploding {
        fn coordinates_x(&self) -> f32 {
            0.0
        }

        fn coordinates_y(&self) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_panicking_detector_releases_waiters() {
        let (logger, capture) = Logger::in_memory(LogLevel::Error);
        let task = Arc::new(DetectionTask::new(
            "boom",
            Arc::new(Exploding),
            Duration::from_millis(5),
            logger,
        ));

        let (tx, rx) = mpsc::channel();
        let waiter = {
            let task = Arc::clone(&task);
            thread::spawn(move || tx.send(task.wait_for_completion()).unwrap())
        };
        task.start().unwrap();

        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome, DetectionOutcome::Cancelled);
        assert_eq!(task.phase(), DetectionPhase::Cancelled);
        assert!(!task.cancel());
        waiter.join().unwrap();

        drop(Arc::into_inner(task));
        assert!(capture.contains("Detection task boom panicked: sensor unplugged"));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(DetectionPhase::Running.to_string(), "running");
        assert!(DetectionPhase::Cancelled.is_terminal());
        assert!(!DetectionPhase::Idle.is_terminal());
    }
}
