//! Process-wide activation gate
//!
//! One mutex covers the activated flag and the driver call, so concurrent
//! initializers are serialized and only the first successful one switches
//! the device on. A failed attempt leaves the flag clear; the next caller
//! tries again. Nothing here retries on its own.

use crate::device::driver::DeviceDriver;
use crate::error::{CameraError, Result};
use logging::Logger;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::thread;
use std::time::Duration;

static GLOBAL_ACTIVATION: OnceLock<Arc<DeviceActivation>> = OnceLock::new();

#[derive(Debug, Default)]
struct ActivationState {
    activated: bool,
    attempts: u64,
}

/// Gate shared by every session that drives the same device
pub struct DeviceActivation {
    state: Mutex<ActivationState>,
    driver: Arc<dyn DeviceDriver>,
    warmup: Duration,
    logger: Logger,
}

impl DeviceActivation {
    pub fn new(driver: Arc<dyn DeviceDriver>, logger: Logger) -> Self {
        Self {
            state: Mutex::new(ActivationState::default()),
            driver,
            warmup: Duration::ZERO,
            logger,
        }
    }

    /// Time the device needs after a successful power-on before it is
    /// reported active. Spent while holding the gate.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Returns the process-wide gate, building it with `init` on first use.
    ///
    /// Later calls ignore `init`.
    pub fn global(init: impl FnOnce() -> DeviceActivation) -> Arc<DeviceActivation> {
        Arc::clone(GLOBAL_ACTIVATION.get_or_init(|| Arc::new(init())))
    }

    /// Switches the device on unless an earlier call already did.
    ///
    /// # Returns
    /// * `Ok(())` - The device is active (now or from before)
    /// * `Err(CameraError::StartupFailure)` - The driver refused; the gate
    ///   stays inactive
    pub fn activate_once(&self) -> Result<()> {
        let mut state = self.lock_state();
        if state.activated {
            self.logger.debug("Device already active, skipping power on");
            return Ok(());
        }
        self.power_on_locked(&mut state)
    }

    /// Invokes the driver even if the device is already active.
    ///
    /// Used for explicit re-activation by a caller. Success marks the gate
    /// active; failure leaves the flag as it was.
    pub fn power_on(&self) -> Result<()> {
        let mut state = self.lock_state();
        self.power_on_locked(&mut state)
    }

    pub fn is_activated(&self) -> bool {
        self.lock_state().activated
    }

    /// Number of times the driver has been invoked
    pub fn attempts(&self) -> u64 {
        self.lock_state().attempts
    }

    fn power_on_locked(&self, state: &mut ActivationState) -> Result<()> {
        state.attempts += 1;
        self.logger.info(&format!(
            "Powering on device with {} driver (attempt {})",
            self.driver.name(),
            state.attempts
        ));

        match self.driver.power_on() {
            Ok(()) => {
                if !self.warmup.is_zero() {
                    thread::sleep(self.warmup);
                }
                state.activated = true;
                self.logger.info("Camera is ON.");
                Ok(())
            }
            Err(reason) => {
                self.logger
                    .warn(&format!("Device power on failed: {}", reason));
                Err(CameraError::StartupFailure(reason))
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ActivationState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.logger
                    .error("Activation state mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::driver::{FaultInjectingDriver, SimulatedDriver};
    use logging::LogLevel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailsFirst {
        calls: AtomicUsize,
    }

    impl DeviceDriver for FailsFirst {
        fn power_on(&self) -> std::result::Result<(), String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("cold start".to_string())
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &str {
            "fails-first"
        }
    }

    fn quiet_logger() -> Logger {
        Logger::in_memory(LogLevel::Error).0
    }

    #[test]
    fn test_activate_once_is_idempotent() {
        let gate = DeviceActivation::new(Arc::new(SimulatedDriver), quiet_logger());

        assert!(gate.activate_once().is_ok());
        assert!(gate.activate_once().is_ok());
        assert!(gate.is_activated());
        assert_eq!(gate.attempts(), 1);
    }

    #[test]
    fn test_failure_leaves_gate_inactive() {
        let gate = DeviceActivation::new(Arc::new(FaultInjectingDriver), quiet_logger());

        let err = gate.activate_once().unwrap_err();
        assert!(err.is_startup_failure());
        assert!(!gate.is_activated());

        // Next call is a real attempt again
        assert!(gate.activate_once().is_err());
        assert_eq!(gate.attempts(), 2);
    }

    #[test]
    fn test_retry_after_failure_activates() {
        let driver = Arc::new(FailsFirst {
            calls: AtomicUsize::new(0),
        });
        let gate = DeviceActivation::new(driver, quiet_logger());

        assert!(gate.activate_once().is_err());
        assert!(gate.activate_once().is_ok());
        assert!(gate.activate_once().is_ok());
        assert!(gate.is_activated());
        assert_eq!(gate.attempts(), 2);
    }

    #[test]
    fn test_power_on_bypasses_activated_flag() {
        let gate = DeviceActivation::new(Arc::new(SimulatedDriver), quiet_logger());

        gate.activate_once().unwrap();
        gate.power_on().unwrap();
        assert_eq!(gate.attempts(), 2);
    }

    #[test]
    fn test_failure_is_logged() {
        let (logger, capture) = Logger::in_memory(LogLevel::Info);
        let gate = DeviceActivation::new(Arc::new(FaultInjectingDriver), logger);

        let _ = gate.activate_once();
        assert!(capture.contains("Device power on failed: Some error occurred."));
    }

    #[test]
    fn test_global_is_built_once() {
        let first = DeviceActivation::global(|| {
            DeviceActivation::new(Arc::new(SimulatedDriver), quiet_logger())
        });
        let second = DeviceActivation::global(|| panic!("global gate rebuilt"));

        assert!(Arc::ptr_eq(&first, &second));
    }
}
