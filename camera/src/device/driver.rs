//! Device drivers
//!
//! No real camera I/O happens in this crate. The fault-injecting driver
//! reproduces the reference device, which refuses to start every time.

use std::sync::Arc;

/// Message reported by [`FaultInjectingDriver`]
pub const FAULT_MESSAGE: &str = "Some error occurred.";

/// Switches the physical device on
pub trait DeviceDriver: Send + Sync {
    /// Performs the power-on side effect, returning a reason on failure
    fn power_on(&self) -> Result<(), String>;

    fn name(&self) -> &str;
}

/// Driver whose power-on always fails
#[derive(Debug, Default, Clone, Copy)]
pub struct FaultInjectingDriver;

impl DeviceDriver for FaultInjectingDriver {
    fn power_on(&self) -> Result<(), String> {
        Err(FAULT_MESSAGE.to_string())
    }

    fn name(&self) -> &str {
        "fault-injecting"
    }
}

/// Driver whose power-on always succeeds
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedDriver;

impl DeviceDriver for SimulatedDriver {
    fn power_on(&self) -> Result<(), String> {
        Ok(())
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Picks the driver matching the `device.fault_injection` setting
pub fn driver_for(fault_injection: bool) -> Arc<dyn DeviceDriver> {
    if fault_injection {
        Arc::new(FaultInjectingDriver)
    } else {
        Arc::new(SimulatedDriver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_injecting_driver_always_fails() {
        let driver = FaultInjectingDriver;
        assert_eq!(driver.power_on(), Err(FAULT_MESSAGE.to_string()));
        assert_eq!(driver.power_on(), Err(FAULT_MESSAGE.to_string()));
    }

    #[test]
    fn test_driver_for_setting() {
        assert_eq!(driver_for(true).name(), "fault-injecting");
        assert_eq!(driver_for(false).name(), "simulated");
        assert!(driver_for(false).power_on().is_ok());
    }
}
