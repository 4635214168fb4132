//! Physical device start-up
//!
//! [`DeviceActivation`] guards the "power on" side effect so that, however
//! many sessions are built, the device is successfully switched on at most
//! once. The side effect itself is a [`DeviceDriver`].

pub mod activation;
pub mod driver;

pub use activation::DeviceActivation;
pub use driver::{DeviceDriver, FaultInjectingDriver, SimulatedDriver, driver_for};
