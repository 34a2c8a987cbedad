//! Motor module for stepper-axis.
//!
//! Provides the background-driven stepper motor and the lead-screw axis
//! built on top of it.

mod direction;
mod pins;

#[cfg(feature = "std")]
mod builder;
#[cfg(feature = "std")]
mod driver;
#[cfg(feature = "std")]
mod linear;
#[cfg(feature = "std")]
mod shared;

pub use direction::Direction;
pub use pins::DriverPins;

#[cfg(feature = "std")]
pub use builder::StepperMotorBuilder;
#[cfg(feature = "std")]
pub use driver::StepperMotor;
#[cfg(feature = "std")]
pub use linear::{HomingPhase, LinearAxis, LinearAxisBuilder};
