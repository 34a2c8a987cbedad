//! # stepper-axis
//!
//! Step/dir stepper motor control for single-board computers, with a
//! background stepping thread per motor and limit-switch homing for
//! lead-screw axes.
//!
//! ## Features
//!
//! - **Background stepping**: post a target with `set_target_position` and
//!   keep working while a dedicated thread emits the pulses
//! - **Blocking moves**: `rotate` steps on the calling thread
//! - **embedded-hal 1.0**: `OutputPin` for STEP/DIR/nSLEEP/MS1/MS2,
//!   `InputPin` for the switch, `DelayNs` for pulse timing
//! - **Linear axes**: millimetre units through the screw pitch and a
//!   five-phase homing sequence driven by a falling-edge interrupt
//! - **Configuration-driven**: define motors in TOML files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_axis::{hal, PreciseDelay, StepperMotor, UnitExt};
//!
//! let config = stepper_axis::load_config("axes.toml")?;
//! let gpio = hal::rppal::open_gpio()?;
//! let turntable = config.motor("turntable").unwrap();
//!
//! let motor = StepperMotor::builder()
//!     .from_motor_config(turntable)
//!     .pins(hal::rppal::open_driver(&gpio, &turntable.pins)?)
//!     .delay(PreciseDelay::new())
//!     .build()?;
//!
//! motor.set_target_position(90.0_f32.degrees());
//! while motor.is_busy() { /* do other work */ }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Motors, threads, file I/O and TOML parsing
//! - `rppal`: Raspberry Pi GPIO backend
//! - `defmt`: Enables defmt formatting for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - heapless strings keep errors allocation-free
#![allow(clippy::result_large_err)]

// Core modules
pub mod config;
pub mod error;
pub mod hal;
pub mod motor;

// Re-exports for ergonomic API
pub use config::{validate_config, HomingProfile, MotorConfig, PinoutConfig, SystemConfig};
pub use error::{Error, Result};
pub use hal::{Edge, EdgeInterrupt};
pub use motor::{Direction, DriverPins};

#[cfg(feature = "std")]
pub use hal::PreciseDelay;
#[cfg(feature = "std")]
pub use motor::{HomingPhase, LinearAxis, LinearAxisBuilder, StepperMotor, StepperMotorBuilder};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{
    Degrees, DegreesPerSec, LeadScrew, Millimeters, MillimetersPerSec, Resolution, Steps,
    UnitConverter, UnitExt,
};
