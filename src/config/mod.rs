//! Configuration module for stepper-axis.
//!
//! Provides unit types and converters, plus the types for loading and
//! validating motor configurations from TOML files (with `std` feature) or
//! pre-parsed data.

mod homing;
mod motor;
mod pinout;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use homing::HomingProfile;
pub use motor::{MotorConfig, DEFAULT_LINEAR_SPEED, DEFAULT_ROTARY_SPEED};
pub use pinout::PinoutConfig;
pub use system::SystemConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{
    Degrees, DegreesPerSec, LeadScrew, Millimeters, MillimetersPerSec, Resolution, Steps,
    UnitConverter,
};
