//! Error types for stepper-axis library.
//!
//! Provides unified error handling across configuration and motor control.
//! Configuration mistakes that can be corrected at runtime (an unsupported
//! resolution, a speed too slow to produce a step) are logged and fixed in
//! place; only hardware failures and invalid configuration files surface here.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-axis operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor operation error
    Motor(MotorError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Required builder field was not supplied
    MissingField(&'static str),
    /// Motor name not found in configuration
    MotorNotFound(heapless::String<32>),
    /// Steps per revolution must be > 0
    InvalidStepsPerRevolution(u16),
    /// Speed must be finite and non-zero
    InvalidSpeed(f32),
    /// Screw pitch must be finite and > 0
    InvalidScrewPitch(f32),
    /// A linear axis was configured without a homing switch pin
    MissingHomingSwitch(heapless::String<32>),
    /// The same GPIO line is assigned to two roles of one motor
    DuplicatePin(u8),
    /// Homing parameter must be finite and > 0
    InvalidHoming(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Pin roles of a step/dir driver, used to report which line failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRole {
    /// STEP pulse input of the driver
    Step,
    /// DIR input of the driver
    Dir,
    /// Active-low sleep input (nSLEEP)
    Sleep,
    /// First microstep select line
    Ms1,
    /// Second microstep select line
    Ms2,
    /// Limit switch used for homing
    HomingSwitch,
}

/// Motor operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Pin operation failed
    PinError {
        /// Role of the pin that failed
        pin: PinRole,
    },
    /// GPIO backend could not be opened or a pin could not be claimed
    Gpio(heapless::String<128>),
    /// Registering the homing switch interrupt failed
    InterruptSetup(heapless::String<64>),
    /// Background stepping thread could not be started
    SpawnFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MissingField(field) => write!(f, "{} is required", field),
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            ConfigError::InvalidStepsPerRevolution(v) => {
                write!(f, "Invalid steps per revolution: {}. Must be > 0", v)
            }
            ConfigError::InvalidSpeed(v) => write!(f, "Invalid speed: {}. Must be non-zero", v),
            ConfigError::InvalidScrewPitch(v) => write!(f, "Invalid screw pitch: {}. Must be > 0", v),
            ConfigError::MissingHomingSwitch(name) => {
                write!(f, "Linear axis '{}' has no homing_switch pin", name)
            }
            ConfigError::DuplicatePin(pin) => write!(f, "GPIO {} is assigned to more than one role", pin),
            ConfigError::InvalidHoming(field) => write!(f, "Invalid homing {}: must be > 0", field),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PinRole::Step => "STEP",
            PinRole::Dir => "DIR",
            PinRole::Sleep => "nSLEEP",
            PinRole::Ms1 => "MS1",
            PinRole::Ms2 => "MS2",
            PinRole::HomingSwitch => "HOMING_SWITCH",
        };
        f.write_str(name)
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError { pin } => write!(f, "GPIO operation on {} pin failed", pin),
            MotorError::Gpio(msg) => write!(f, "GPIO backend error: {}", msg),
            MotorError::InterruptSetup(msg) => {
                write!(f, "Failed to register homing switch interrupt: {}", msg)
            }
            MotorError::SpawnFailed => write!(f, "Failed to start background stepping thread"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

/// Copy a displayable value into a bounded string, truncating on overflow.
#[cfg_attr(not(feature = "std"), allow(dead_code))]
pub(crate) fn bounded<const N: usize>(value: &dyn fmt::Display) -> heapless::String<N> {
    use core::fmt::Write;

    struct Truncating<'a, const N: usize>(&'a mut heapless::String<N>);

    impl<const N: usize> Write for Truncating<'_, N> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            for c in s.chars() {
                if self.0.push(c).is_err() {
                    break;
                }
            }
            Ok(())
        }
    }

    let mut out = heapless::String::new();
    let _ = write!(Truncating(&mut out), "{}", value);
    out
}
