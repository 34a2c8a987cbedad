//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Steps per revolution is non-zero
/// - Speed, when given, is finite and non-zero
/// - Screw pitch, when given, is finite and positive
/// - Linear axes have a homing switch and valid homing parameters
/// - No GPIO line is used twice within a motor
///
/// The resolution is not checked here: unsupported values are replaced by
/// eighth stepping when the motor is built.
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (name, motor) in config.motors.iter() {
        validate_motor(name.as_str(), motor)?;
    }

    Ok(())
}

fn validate_motor(name: &str, config: &super::MotorConfig) -> Result<()> {
    if config.steps_per_revolution == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(
            config.steps_per_revolution,
        )));
    }

    if let Some(speed) = config.speed {
        if !speed.is_finite() || speed == 0.0 {
            return Err(Error::Config(ConfigError::InvalidSpeed(speed)));
        }
    }

    if let Some(line) = config.pins.duplicate() {
        return Err(Error::Config(ConfigError::DuplicatePin(line)));
    }

    if let Some(pitch) = config.screw_pitch {
        if !pitch.is_finite() || pitch <= 0.0 {
            return Err(Error::Config(ConfigError::InvalidScrewPitch(pitch)));
        }

        if config.pins.homing_switch.is_none() {
            return Err(Error::Config(ConfigError::MissingHomingSwitch(
                heapless::String::try_from(name).unwrap_or_default(),
            )));
        }

        if let Some(field) = config.homing_profile().invalid_field() {
            return Err(Error::Config(ConfigError::InvalidHoming(field)));
        }
    }

    Ok(())
}
