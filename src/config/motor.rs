//! Motor configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::homing::HomingProfile;
use super::pinout::PinoutConfig;
use super::units::{DegreesPerSec, LeadScrew, MillimetersPerSec, Resolution, UnitConverter};

/// Default speed of a rotary axis in degrees per second.
pub const DEFAULT_ROTARY_SPEED: DegreesPerSec = DegreesPerSec(180.0);

/// Default speed of a linear axis in millimetres per second.
pub const DEFAULT_LINEAR_SPEED: MillimetersPerSec = MillimetersPerSec(10.0);

/// Complete motor configuration from TOML.
///
/// A motor with a `screw_pitch` is a linear axis: its `speed` is in mm/s and
/// it needs a homing switch. Otherwise `speed` is in degrees per second.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// GPIO lines of the driver.
    pub pins: PinoutConfig,

    /// Base steps per revolution (typically 200 for 1.8° motors).
    #[serde(default = "default_steps_per_revolution")]
    pub steps_per_revolution: u16,

    /// Microstep setting as written in the file. Unsupported values are
    /// replaced by 8 when the motor is built.
    #[serde(default = "default_resolution")]
    pub resolution: u8,

    /// Initial speed (deg/s for rotary, mm/s for linear axes).
    #[serde(default)]
    pub speed: Option<f32>,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Lead screw pitch; present only on linear axes.
    #[serde(default)]
    pub screw_pitch: Option<f32>,

    /// Homing parameters for linear axes.
    #[serde(default)]
    pub homing: Option<HomingProfile>,
}

fn default_steps_per_revolution() -> u16 {
    200
}

fn default_resolution() -> u8 {
    8
}

impl MotorConfig {
    /// Whether this motor drives a lead screw.
    pub fn is_linear(&self) -> bool {
        self.screw_pitch.is_some()
    }

    /// Converter for this motor, with the resolution corrected if needed.
    pub fn converter(&self) -> UnitConverter {
        UnitConverter::new(
            self.steps_per_revolution,
            Resolution::or_fallback(self.resolution),
        )
    }

    /// Lead screw of a linear axis.
    pub fn lead_screw(&self) -> Option<LeadScrew> {
        self.screw_pitch.map(LeadScrew::new)
    }

    /// Initial rotary speed, falling back to the default.
    pub fn rotary_speed(&self) -> DegreesPerSec {
        self.speed.map(DegreesPerSec).unwrap_or(DEFAULT_ROTARY_SPEED)
    }

    /// Initial linear speed, falling back to the default.
    pub fn linear_speed(&self) -> MillimetersPerSec {
        self.speed.map(MillimetersPerSec).unwrap_or(DEFAULT_LINEAR_SPEED)
    }

    /// Homing parameters, falling back to the defaults.
    pub fn homing_profile(&self) -> HomingProfile {
        self.homing.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Degrees, Steps};

    fn config() -> MotorConfig {
        MotorConfig {
            name: String::try_from("test").unwrap(),
            pins: PinoutConfig {
                step: 1,
                dir: 2,
                sleep: 3,
                ms1: 4,
                ms2: 5,
                homing_switch: None,
            },
            steps_per_revolution: 200,
            resolution: 4,
            speed: None,
            invert_direction: false,
            screw_pitch: None,
            homing: None,
        }
    }

    #[test]
    fn test_rotary_defaults() {
        let config = config();
        assert!(!config.is_linear());
        assert_eq!(config.rotary_speed(), DEFAULT_ROTARY_SPEED);
        assert!(config.lead_screw().is_none());
    }

    #[test]
    fn test_converter_uses_resolution() {
        let config = config();
        // 200 * 4 = 800 steps/rev
        assert_eq!(config.converter().deg_to_step(Degrees(360.0)), Steps(800));
    }

    #[test]
    fn test_converter_corrects_resolution() {
        let config = MotorConfig {
            resolution: 3,
            ..config()
        };
        assert_eq!(config.converter().resolution(), Resolution::EIGHTH);
    }

    #[test]
    fn test_linear_speed_from_config() {
        let config = MotorConfig {
            screw_pitch: Some(8.0),
            speed: Some(25.0),
            ..config()
        };
        assert!(config.is_linear());
        assert_eq!(config.linear_speed(), MillimetersPerSec(25.0));
        assert_eq!(config.lead_screw().map(|s| s.pitch()), Some(8.0));
    }
}
