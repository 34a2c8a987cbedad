//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::motor::MotorConfig;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Named motor configurations.
    pub motors: FnvIndexMap<String<32>, MotorConfig, 8>,
}

impl SystemConfig {
    /// Get a motor configuration by name.
    pub fn motor(&self, name: &str) -> Option<&MotorConfig> {
        self.motors
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// List all motor names.
    pub fn motor_names(&self) -> impl Iterator<Item = &str> {
        self.motors.keys().map(|s| s.as_str())
    }

    /// Iterate over rotary motors.
    pub fn rotary_motors(&self) -> impl Iterator<Item = (&str, &MotorConfig)> {
        self.motors
            .iter()
            .filter(|(_, m)| !m.is_linear())
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over linear axes.
    pub fn linear_axes(&self) -> impl Iterator<Item = (&str, &MotorConfig)> {
        self.motors
            .iter()
            .filter(|(_, m)| m.is_linear())
            .map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            motors: FnvIndexMap::new(),
        }
    }
}
