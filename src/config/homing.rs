//! Homing sequence parameters.

use serde::Deserialize;

use super::units::{Millimeters, MillimetersPerSec};

/// Speeds, distances and timings of the lead-screw homing sequence.
///
/// Distances are magnitudes; the sequence applies the signs (clear and back
/// off away from the switch, seek toward it). The defaults are the values
/// the sequence was tuned with.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HomingProfile {
    /// Speed for the clearing move and the fast seek.
    pub fast_speed: MillimetersPerSec,

    /// Speed for the final slow seek.
    pub slow_speed: MillimetersPerSec,

    /// Move away from the switch before seeking, in case it is already pressed.
    pub clear_distance: Millimeters,

    /// Fast seek target, far beyond the axis travel.
    pub seek_distance: Millimeters,

    /// Move away from the switch after the fast seek.
    pub backoff_distance: Millimeters,

    /// Slow seek target.
    pub slow_seek_distance: Millimeters,

    /// Interval between busy / at-home polls.
    pub poll_interval_ms: u32,

    /// Debounce applied to the switch interrupt.
    pub debounce_ms: u32,
}

impl Default for HomingProfile {
    fn default() -> Self {
        Self {
            fast_speed: MillimetersPerSec(30.0),
            slow_speed: MillimetersPerSec(2.0),
            clear_distance: Millimeters(20.0),
            seek_distance: Millimeters(1000.0),
            backoff_distance: Millimeters(5.0),
            slow_seek_distance: Millimeters(20.0),
            poll_interval_ms: 100,
            debounce_ms: 200,
        }
    }
}

impl HomingProfile {
    /// Name of the first non-positive parameter, if any.
    pub fn invalid_field(&self) -> Option<&'static str> {
        let lengths = [
            ("fast_speed", self.fast_speed.0),
            ("slow_speed", self.slow_speed.0),
            ("clear_distance", self.clear_distance.0),
            ("seek_distance", self.seek_distance.0),
            ("backoff_distance", self.backoff_distance.0),
            ("slow_seek_distance", self.slow_seek_distance.0),
        ];
        if let Some((name, _)) = lengths.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Some(*name);
        }
        if self.poll_interval_ms == 0 {
            return Some("poll_interval_ms");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(HomingProfile::default().invalid_field(), None);
    }

    #[test]
    fn test_invalid_field_reported() {
        let profile = HomingProfile {
            backoff_distance: Millimeters(0.0),
            ..HomingProfile::default()
        };
        assert_eq!(profile.invalid_field(), Some("backoff_distance"));

        let profile = HomingProfile {
            poll_interval_ms: 0,
            ..HomingProfile::default()
        };
        assert_eq!(profile.invalid_field(), Some("poll_interval_ms"));
    }
}
