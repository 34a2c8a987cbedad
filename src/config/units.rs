//! Unit types for physical quantities.
//!
//! Provides type-safe representations of angles, distances, velocities and
//! motor steps, plus the converters that map between them for a given driver
//! resolution and lead screw.

use core::ops::Neg;

use serde::Deserialize;

/// Angular position in degrees.
///
/// Used for configuration and user-facing API. Internally converted to [`Steps`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Degrees(pub f32);

impl Degrees {
    /// Create a new Degrees value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Angular velocity in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct DegreesPerSec(pub f32);

impl DegreesPerSec {
    /// Create a new DegreesPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Linear travel in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Millimeters(pub f32);

impl Millimeters {
    /// Create a new Millimeters value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Neg for Millimeters {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// Linear velocity in millimetres per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct MillimetersPerSec(pub f32);

impl MillimetersPerSec {
    /// Create a new MillimetersPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Motor position or travel in steps.
///
/// Uses i64 for unlimited range in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }
}

/// Microstep multiplier selected through the driver's MS1/MS2 lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolution(u8);

impl Resolution {
    /// Full step.
    pub const FULL: Self = Self(1);
    /// Half step.
    pub const HALF: Self = Self(2);
    /// Quarter step.
    pub const QUARTER: Self = Self(4);
    /// Eighth step (finest mode of the driver, and the fallback).
    pub const EIGHTH: Self = Self(8);

    /// Valid resolution values.
    pub const VALID_VALUES: [u8; 4] = [1, 2, 4, 8];

    /// Create a resolution, returning `None` for unsupported values.
    pub fn new(value: u8) -> Option<Self> {
        if Self::VALID_VALUES.contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a resolution, substituting eighth-stepping for unsupported
    /// values and logging a warning.
    pub fn or_fallback(value: u8) -> Self {
        match Self::new(value) {
            Some(resolution) => resolution,
            None => {
                tracing::warn!(
                    requested = value,
                    accepted = ?Self::VALID_VALUES,
                    "unsupported resolution, using eighth stepping"
                );
                Self::EIGHTH
            }
        }
    }

    /// Get the raw multiplier.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Levels of (MS1, MS2) selecting this resolution, `true` meaning high.
    pub const fn mode_pins(self) -> (bool, bool) {
        match self.0 {
            1 => (false, false),
            2 => (true, false),
            4 => (false, true),
            _ => (true, true),
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::EIGHTH
    }
}

// Products within one f32 ulp (relative) of an integer are treated as that
// integer, so float noise does not truncate 2.9999999 down to 2. Anything
// further off is a real fraction of a step and truncates.
const STEP_SNAP: f64 = f32::EPSILON as f64;

/// Converts between degrees and steps for one motor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    steps_per_revolution: u16,
    resolution: Resolution,
}

impl UnitConverter {
    /// Create a converter for a motor with the given full steps per
    /// revolution and microstep resolution.
    pub const fn new(steps_per_revolution: u16, resolution: Resolution) -> Self {
        Self {
            steps_per_revolution,
            resolution,
        }
    }

    /// Full steps per revolution of the motor.
    #[inline]
    pub const fn steps_per_revolution(&self) -> u16 {
        self.steps_per_revolution
    }

    /// Microstep resolution.
    #[inline]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Microsteps per degree of shaft rotation.
    #[inline]
    pub fn steps_per_degree(&self) -> f64 {
        self.steps_per_revolution as f64 * self.resolution.value() as f64 / 360.0
    }

    /// Convert an angle to steps, truncating toward zero.
    pub fn deg_to_step(&self, degrees: Degrees) -> Steps {
        let raw = degrees.0 as f64 * self.steps_per_degree();
        let nearest = libm::round(raw);
        let tolerance = STEP_SNAP * libm::fmax(libm::fabs(raw), 1.0);
        let steps = if libm::fabs(raw - nearest) < tolerance {
            nearest
        } else {
            libm::trunc(raw)
        };
        Steps(steps as i64)
    }

    /// Convert steps to an angle.
    pub fn step_to_deg(&self, steps: Steps) -> Degrees {
        Degrees((steps.0 as f64 / self.steps_per_degree()) as f32)
    }

    /// Seconds per half pulse for the given speed: `1 / deg_to_step(|speed|)`.
    ///
    /// A speed slower than one step per second is raised to one step per
    /// second with a warning, so the result is always finite and positive.
    pub fn step_time(&self, speed: DegreesPerSec) -> f64 {
        let steps = self.deg_to_step(Degrees(libm::fabsf(speed.0))).0;
        if steps < 1 {
            tracing::warn!(
                speed = speed.0,
                "speed below one step per second, using one step per second"
            );
            return 1.0;
        }
        1.0 / steps as f64
    }

    /// Speed corresponding to a half-pulse time, the inverse of
    /// [`step_time`](Self::step_time): `step_to_deg(1 / step_time)`.
    pub fn speed(&self, step_time: f64) -> DegreesPerSec {
        DegreesPerSec((1.0 / (step_time * self.steps_per_degree())) as f32)
    }
}

/// Lead screw translating shaft angle into carriage travel.
///
/// The pitch is the travel per unit of commanded angle, so
/// `angle = distance / pitch` and `speed_deg = speed_mm / pitch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadScrew {
    pitch: f32,
}

impl LeadScrew {
    /// Create a lead screw. The pitch must be non-zero.
    pub const fn new(pitch: f32) -> Self {
        Self { pitch }
    }

    /// Screw pitch.
    #[inline]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Convert carriage travel to shaft angle.
    #[inline]
    pub fn distance_to_angle(&self, distance: Millimeters) -> Degrees {
        Degrees(distance.0 / self.pitch)
    }

    /// Convert shaft angle to carriage travel.
    #[inline]
    pub fn angle_to_distance(&self, angle: Degrees) -> Millimeters {
        Millimeters(angle.0 * self.pitch)
    }

    /// Convert carriage speed to shaft speed.
    #[inline]
    pub fn to_angular(&self, speed: MillimetersPerSec) -> DegreesPerSec {
        DegreesPerSec(speed.0 / self.pitch)
    }

    /// Convert shaft speed to carriage speed.
    #[inline]
    pub fn to_linear(&self, speed: DegreesPerSec) -> MillimetersPerSec {
        MillimetersPerSec(speed.0 * self.pitch)
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Degrees.
    fn degrees(self) -> Degrees;
    /// Convert to DegreesPerSec.
    fn degrees_per_sec(self) -> DegreesPerSec;
    /// Convert to Millimeters.
    fn mm(self) -> Millimeters;
    /// Convert to MillimetersPerSec.
    fn mm_per_sec(self) -> MillimetersPerSec;
}

impl UnitExt for f32 {
    #[inline]
    fn degrees(self) -> Degrees {
        Degrees(self)
    }

    #[inline]
    fn degrees_per_sec(self) -> DegreesPerSec {
        DegreesPerSec(self)
    }

    #[inline]
    fn mm(self) -> Millimeters {
        Millimeters(self)
    }

    #[inline]
    fn mm_per_sec(self) -> MillimetersPerSec {
        MillimetersPerSec(self)
    }
}
