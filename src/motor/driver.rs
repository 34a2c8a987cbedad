//! Stepper motor driver.
//!
//! Generic over embedded-hal 1.0 pin and delay types. A motor owns a
//! background thread that drains the posted target one step at a time; the
//! handle itself only posts work and reads state, so every method takes
//! `&self` and the motor can be shared across threads.

use std::sync::Arc;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::{Degrees, DegreesPerSec, Resolution, Steps, UnitConverter};
use crate::error::Result;

use super::builder::StepperMotorBuilder;
use super::direction::Direction;
use super::shared::{lock, Shared};

/// Stepper motor driven through STEP/DIR/nSLEEP/MS1/MS2.
///
/// Generic over:
/// - `P`: output pin type (must implement `OutputPin`)
/// - `D`: delay provider for pulse timing (must implement `DelayNs`)
///
/// Sign convention: a positive angle travels counter-clockwise and lowers
/// [`step_count`](Self::step_count); a negative angle travels clockwise and
/// raises it. This holds for both [`rotate`](Self::rotate) and
/// [`set_target_position`](Self::set_target_position).
///
/// `rotate` and `set_target_position` must not be driven at the same time on
/// one motor; their steps would interleave.
pub struct StepperMotor<P, D>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
{
    shared: Arc<Shared<P, D>>,
    converter: UnitConverter,
    name: heapless::String<32>,
}

impl<P, D> StepperMotor<P, D>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
{
    /// Start building a motor.
    pub fn builder() -> StepperMotorBuilder<P, D> {
        StepperMotorBuilder::new()
    }

    pub(crate) fn from_parts(
        shared: Arc<Shared<P, D>>,
        converter: UnitConverter,
        name: heapless::String<32>,
    ) -> Self {
        Self {
            shared,
            converter,
            name,
        }
    }

    /// Get the motor name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Degree/step converter for this motor.
    #[inline]
    pub fn converter(&self) -> &UnitConverter {
        &self.converter
    }

    /// Effective microstep resolution (after any fallback).
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.converter.resolution()
    }

    /// Full steps per revolution.
    #[inline]
    pub fn steps_per_revolution(&self) -> u16 {
        self.converter.steps_per_revolution()
    }

    /// Seconds per half pulse.
    pub fn step_time(&self) -> f64 {
        self.shared.step_time()
    }

    /// Set the seconds per half pulse. Takes effect on the next pulse.
    ///
    /// Non-positive or non-finite values, and values too long to express
    /// as a pulse period, are ignored with a warning.
    pub fn set_step_time(&self, seconds: f64) {
        let valid = seconds.is_finite()
            && seconds > 0.0
            && Duration::try_from_secs_f64(2.0 * seconds).is_ok();
        if !valid {
            tracing::warn!(motor = %self.name, seconds, "ignoring invalid step time");
            return;
        }
        self.shared.set_step_time(seconds);
    }

    /// Current speed in degrees per second, as quantised by the step time.
    pub fn speed(&self) -> DegreesPerSec {
        self.converter.speed(self.step_time())
    }

    /// Set the speed in degrees per second. The sign is ignored; direction
    /// comes from the commanded angle.
    pub fn set_speed(&self, speed: DegreesPerSec) {
        self.shared.set_step_time(self.converter.step_time(speed));
    }

    /// Post a relative move for the background thread and return at once.
    ///
    /// Replaces any travel still pending. Zero steps leaves busy untouched.
    pub fn set_target_position(&self, angle: Degrees) {
        let steps = self.converter.deg_to_step(angle);
        lock(&self.shared.motion).post(steps.0);
        tracing::debug!(motor = %self.name, angle = angle.0, steps = steps.0, "target posted");
    }

    /// Rotate by `angle` on the calling thread, returning when done.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin write fails; the rotation stops there.
    pub fn rotate(&self, angle: Degrees) -> Result<()> {
        self.set_rotation_direction(angle.0 < 0.0)?;
        let steps = self.converter.deg_to_step(Degrees(angle.0.abs()));

        lock(&self.shared.motion).rotating = true;
        let result = (0..steps.0).try_for_each(|_| {
            let mut hardware = lock(&self.shared.hardware);
            self.shared.one_step(&mut hardware)
        });
        lock(&self.shared.motion).rotating = false;

        result.map_err(Into::into)
    }

    /// Drive the DIR line and remember the direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the DIR pin write fails.
    pub fn set_rotation_direction(&self, clockwise: bool) -> Result<()> {
        lock(&self.shared.hardware).set_direction(Direction::from_clockwise(clockwise))?;
        Ok(())
    }

    /// Direction of the last or current step.
    pub fn direction(&self) -> Direction {
        lock(&self.shared.hardware).direction()
    }

    /// Running position estimate: +1 per clockwise step, -1 per
    /// counter-clockwise step.
    pub fn step_count(&self) -> Steps {
        Steps(self.shared.step_count())
    }

    /// Steps the background thread still has to emit.
    pub fn target_steps(&self) -> Steps {
        Steps(lock(&self.shared.motion).target_steps)
    }

    /// Whether commanded travel is unfinished.
    pub fn is_busy(&self) -> bool {
        lock(&self.shared.motion).is_busy()
    }

    /// Block until the motor is idle, checking every `poll_interval`.
    pub fn wait_idle(&self, poll_interval: Duration) {
        while self.is_busy() {
            std::thread::sleep(poll_interval);
        }
    }
}

impl<P, D> core::fmt::Debug for StepperMotor<P, D>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StepperMotor")
            .field("name", &self.name.as_str())
            .field("resolution", &self.resolution().value())
            .field("step_count", &self.shared.step_count())
            .field("step_time", &self.step_time())
            .finish()
    }
}
