//! Builder pattern for StepperMotor.

use std::sync::Arc;
use std::thread;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::{DegreesPerSec, Resolution, UnitConverter};
use crate::config::{MotorConfig, SystemConfig, DEFAULT_ROTARY_SPEED};
use crate::error::{ConfigError, Error, MotorError, Result};

use super::driver::StepperMotor;
use super::pins::DriverPins;
use super::shared::{self, Hardware, Shared};

/// Builder for creating StepperMotor instances.
pub struct StepperMotorBuilder<P, D>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
{
    step_pin: Option<P>,
    dir_pin: Option<P>,
    sleep_pin: Option<P>,
    ms1_pin: Option<P>,
    ms2_pin: Option<P>,
    delay: Option<D>,
    name: Option<heapless::String<32>>,
    steps_per_revolution: u16,
    resolution: u8,
    speed: DegreesPerSec,
    invert_direction: bool,
}

impl<P, D> Default for StepperMotorBuilder<P, D>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, D> StepperMotorBuilder<P, D>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
{
    /// Create a new builder with 200 steps/rev, eighth stepping and 180°/s.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            sleep_pin: None,
            ms1_pin: None,
            ms2_pin: None,
            delay: None,
            name: None,
            steps_per_revolution: 200,
            resolution: Resolution::EIGHTH.value(),
            speed: DEFAULT_ROTARY_SPEED,
            invert_direction: false,
        }
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: P) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: P) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the nSLEEP pin.
    pub fn sleep_pin(mut self, pin: P) -> Self {
        self.sleep_pin = Some(pin);
        self
    }

    /// Set the MS1 and MS2 microstep select pins.
    pub fn microstep_pins(mut self, ms1: P, ms2: P) -> Self {
        self.ms1_pin = Some(ms1);
        self.ms2_pin = Some(ms2);
        self
    }

    /// Set all driver pins at once.
    pub fn pins(self, pins: DriverPins<P>) -> Self {
        self.step_pin(pins.step)
            .dir_pin(pins.dir)
            .sleep_pin(pins.sleep)
            .microstep_pins(pins.ms1, pins.ms2)
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the motor name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set steps per revolution (base motor steps before microstepping).
    pub fn steps_per_revolution(mut self, steps: u16) -> Self {
        self.steps_per_revolution = steps;
        self
    }

    /// Set the microstep resolution. Values other than 1, 2, 4 or 8 are
    /// replaced by 8 with a warning when the motor is built.
    pub fn resolution(mut self, resolution: u8) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the initial speed in degrees per second.
    pub fn speed(mut self, speed: DegreesPerSec) -> Self {
        self.speed = speed;
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Configure from a MotorConfig.
    ///
    /// The speed is taken as degrees per second; linear axes convert their
    /// configured mm/s through [`LinearAxisBuilder`](super::LinearAxisBuilder).
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.name = Some(config.name.clone());
        self.steps_per_revolution = config.steps_per_revolution;
        self.resolution = config.resolution;
        self.speed = config.rotary_speed();
        self.invert_direction = config.invert_direction;
        self
    }

    /// Configure from SystemConfig by motor name.
    pub fn from_config(self, config: &SystemConfig, motor_name: &str) -> Result<Self> {
        let motor_config = config.motor(motor_name).ok_or_else(|| {
            Error::Config(ConfigError::MotorNotFound(
                heapless::String::try_from(motor_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_motor_config(motor_config))
    }

    /// Build the StepperMotor: drive the pins to their initial levels and
    /// start the stepping thread.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin or the delay is missing, steps per
    /// revolution is zero, a pin write fails, or the thread cannot start.
    pub fn build(self) -> Result<StepperMotor<P, D>> {
        let pins = DriverPins {
            step: self.step_pin.ok_or(ConfigError::MissingField("step_pin"))?,
            dir: self.dir_pin.ok_or(ConfigError::MissingField("dir_pin"))?,
            sleep: self.sleep_pin.ok_or(ConfigError::MissingField("sleep_pin"))?,
            ms1: self.ms1_pin.ok_or(ConfigError::MissingField("ms1_pin"))?,
            ms2: self.ms2_pin.ok_or(ConfigError::MissingField("ms2_pin"))?,
        };
        let delay = self.delay.ok_or(ConfigError::MissingField("delay"))?;

        if self.steps_per_revolution == 0 {
            return Err(ConfigError::InvalidStepsPerRevolution(0).into());
        }

        let name = self
            .name
            .unwrap_or_else(|| heapless::String::try_from("motor").unwrap_or_default());

        let resolution = Resolution::or_fallback(self.resolution);
        let converter = UnitConverter::new(self.steps_per_revolution, resolution);
        let step_time = converter.step_time(self.speed);

        let mut hardware = Hardware::new(pins, delay, self.invert_direction);
        hardware.init(resolution)?;

        let shared = Arc::new(Shared::new(hardware, step_time));
        let weak = Arc::downgrade(&shared);
        thread::Builder::new()
            .name(format!("stepper-{}", name))
            .spawn(move || shared::run(weak))
            .map_err(|e| {
                tracing::error!(motor = %name, error = %e, "failed to spawn stepping thread");
                MotorError::SpawnFailed
            })?;

        tracing::info!(
            motor = %name,
            resolution = resolution.value(),
            steps_per_revolution = self.steps_per_revolution,
            step_time,
            "motor ready"
        );

        Ok(StepperMotor::from_parts(shared, converter, name))
    }
}
