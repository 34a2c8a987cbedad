//! Lead-screw axis with limit-switch homing.
//!
//! A [`LinearAxis`] wraps a [`StepperMotor`] and translates millimetres to
//! the motor's degrees through a [`LeadScrew`]. The homing switch raises an
//! atomic flag from its interrupt callback; [`LinearAxis::home`] is the only
//! reader.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::units::{LeadScrew, Millimeters, MillimetersPerSec, Steps};
use crate::config::{HomingProfile, MotorConfig, DEFAULT_LINEAR_SPEED};
use crate::error::{bounded, ConfigError, MotorError, PinRole, Result};
use crate::hal::{Edge, EdgeInterrupt};

use super::builder::StepperMotorBuilder;
use super::driver::StepperMotor;
use super::shared::lock;

/// Phases of the homing sequence, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingPhase {
    /// Move away from the switch in case it is already pressed.
    SeekClear,
    /// Run toward the switch at the fast speed until it triggers.
    SeekFast,
    /// Move off the switch.
    Backoff,
    /// Approach the switch again at the slow speed.
    SeekSlow,
    /// Switch found; motion stopped.
    Done,
}

/// Linear axis: a stepper motor on a lead screw with a homing switch.
pub struct LinearAxis<P, D, S>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
    S: InputPin + EdgeInterrupt,
{
    motor: StepperMotor<P, D>,
    screw: LeadScrew,
    homing: HomingProfile,
    at_home: Arc<AtomicBool>,
    switch: Mutex<S>,
}

impl<P, D, S> LinearAxis<P, D, S>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
    S: InputPin + EdgeInterrupt,
{
    /// Wrap a motor whose speed is already set in shaft units.
    ///
    /// Points the motor counter-clockwise and registers a debounced
    /// falling-edge callback on the switch that raises the at-home flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the DIR write or the interrupt registration fails.
    pub fn new(
        motor: StepperMotor<P, D>,
        screw: LeadScrew,
        mut switch: S,
        homing: HomingProfile,
    ) -> Result<Self> {
        motor.set_rotation_direction(false)?;

        let at_home = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&at_home);
        switch
            .register_edge_interrupt(
                Edge::Falling,
                Duration::from_millis(u64::from(homing.debounce_ms)),
                move || flag.store(true, Ordering::Release),
            )
            .map_err(|e| {
                tracing::error!(motor = motor.name(), error = ?e, "homing switch interrupt setup failed");
                MotorError::InterruptSetup(bounded(&format_args!("{:?}", e)))
            })?;

        Ok(Self {
            motor,
            screw,
            homing,
            at_home,
            switch: Mutex::new(switch),
        })
    }

    /// Underlying motor, in shaft units.
    #[inline]
    pub fn motor(&self) -> &StepperMotor<P, D> {
        &self.motor
    }

    /// Lead screw used for unit translation.
    #[inline]
    pub fn screw(&self) -> LeadScrew {
        self.screw
    }

    /// Homing parameters.
    #[inline]
    pub fn homing_profile(&self) -> &HomingProfile {
        &self.homing
    }

    /// Current speed in millimetres per second.
    pub fn speed(&self) -> MillimetersPerSec {
        self.screw.to_linear(self.motor.speed())
    }

    /// Set the speed in millimetres per second.
    pub fn set_speed(&self, speed: MillimetersPerSec) {
        self.motor.set_speed(self.screw.to_angular(speed));
    }

    /// Post a relative move in millimetres for the background thread.
    pub fn set_target_position(&self, distance: Millimeters) {
        self.motor
            .set_target_position(self.screw.distance_to_angle(distance));
    }

    /// Move by `distance` on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin write fails.
    pub fn rotate(&self, distance: Millimeters) -> Result<()> {
        self.motor.rotate(self.screw.distance_to_angle(distance))
    }

    /// Whether commanded travel is unfinished.
    pub fn is_busy(&self) -> bool {
        self.motor.is_busy()
    }

    /// Running position estimate in steps.
    pub fn step_count(&self) -> Steps {
        self.motor.step_count()
    }

    /// Whether the switch has triggered since the flag was last cleared.
    pub fn at_home(&self) -> bool {
        self.at_home.load(Ordering::Acquire)
    }

    /// Read the switch line directly. The switch closes to ground, so a low
    /// level means pressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be read.
    pub fn switch_pressed(&self) -> Result<bool> {
        lock(&self.switch).is_low().map_err(|e| {
            tracing::error!(motor = self.motor.name(), error = ?e, "homing switch read failed");
            MotorError::PinError {
                pin: PinRole::HomingSwitch,
            }
            .into()
        })
    }

    /// Home the axis against the switch. Blocks until done; there is no
    /// timeout, so a switch that never triggers blocks forever.
    pub fn home(&self) {
        self.home_with(|_| {});
    }

    /// Home the axis, reporting each phase to `on_phase` as it starts.
    pub fn home_with<F>(&self, mut on_phase: F)
    where
        F: FnMut(HomingPhase),
    {
        let profile = self.homing;
        let poll = Duration::from_millis(u64::from(profile.poll_interval_ms));

        self.enter(HomingPhase::SeekClear, &mut on_phase);
        self.set_speed(profile.fast_speed);
        self.set_target_position(profile.clear_distance);
        self.poll_while(poll, || self.is_busy());
        self.clear_home();

        self.enter(HomingPhase::SeekFast, &mut on_phase);
        self.set_target_position(-profile.seek_distance);
        self.poll_while(poll, || !self.at_home());

        self.enter(HomingPhase::Backoff, &mut on_phase);
        self.set_target_position(profile.backoff_distance);
        self.poll_while(poll, || self.is_busy());

        self.clear_home();
        self.set_speed(profile.slow_speed);
        self.enter(HomingPhase::SeekSlow, &mut on_phase);
        self.set_target_position(-profile.slow_seek_distance);
        self.poll_while(poll, || !self.at_home());

        self.enter(HomingPhase::Done, &mut on_phase);
        self.set_target_position(Millimeters(0.0));
        self.clear_home();
        self.poll_while(poll, || self.is_busy());
        tracing::info!(
            motor = self.motor.name(),
            step_count = self.step_count().0,
            "homing finished"
        );
    }

    fn enter<F>(&self, phase: HomingPhase, on_phase: &mut F)
    where
        F: FnMut(HomingPhase),
    {
        tracing::info!(motor = self.motor.name(), ?phase, "homing");
        on_phase(phase);
    }

    fn clear_home(&self) {
        self.at_home.store(false, Ordering::Release);
    }

    fn poll_while(&self, interval: Duration, mut condition: impl FnMut() -> bool) {
        while condition() {
            thread::sleep(interval);
        }
    }
}

impl<P, D, S> core::fmt::Debug for LinearAxis<P, D, S>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
    S: InputPin + EdgeInterrupt,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LinearAxis")
            .field("motor", &self.motor)
            .field("pitch", &self.screw.pitch())
            .field("at_home", &self.at_home())
            .finish()
    }
}

/// Builder for a [`LinearAxis`]: a motor builder plus screw, switch and
/// homing parameters. The speed is given in mm/s.
pub struct LinearAxisBuilder<P, D, S>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
    S: InputPin + EdgeInterrupt,
{
    motor: StepperMotorBuilder<P, D>,
    screw_pitch: Option<f32>,
    switch: Option<S>,
    homing: HomingProfile,
    speed: MillimetersPerSec,
}

impl<P, D, S> LinearAxisBuilder<P, D, S>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
    S: InputPin + EdgeInterrupt,
{
    /// Start from a motor builder carrying the pins and delay.
    pub fn new(motor: StepperMotorBuilder<P, D>) -> Self {
        Self {
            motor,
            screw_pitch: None,
            switch: None,
            homing: HomingProfile::default(),
            speed: DEFAULT_LINEAR_SPEED,
        }
    }

    /// Set the screw pitch.
    pub fn screw_pitch(mut self, pitch: f32) -> Self {
        self.screw_pitch = Some(pitch);
        self
    }

    /// Set the homing switch.
    pub fn homing_switch(mut self, switch: S) -> Self {
        self.switch = Some(switch);
        self
    }

    /// Set the homing parameters.
    pub fn homing(mut self, homing: HomingProfile) -> Self {
        self.homing = homing;
        self
    }

    /// Set the initial speed in millimetres per second.
    pub fn speed(mut self, speed: MillimetersPerSec) -> Self {
        self.speed = speed;
        self
    }

    /// Configure from a linear MotorConfig.
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.motor = self.motor.from_motor_config(config);
        self.screw_pitch = config.screw_pitch;
        self.homing = config.homing_profile();
        self.speed = config.linear_speed();
        self
    }

    /// Build the motor and wrap it.
    ///
    /// # Errors
    ///
    /// Returns an error if the pitch or switch is missing or not positive, or
    /// if building the motor or registering the interrupt fails.
    pub fn build(self) -> Result<LinearAxis<P, D, S>> {
        let pitch = self
            .screw_pitch
            .ok_or(ConfigError::MissingField("screw_pitch"))?;
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(ConfigError::InvalidScrewPitch(pitch).into());
        }
        let switch = self.switch.ok_or(ConfigError::MissingField("homing_switch"))?;

        let screw = LeadScrew::new(pitch);
        let motor = self.motor.speed(screw.to_angular(self.speed)).build()?;
        LinearAxis::new(motor, screw, switch, self.homing)
    }
}
