//! State shared between a motor handle and its stepping thread.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::Resolution;
use crate::error::{MotorError, PinRole};

use super::direction::Direction;
use super::pins::DriverPins;

/// Lock a mutex, recovering the data if another thread panicked while
/// holding it. Every guarded value stays consistent between statements.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Commanded travel. Target and busy change together under one lock so a
/// posted non-zero target is never observed without busy.
#[derive(Debug, Default)]
pub(crate) struct Motion {
    /// Remaining signed steps for the background loop.
    pub target_steps: i64,
    /// Background loop has work in flight.
    pub busy: bool,
    /// A blocking rotate is running on a caller thread.
    pub rotating: bool,
    /// Bumped on every post, so the loop can tell a re-posted target from
    /// the one it is already working on.
    generation: u64,
}

impl Motion {
    pub fn is_busy(&self) -> bool {
        self.busy || self.rotating
    }

    /// Replace the remaining travel with `steps`.
    pub fn post(&mut self, steps: i64) {
        self.target_steps = steps;
        self.generation = self.generation.wrapping_add(1);
        if steps != 0 {
            self.busy = true;
        }
    }

    /// Count one emitted step against `target` if no post landed since it
    /// was read as `generation`. A newer post is left untouched.
    fn step_done(&mut self, target: i64, generation: u64) {
        if self.generation == generation {
            self.target_steps -= target.signum();
            self.busy = true;
        }
    }
}

/// Pins, delay and the direction they currently encode.
pub(crate) struct Hardware<P, D> {
    pins: DriverPins<P>,
    delay: D,
    direction: Direction,
    invert_direction: bool,
}

fn write<P: OutputPin>(pin: &mut P, role: PinRole, high: bool) -> Result<(), MotorError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|e| {
        tracing::error!(pin = %role, error = ?e, "GPIO write failed");
        MotorError::PinError { pin: role }
    })
}

impl<P, D> Hardware<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(pins: DriverPins<P>, delay: D, invert_direction: bool) -> Self {
        Self {
            pins,
            delay,
            direction: Direction::Clockwise,
            invert_direction,
        }
    }

    /// Wake the driver, point DIR clockwise, park STEP low and select the
    /// microstep mode.
    pub fn init(&mut self, resolution: Resolution) -> Result<(), MotorError> {
        write(&mut self.pins.sleep, PinRole::Sleep, true)?;
        self.set_direction(Direction::Clockwise)?;
        write(&mut self.pins.step, PinRole::Step, false)?;

        let (ms1, ms2) = resolution.mode_pins();
        write(&mut self.pins.ms1, PinRole::Ms1, ms1)?;
        write(&mut self.pins.ms2, PinRole::Ms2, ms2)?;
        Ok(())
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) -> Result<(), MotorError> {
        write(
            &mut self.pins.dir,
            PinRole::Dir,
            direction.dir_level(self.invert_direction),
        )?;
        self.direction = direction;
        Ok(())
    }

    /// One STEP cycle: high for `half_period_ns`, then low for the same.
    pub fn pulse(&mut self, half_period_ns: u64) -> Result<(), MotorError> {
        write(&mut self.pins.step, PinRole::Step, true)?;
        self.hold(half_period_ns);
        write(&mut self.pins.step, PinRole::Step, false)?;
        self.hold(half_period_ns);
        Ok(())
    }

    fn hold(&mut self, ns: u64) {
        match u32::try_from(ns) {
            Ok(ns) => self.delay.delay_ns(ns),
            Err(_) => self.delay.delay_us(u32::try_from(ns / 1_000).unwrap_or(u32::MAX)),
        }
    }
}

// Longest idle sleep between polls for a new target.
const IDLE_CAP: Duration = Duration::from_secs(2);

/// Everything a motor handle shares with its stepping thread.
pub(crate) struct Shared<P, D> {
    pub motion: Mutex<Motion>,
    pub hardware: Mutex<Hardware<P, D>>,
    step_count: AtomicI64,
    step_time_bits: AtomicU64,
}

impl<P, D> Shared<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(hardware: Hardware<P, D>, step_time: f64) -> Self {
        Self {
            motion: Mutex::new(Motion::default()),
            hardware: Mutex::new(hardware),
            step_count: AtomicI64::new(0),
            step_time_bits: AtomicU64::new(step_time.to_bits()),
        }
    }

    pub fn step_time(&self) -> f64 {
        f64::from_bits(self.step_time_bits.load(Ordering::Relaxed))
    }

    pub fn set_step_time(&self, seconds: f64) {
        self.step_time_bits.store(seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn step_count(&self) -> i64 {
        self.step_count.load(Ordering::Acquire)
    }

    /// Emit one step in the current direction and count it.
    pub fn one_step(&self, hardware: &mut Hardware<P, D>) -> Result<(), MotorError> {
        let half_period_ns = (self.step_time() * 1e9) as u64;
        hardware.pulse(half_period_ns)?;
        self.step_count
            .fetch_add(hardware.direction().sign(), Ordering::AcqRel);
        Ok(())
    }

    /// One iteration of the background loop.
    fn tick(&self) -> Result<(), MotorError> {
        let posted = {
            let mut motion = lock(&self.motion);
            if motion.target_steps == 0 {
                motion.busy = false;
                None
            } else {
                Some((motion.target_steps, motion.generation))
            }
        };

        let Some((target, generation)) = posted else {
            let idle = Duration::try_from_secs_f64(2.0 * self.step_time()).unwrap_or(IDLE_CAP);
            thread::sleep(idle.min(IDLE_CAP));
            return Ok(());
        };

        {
            let mut hardware = lock(&self.hardware);
            let wanted = Direction::for_target(target);
            if hardware.direction() != wanted {
                tracing::debug!(direction = ?wanted, target, "reversing");
                hardware.set_direction(wanted)?;
            }
            self.one_step(&mut hardware)?;
        }

        lock(&self.motion).step_done(target, generation);
        Ok(())
    }

    /// Drop the current target after a hardware failure.
    fn abandon(&self) {
        let mut motion = lock(&self.motion);
        motion.target_steps = 0;
        motion.busy = false;
    }
}

/// Background stepping loop. Runs until the last motor handle is dropped.
pub(crate) fn run<P, D>(weak: Weak<Shared<P, D>>)
where
    P: OutputPin,
    D: DelayNs,
{
    tracing::trace!("stepping thread started");
    while let Some(shared) = weak.upgrade() {
        if let Err(e) = shared.tick() {
            tracing::error!(error = %e, "step failed, abandoning target");
            shared.abandon();
        }
    }
    tracing::trace!("motor dropped, stepping thread exiting");
}
