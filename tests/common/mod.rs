//! Simulated GPIO shared by the integration tests.
//!
//! `SimPin` records every level written to it; clones share the record so a
//! test can keep a handle while the motor owns the pin. `SimSwitch` is a
//! pulled-up input whose falling edge runs the registered callback.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stepper_axis::{DriverPins, Edge, EdgeInterrupt, PreciseDelay, StepperMotor};

/// Output line that remembers its level history.
#[derive(Debug, Clone, Default)]
pub struct SimPin {
    levels: Arc<Mutex<Vec<bool>>>,
}

impl SimPin {
    /// Every level written so far, oldest first.
    pub fn history(&self) -> Vec<bool> {
        self.levels.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Last level written.
    pub fn level(&self) -> Option<bool> {
        self.history().last().copied()
    }

    /// Number of low-to-high transitions, counting from an initial low.
    pub fn rising_edges(&self) -> usize {
        let history = self.history();
        let mut previous = false;
        let mut edges = 0;
        for level in history {
            if level && !previous {
                edges += 1;
            }
            previous = level;
        }
        edges
    }

    /// Number of live handles on this line, clones included.
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.levels)
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.lock().unwrap_or_else(PoisonError::into_inner).push(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.lock().unwrap_or_else(PoisonError::into_inner).push(false);
        Ok(())
    }
}

type Callback = Box<dyn FnMut() + Send>;

#[derive(Default)]
struct SwitchState {
    pressed: bool,
    presses: usize,
    edge: Option<Edge>,
    debounce: Option<Duration>,
    callback: Option<Callback>,
}

/// Limit switch closing to ground.
#[derive(Clone, Default)]
pub struct SimSwitch {
    state: Arc<Mutex<SwitchState>>,
}

impl SimSwitch {
    fn state(&self) -> std::sync::MutexGuard<'_, SwitchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close the switch. Fires the falling-edge callback if it was open.
    pub fn press(&self) {
        let mut state = self.state();
        if state.pressed {
            return;
        }
        state.pressed = true;
        state.presses += 1;
        if state.edge == Some(Edge::Falling) {
            if let Some(callback) = state.callback.as_mut() {
                callback();
            }
        }
    }

    /// Open the switch.
    pub fn release(&self) {
        self.state().pressed = false;
    }

    /// Close the switch without producing an edge, as if it was already
    /// pressed at power-up.
    pub fn hold_pressed(&self) {
        self.state().pressed = true;
    }

    pub fn is_pressed(&self) -> bool {
        self.state().pressed
    }

    /// Falling edges seen since creation.
    pub fn presses(&self) -> usize {
        self.state().presses
    }

    pub fn registered_edge(&self) -> Option<Edge> {
        self.state().edge
    }

    pub fn registered_debounce(&self) -> Option<Duration> {
        self.state().debounce
    }
}

impl ErrorType for SimSwitch {
    type Error = Infallible;
}

impl InputPin for SimSwitch {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.state().pressed)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state().pressed)
    }
}

impl EdgeInterrupt for SimSwitch {
    type Error = Infallible;

    fn register_edge_interrupt<F>(
        &mut self,
        edge: Edge,
        debounce: Duration,
        callback: F,
    ) -> Result<(), Self::Error>
    where
        F: FnMut() + Send + 'static,
    {
        let mut state = self.state();
        state.edge = Some(edge);
        state.debounce = Some(debounce);
        state.callback = Some(Box::new(callback));
        Ok(())
    }
}

/// Five fresh driver lines plus clones sharing their history.
pub fn sim_pins() -> (DriverPins<SimPin>, DriverPins<SimPin>) {
    let pins = DriverPins {
        step: SimPin::default(),
        dir: SimPin::default(),
        sleep: SimPin::default(),
        ms1: SimPin::default(),
        ms2: SimPin::default(),
    };
    let lines = DriverPins {
        step: pins.step.clone(),
        dir: pins.dir.clone(),
        sleep: pins.sleep.clone(),
        ms1: pins.ms1.clone(),
        ms2: pins.ms2.clone(),
    };
    (pins, lines)
}

pub type SimMotor = StepperMotor<SimPin, PreciseDelay>;

/// Full-step motor with 200 steps/rev at 3600°/s: 2000 steps/s, so one
/// step every millisecond.
pub fn fast_motor() -> (SimMotor, DriverPins<SimPin>) {
    let (pins, lines) = sim_pins();
    let motor = StepperMotor::builder()
        .name("sim")
        .pins(pins)
        .delay(PreciseDelay::new())
        .steps_per_revolution(200)
        .resolution(1)
        .speed(stepper_axis::DegreesPerSec(3600.0))
        .build()
        .expect("simulated motor builds");
    (motor, lines)
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_micros(200));
    }
    condition()
}

pub const GENEROUS: Duration = Duration::from_secs(10);
