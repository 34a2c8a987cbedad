//! Raspberry Pi backend built on `rppal`.
//!
//! Claims the lines named in a [`PinoutConfig`]: driver lines as outputs,
//! the homing switch as an input with the internal pull-up enabled.

use core::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};

use crate::config::PinoutConfig;
use crate::error::{bounded, MotorError, PinRole, Result};
use crate::motor::DriverPins;

use super::{Edge, EdgeInterrupt};

impl EdgeInterrupt for InputPin {
    type Error = rppal::gpio::Error;

    fn register_edge_interrupt<F>(
        &mut self,
        edge: Edge,
        debounce: Duration,
        mut callback: F,
    ) -> core::result::Result<(), Self::Error>
    where
        F: FnMut() + Send + 'static,
    {
        let trigger = match edge {
            Edge::Falling => Trigger::FallingEdge,
            Edge::Rising => Trigger::RisingEdge,
        };
        self.set_async_interrupt(trigger, Some(debounce), move |_event| callback())
    }
}

fn claim(gpio: &Gpio, role: PinRole, line: u8) -> Result<rppal::gpio::Pin> {
    gpio.get(line).map_err(|e| {
        tracing::error!(%role, line, error = %e, "failed to claim GPIO line");
        MotorError::Gpio(bounded(&e)).into()
    })
}

/// Claim the five driver lines as outputs.
pub fn open_driver(gpio: &Gpio, pins: &PinoutConfig) -> Result<DriverPins<OutputPin>> {
    Ok(DriverPins {
        step: claim(gpio, PinRole::Step, pins.step)?.into_output_low(),
        dir: claim(gpio, PinRole::Dir, pins.dir)?.into_output(),
        sleep: claim(gpio, PinRole::Sleep, pins.sleep)?.into_output(),
        ms1: claim(gpio, PinRole::Ms1, pins.ms1)?.into_output(),
        ms2: claim(gpio, PinRole::Ms2, pins.ms2)?.into_output(),
    })
}

/// Claim the homing switch line as a pulled-up input.
pub fn open_homing_switch(gpio: &Gpio, pins: &PinoutConfig) -> Result<InputPin> {
    let line = pins
        .homing_switch
        .ok_or(MotorError::PinError {
            pin: PinRole::HomingSwitch,
        })?;
    Ok(claim(gpio, PinRole::HomingSwitch, line)?.into_input_pullup())
}

/// Open the GPIO peripheral.
pub fn open_gpio() -> Result<Gpio> {
    Gpio::new().map_err(|e| MotorError::Gpio(bounded(&e)).into())
}
