//! GPIO capability consumed by the motor core.
//!
//! Output lines and delays come from embedded-hal 1.0 (`OutputPin`,
//! `InputPin`, `DelayNs`); a HAL configures a line by handing over a typed
//! pin. embedded-hal has no callback-style interrupt trait, so the homing
//! switch additionally implements [`EdgeInterrupt`].

use core::time::Duration;

#[cfg(feature = "rppal")]
pub mod rppal;

/// Signal edge that fires an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// High to low transition.
    Falling,
    /// Low to high transition.
    Rising,
}

/// Input line that can run a callback on a signal edge.
///
/// The callback runs on the backend's interrupt thread. It must be short and
/// must not block; the motor core only ever stores into an atomic flag.
pub trait EdgeInterrupt {
    /// Backend error type.
    type Error: core::fmt::Debug;

    /// Register `callback` for `edge`, ignoring further edges for `debounce`
    /// after each one. Replaces any callback registered before.
    fn register_edge_interrupt<F>(
        &mut self,
        edge: Edge,
        debounce: Duration,
        callback: F,
    ) -> Result<(), Self::Error>
    where
        F: FnMut() + Send + 'static;
}

/// `DelayNs` backed by a spin-sleep hybrid: the OS sleeps for most of the
/// interval and a short spin finishes it, keeping pulse phases accurate
/// without burning a core for the whole hold.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct PreciseDelay {
    sleeper: spin_sleep::SpinSleeper,
}

#[cfg(feature = "std")]
impl PreciseDelay {
    /// Create a delay with the default spin-sleep accuracy.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "std")]
impl embedded_hal::delay::DelayNs for PreciseDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.sleeper.sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_us(&mut self, us: u32) {
        self.sleeper.sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeper.sleep(Duration::from_millis(ms as u64));
    }
}
