//! Homing sequence against a simulated carriage and limit switch.
//!
//! Geometry: pitch 1, 200 steps/rev, eighth stepping, so 40/9 steps per mm.
//! A watcher thread closes the switch whenever the carriage sits at or above
//! `SWITCH_AT` steps; homing seeks toward increasing step counts.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use stepper_axis::{
    HomingPhase, HomingProfile, LinearAxis, LinearAxisBuilder, Millimeters, MillimetersPerSec,
    PreciseDelay, StepperMotor, Steps,
};

use common::{sim_pins, wait_until, SimPin, SimSwitch, GENEROUS};

type SimAxis = LinearAxis<SimPin, PreciseDelay, SimSwitch>;

const SWITCH_AT: i64 = 10;

/// Fast phases step every 2 ms, the slow seek every 10 ms.
fn quick_profile() -> HomingProfile {
    HomingProfile {
        fast_speed: MillimetersPerSec(225.0),
        slow_speed: MillimetersPerSec(45.0),
        clear_distance: Millimeters(20.0),
        seek_distance: Millimeters(1000.0),
        backoff_distance: Millimeters(5.0),
        slow_seek_distance: Millimeters(20.0),
        poll_interval_ms: 1,
        debounce_ms: 0,
    }
}

fn axis(switch: &SimSwitch) -> (Arc<SimAxis>, SimPin) {
    let (pins, lines) = sim_pins();
    let axis = LinearAxisBuilder::new(
        StepperMotor::builder()
            .name("carriage")
            .pins(pins)
            .delay(PreciseDelay::new()),
    )
    .screw_pitch(1.0)
    .homing_switch(switch.clone())
    .homing(quick_profile())
    .speed(MillimetersPerSec(225.0))
    .build()
    .expect("simulated axis builds");
    (Arc::new(axis), lines.step)
}

/// Keeps the switch in step with the carriage position until stopped.
struct Watcher {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Watcher {
    fn spawn(axis: Arc<SimAxis>, switch: SimSwitch) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                let closed = axis.step_count().0 >= SWITCH_AT;
                if closed && !switch.is_pressed() {
                    switch.press();
                } else if !closed && switch.is_pressed() {
                    switch.release();
                }
                thread::sleep(Duration::from_micros(50));
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    phase: HomingPhase,
    presses: usize,
    step_count: i64,
}

/// Run `home_with` on a worker thread and collect what it reports.
fn run_homing(axis: &Arc<SimAxis>, switch: &SimSwitch) -> Vec<Observation> {
    let (tx, rx) = mpsc::channel();
    let worker = {
        let axis = Arc::clone(axis);
        let switch = switch.clone();
        thread::spawn(move || {
            let mut seen = Vec::new();
            axis.home_with(|phase| {
                seen.push(Observation {
                    phase,
                    presses: switch.presses(),
                    step_count: axis.step_count().0,
                })
            });
            tx.send(seen).ok();
        })
    };

    let seen = rx
        .recv_timeout(Duration::from_secs(30))
        .expect("homing did not finish");
    worker.join().unwrap();
    seen
}

fn phases(seen: &[Observation]) -> Vec<HomingPhase> {
    seen.iter().map(|o| o.phase).collect()
}

#[test]
fn homing_runs_phases_in_order() {
    let switch = SimSwitch::default();
    let (axis, _step) = axis(&switch);
    let _watcher = Watcher::spawn(Arc::clone(&axis), switch.clone());

    let seen = run_homing(&axis, &switch);

    assert_eq!(
        phases(&seen),
        vec![
            HomingPhase::SeekClear,
            HomingPhase::SeekFast,
            HomingPhase::Backoff,
            HomingPhase::SeekSlow,
            HomingPhase::Done,
        ]
    );

    // clearing moved away from the switch before the fast seek began:
    // 20 mm at 40/9 steps/mm is 88 steps
    assert_eq!(seen[1].step_count, -88);
    assert_eq!(seen[1].presses, 0);
    // backoff starts only once the fast seek hit the switch
    assert_eq!(seen[2].presses, 1);
    assert!(seen[2].step_count >= SWITCH_AT);
    // the slow seek starts below the switch after backing off
    assert!(seen[3].step_count < SWITCH_AT);
    assert_eq!(seen[4].presses, 2);
}

#[test]
fn homing_stops_at_switch_and_clears_flag() {
    let switch = SimSwitch::default();
    let (axis, _step) = axis(&switch);
    let _watcher = Watcher::spawn(Arc::clone(&axis), switch.clone());

    run_homing(&axis, &switch);

    assert!(!axis.is_busy());
    assert!(!axis.at_home());
    assert_eq!(axis.motor().target_steps(), Steps(0));
    assert!(axis.step_count().0 >= SWITCH_AT);
    assert!(axis.switch_pressed().unwrap());
    // the sequence leaves the axis at the slow speed
    assert!((axis.speed().0 - 45.0).abs() < 0.5);
}

#[test]
fn homing_clears_switch_already_pressed() {
    let switch = SimSwitch::default();
    let (axis, _step) = axis(&switch);

    // carriage starts parked on the switch
    switch.hold_pressed();
    let carriage_offset = 20;
    axis.motor().set_target_position(stepper_axis::Degrees(-4.5));
    assert!(wait_until(GENEROUS, || !axis.is_busy()));
    assert_eq!(axis.step_count(), Steps(carriage_offset));

    let _watcher = Watcher::spawn(Arc::clone(&axis), switch.clone());
    let seen = run_homing(&axis, &switch);

    assert_eq!(phases(&seen).len(), 5);
    // 88 steps away from the start leaves the switch open
    assert_eq!(seen[1].step_count, carriage_offset - 88);
    assert!(seen[1].step_count < SWITCH_AT);
    // the fast seek still waits for a fresh edge
    assert_eq!(seen[2].presses, 1);
    assert!(!axis.at_home());
    assert!(axis.step_count().0 >= SWITCH_AT);
}

#[test]
fn stale_edge_before_homing_is_ignored() {
    let switch = SimSwitch::default();
    let (axis, _step) = axis(&switch);

    // a glitch raises the flag while the axis is idle
    switch.press();
    switch.release();
    assert!(axis.at_home());

    let _watcher = Watcher::spawn(Arc::clone(&axis), switch.clone());
    let seen = run_homing(&axis, &switch);

    assert_eq!(seen[2].presses, 2);
    assert!(seen[2].step_count >= SWITCH_AT);
    assert!(!axis.at_home());
}

#[test]
fn linear_moves_convert_through_pitch() {
    let switch = SimSwitch::default();
    let (axis, step) = axis(&switch);

    axis.set_target_position(Millimeters(9.0));
    assert!(wait_until(GENEROUS, || !axis.is_busy()));
    assert_eq!(axis.step_count(), Steps(-40));

    axis.rotate(Millimeters(-9.0)).unwrap();
    assert_eq!(axis.step_count(), Steps(0));
    assert_eq!(step.rising_edges(), 80);
}

#[test]
fn linear_speed_round_trips() {
    let switch = SimSwitch::default();
    let (axis, _step) = axis(&switch);

    axis.set_speed(MillimetersPerSec(90.0));
    // 90 mm/s at pitch 1 is 400 steps/s
    assert!((axis.motor().step_time() - 0.0025).abs() < 1e-12);
    assert!((axis.speed().0 - 90.0).abs() < 1e-3);
}
