//! # Turntable and camera axis bench test
//!
//! Drives a rotary turntable and a lead-screw camera axis on a Raspberry Pi,
//! both described in a TOML file, then homes the camera axis.
//!
//! # Usage
//!
//! ```bash
//! # Both axes, background stepping, then homing
//! cargo run --example axes --features rppal -- --config axes.toml
//!
//! # Turntable only, blocking rotation at quarter stepping
//! cargo run --example axes --features rppal -- --axis 0 --res 4 --blocking
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use stepper_axis::hal::rppal::{open_driver, open_gpio, open_homing_switch};
use stepper_axis::{
    load_config, Degrees, LinearAxisBuilder, Millimeters, PreciseDelay, StepperMotor,
};

/// Make the turntable and camera steppers move.
#[derive(Parser, Debug)]
#[command(name = "axes")]
#[command(version)]
#[command(long_about = None)]
struct Args {
    /// Motor configuration file.
    #[arg(short, long, default_value = "axes.toml")]
    config: PathBuf,

    /// Name of the rotary motor in the configuration.
    #[arg(long, default_value = "turntable")]
    turntable: String,

    /// Name of the linear axis in the configuration.
    #[arg(long, default_value = "camera")]
    camera: String,

    /// Angle to turn, in degrees.
    #[arg(long, default_value_t = 90.0)]
    angle: f32,

    /// Rotation speed in degrees per second (overrides the file).
    #[arg(long)]
    speed_r: Option<f32>,

    /// Distance for the camera to travel, in millimetres.
    #[arg(long, default_value_t = 10.0)]
    dist: f32,

    /// Translation speed in millimetres per second (overrides the file).
    #[arg(long)]
    speed_t: Option<f32>,

    /// Microstep resolution: 1, 2, 4 or 8 (overrides the file).
    #[arg(long)]
    res: Option<u8>,

    /// Which axis to drive: 0 = turntable, 1 = camera, 2 = both.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=2))]
    axis: u8,

    /// Use blocking `rotate` instead of background targets.
    #[arg(long)]
    blocking: bool,

    /// Skip homing the camera axis at the end.
    #[arg(long)]
    no_home: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let config = load_config(&args.config)?;
    let mut turntable_config = config
        .motor(&args.turntable)
        .ok_or("turntable motor missing from configuration")?
        .clone();
    let mut camera_config = config
        .motor(&args.camera)
        .ok_or("camera axis missing from configuration")?
        .clone();

    if let Some(res) = args.res {
        turntable_config.resolution = res;
        camera_config.resolution = res;
    }
    if args.speed_r.is_some() {
        turntable_config.speed = args.speed_r;
    }
    if args.speed_t.is_some() {
        camera_config.speed = args.speed_t;
    }

    let gpio = open_gpio()?;

    let turntable = StepperMotor::builder()
        .from_motor_config(&turntable_config)
        .pins(open_driver(&gpio, &turntable_config.pins)?)
        .delay(PreciseDelay::new())
        .build()?;

    let camera = LinearAxisBuilder::new(
        StepperMotor::builder()
            .pins(open_driver(&gpio, &camera_config.pins)?)
            .delay(PreciseDelay::new()),
    )
    .from_motor_config(&camera_config)
    .homing_switch(open_homing_switch(&gpio, &camera_config.pins)?)
    .build()?;

    let drive_turntable = args.axis == 0 || args.axis == 2;
    let drive_camera = args.axis == 1 || args.axis == 2;
    let angle = Degrees(args.angle);
    let distance = Millimeters(args.dist);

    thread::sleep(Duration::from_secs(1));

    if args.blocking {
        info!("testing with rotate");
        if drive_turntable {
            turntable.rotate(angle)?;
        }
        if drive_camera {
            camera.rotate(distance)?;
        }
    } else {
        info!("testing with background stepping");
        if drive_turntable {
            turntable.set_target_position(angle);
        }
        if drive_camera {
            camera.set_target_position(distance);
        }

        // stand-in for other work
        while turntable.is_busy() || camera.is_busy() {
            thread::sleep(Duration::from_millis(100));
        }
    }

    info!(
        turntable = turntable.step_count().0,
        camera = camera.step_count().0,
        "moves done"
    );

    if drive_camera && !args.no_home {
        info!("homing camera axis");
        camera.home_with(|phase| info!(?phase, "homing phase"));
    }

    Ok(())
}
