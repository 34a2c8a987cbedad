//! Property tests for unit conversion and direction conventions.

use proptest::prelude::*;

use stepper_axis::{
    Degrees, DegreesPerSec, Direction, LeadScrew, Millimeters, Resolution, Steps, UnitConverter,
};

fn resolution() -> impl Strategy<Value = Resolution> {
    prop::sample::select(Resolution::VALID_VALUES.to_vec())
        .prop_map(|value| Resolution::new(value).unwrap())
}

fn converter() -> impl Strategy<Value = UnitConverter> {
    (1u16..=400, resolution()).prop_map(|(spr, res)| UnitConverter::new(spr, res))
}

proptest! {
    #[test]
    fn deg_to_step_truncates_toward_zero(conv in converter(), angle in -3600.0f32..3600.0) {
        let raw = angle as f64 * conv.steps_per_degree();
        let steps = conv.deg_to_step(Degrees(angle)).0;

        prop_assert!(steps == 0 || steps.signum() as f64 == raw.signum());
        // never rounds away from zero beyond one f32 ulp of the input
        let noise = f32::EPSILON as f64 * raw.abs().max(1.0);
        prop_assert!((steps.unsigned_abs() as f64) <= raw.abs() + noise);
        prop_assert!(raw.abs() - (steps.unsigned_abs() as f64) < 1.0);
    }

    #[test]
    fn fractions_above_float_noise_truncate(
        conv in converter(),
        whole in 1i64..200_000,
        fraction in 0.01f64..0.99,
    ) {
        let raw = whole as f64 + fraction;
        let angle = (raw / conv.steps_per_degree()) as f32;
        let actual = angle as f64 * conv.steps_per_degree();
        // the f32 angle may not land on the intended fraction; skip near misses
        prop_assume!((actual - actual.round()).abs() > 2.0 * f32::EPSILON as f64 * actual);
        prop_assert_eq!(conv.deg_to_step(Degrees(angle)).0, actual.trunc() as i64);
    }

    #[test]
    fn whole_steps_survive_a_round_trip(conv in converter(), steps in -100_000i64..100_000) {
        let angle = conv.step_to_deg(Steps(steps));
        prop_assert_eq!(conv.deg_to_step(angle), Steps(steps));
    }

    #[test]
    fn deg_to_step_is_odd(conv in converter(), angle in 0.0f32..3600.0) {
        let forward = conv.deg_to_step(Degrees(angle));
        let backward = conv.deg_to_step(Degrees(-angle));
        prop_assert_eq!(forward.0, -backward.0);
    }

    #[test]
    fn step_time_is_always_usable(conv in converter(), speed in -10_000.0f32..10_000.0) {
        let step_time = conv.step_time(DegreesPerSec(speed));
        prop_assert!(step_time.is_finite());
        prop_assert!(step_time > 0.0 && step_time <= 1.0);
    }

    #[test]
    fn speed_inverts_step_time(conv in converter(), speed in 1.0f32..10_000.0) {
        let steps_per_sec = conv.deg_to_step(Degrees(speed)).0;
        prop_assume!(steps_per_sec >= 1);

        let recovered = conv.speed(conv.step_time(DegreesPerSec(speed))).0 as f64;
        let one_step = 1.0 / conv.steps_per_degree();
        // quantised down by less than one step's worth of speed
        prop_assert!(recovered <= speed as f64 * (1.0 + 1e-5) + 1e-6);
        prop_assert!(speed as f64 - recovered < one_step + 1e-3);
    }

    #[test]
    fn lead_screw_round_trips(pitch in 0.1f32..20.0, distance in -500.0f32..500.0) {
        let screw = LeadScrew::new(pitch);
        let back = screw.angle_to_distance(screw.distance_to_angle(Millimeters(distance)));
        prop_assert!((back.0 - distance).abs() <= 1e-4 * distance.abs().max(1.0));
    }

    #[test]
    fn positive_targets_count_down(target in any::<i64>().prop_filter("non-zero", |t| *t != 0)) {
        let direction = Direction::for_target(target);
        prop_assert_eq!(direction.sign(), -target.signum());
        prop_assert_eq!(direction.is_clockwise(), target < 0);
    }

    #[test]
    fn any_resolution_value_selects_a_supported_mode(value in any::<u8>()) {
        let resolution = Resolution::or_fallback(value);
        prop_assert!(Resolution::VALID_VALUES.contains(&resolution.value()));
        if !Resolution::VALID_VALUES.contains(&value) {
            prop_assert_eq!(resolution, Resolution::EIGHTH);
        }
    }
}
