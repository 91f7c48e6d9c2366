extern crate cubesat_sim as cubesim;

use approx::assert_abs_diff_eq;
use cubesim::dynamics::{Actuator, Adcs, ControlGains, Sensor};
use cubesim::linalg::{Vector3, Vector4};
use cubesim::utils::normalize_quaternion;
use cubesim::Environment;
use rstest::*;

fn adcs_with(actuators: &[Actuator], gains: ControlGains) -> Adcs {
    Adcs::new(
        &[Sensor::Gyroscope, Sensor::StarTracker],
        actuators,
        gains,
        &Environment::earth(),
    )
    .unwrap()
}

#[rstest]
#[case(Vector4::new(1.0, 0.0, 0.0, 0.0))]
#[case(Vector4::new(1.0, 1.0, 0.0, 0.0))]
#[case(Vector4::new(0.2, -0.4, 0.1, 0.8))]
fn pd_rests_on_target(#[case] target: Vector4<f64>) {
    let gains = ControlGains::builder().target_attitude(target).build();
    let adcs = adcs_with(&[Actuator::ReactionWheel], gains);
    let q = normalize_quaternion(&target).unwrap();
    let torque = adcs.total_torque(&q, &Vector3::zeros());
    assert_abs_diff_eq!(torque, Vector3::zeros(), epsilon = 1e-15);
    // Both quaternions of the same attitude are at rest
    let torque = adcs.total_torque(&-q, &Vector3::zeros());
    assert_abs_diff_eq!(torque, Vector3::zeros(), epsilon = 1e-15);
}

#[test]
fn pd_error_about_z() {
    let adcs = adcs_with(&[Actuator::ReactionWheel], ControlGains::default());
    // Small rotation about +Z: the error quaternion is the opposite rotation
    let angle: f64 = 0.01;
    let q = Vector4::new((angle / 2.0).cos(), 0.0, 0.0, (angle / 2.0).sin());
    let torque = adcs.total_torque(&q, &Vector3::zeros());
    assert_abs_diff_eq!(torque[0], 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(torque[1], 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(torque[2], 0.1 * (angle / 2.0).sin(), epsilon = 1e-15);

    // The damping term alone opposes the rates
    let at_target = Vector4::new(1.0, 0.0, 0.0, 0.0);
    let w = Vector3::new(1e-3, -2e-3, 0.0);
    assert_abs_diff_eq!(
        adcs.total_torque(&at_target, &w),
        Vector3::new(-1e-4, 2e-4, 0.0),
        epsilon = 1e-15
    );
}

#[test]
fn reaction_wheel_saturation() {
    let adcs = adcs_with(&[Actuator::ReactionWheel], ControlGains::default());
    let q = Vector4::new(1.0, 0.0, 0.0, 0.0);
    let torque = adcs.total_torque(&q, &Vector3::new(10.0, -10.0, 10.0));
    assert_eq!(torque, Vector3::new(-1e-3, 1e-3, -1e-3));
}

#[test]
fn bdot_only() {
    let adcs = adcs_with(&[Actuator::Magnetorquer], ControlGains::default());
    let q = Vector4::new(1.0, 0.0, 0.0, 0.0);
    let w = Vector3::new(0.1, 0.2, 0.3);

    assert_eq!(
        adcs.torque_from(Actuator::ReactionWheel, &q, &w),
        Vector3::zeros()
    );
    let torque = adcs.torque_from(Actuator::Magnetorquer, &q, &w);
    assert!(torque.norm() > 0.0);
    let field = Environment::earth().magnetic_field_t;
    assert!(torque.norm() <= 3f64.sqrt() * 0.2 * field.norm());
    // The detumble torque never adds energy
    assert!(torque.dot(&w) <= 0.0);
    assert_eq!(adcs.total_torque(&q, &w), torque);
}

#[test]
fn no_actuator_no_torque() {
    let adcs = adcs_with(&[], ControlGains::default());
    let q = Vector4::new(0.5, 0.5, 0.5, 0.5);
    let w = Vector3::new(0.1, 0.2, 0.3);
    assert!(adcs.laws().is_empty());
    assert_eq!(adcs.total_torque(&q, &w), Vector3::zeros());
}

#[test]
fn superposition() {
    let adcs = adcs_with(
        &[Actuator::ReactionWheel, Actuator::Magnetorquer],
        ControlGains::default(),
    );
    let q = normalize_quaternion(&Vector4::new(0.9, 0.1, -0.2, 0.3)).unwrap();
    let w = Vector3::new(0.001, -0.002, 0.003);
    let total = adcs.total_torque(&q, &w);
    let sum = adcs.torque_from(Actuator::ReactionWheel, &q, &w)
        + adcs.torque_from(Actuator::Magnetorquer, &q, &w);
    assert_abs_diff_eq!(total, sum, epsilon = 1e-18);
}
