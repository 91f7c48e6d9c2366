extern crate cubesat_sim as cubesim;

use approx::assert_relative_eq;
use cubesim::dynamics::SpacecraftDynamics;
use cubesim::linalg::{Vector3, Vector4};
use cubesim::propagators::*;
use cubesim::time::Unit;
use cubesim::{Environment, Spacecraft};
use rstest::*;

use crate::{cubesat, cubesat_props, init_logger};

#[fixture]
fn earth() -> Environment {
    Environment::earth()
}

/// Non rotating spacecraft on a circular orbit of 7000 km.
fn circular(env: &Environment) -> Spacecraft {
    let radius_m = 7_000e3;
    Spacecraft::new(
        cubesat_props(),
        Vector3::new(radius_m, 0.0, 0.0),
        Vector3::new(0.0, env.circular_velocity_m_s(radius_m), 0.0),
        Vector4::new(1.0, 0.0, 0.0, 0.0),
        Vector3::zeros(),
    )
}

#[rstest]
fn circular_revolution(earth: Environment) {
    init_logger();
    let init = circular(&earth);
    let period_s = earth.circular_period_s(init.rmag_m());
    assert!((period_s - 5_828.6).abs() < 0.1);

    let setup = Propagator::default(SpacecraftDynamics::torque_free(&earth));
    let mut prop = setup.with(init);
    let final_state = prop.for_duration(period_s * Unit::Second).unwrap();

    assert_eq!(final_state.time, period_s * Unit::Second);
    let err_m = (final_state.radius_m - init.radius_m).norm();
    assert!(
        err_m < 0.01 * init.rmag_m(),
        "returned {err_m} m away from the initial position"
    );
    assert_relative_eq!(
        final_state.specific_energy(earth.gm_m3_s2),
        init.specific_energy(earth.gm_m3_s2),
        max_relative = 1e-6
    );
    // Torque free and not rotating: the attitude is untouched
    assert_eq!(final_state.attitude, init.attitude);
    assert_eq!(final_state.angular_velocity_rad_s, Vector3::zeros());
}

#[rstest]
fn eccentric_revolution(earth: Environment) {
    init_logger();
    let init = cubesat();
    // The initial velocity is below the circular velocity, so the initial position is the apoapsis
    let period_s = init.period_s(earth.gm_m3_s2);
    assert!(period_s < earth.circular_period_s(init.rmag_m()));
    assert!(init.sma_m(earth.gm_m3_s2) < init.rmag_m());

    let setup = Propagator::default(SpacecraftDynamics::torque_free(&earth));
    let mut prop = setup.with(init);
    let final_state = prop.for_duration(period_s * Unit::Second).unwrap();

    let err_m = (final_state.radius_m - init.radius_m).norm();
    assert!(
        err_m < 0.01 * init.rmag_m(),
        "returned {err_m} m away from the initial position"
    );
    assert_relative_eq!(
        final_state.sma_m(earth.gm_m3_s2),
        init.sma_m(earth.gm_m3_s2),
        max_relative = 1e-6
    );
    assert!(prop.steps_taken > 0);
}

#[rstest]
fn back_propagation(earth: Environment) {
    init_logger();
    let init = cubesat();
    let setup = Propagator::default(SpacecraftDynamics::torque_free(&earth));
    let mut prop = setup.with(init);

    let half_hour = 30 * Unit::Minute;
    let midpoint = prop.for_duration(half_hour).unwrap();
    assert_eq!(midpoint.time, half_hour);
    assert!((midpoint.radius_m - init.radius_m).norm() > 1_000e3);

    let back = prop.for_duration(-half_hour).unwrap();
    assert_eq!(back.time, 0 * Unit::Second);
    let err_m = (back.radius_m - init.radius_m).norm();
    let err_m_s = (back.velocity_m_s - init.velocity_m_s).norm();
    assert!(err_m < 10.0, "position error {err_m} m");
    assert!(err_m_s < 1e-2, "velocity error {err_m_s} m/s");

    // `until` lands on the requested time as well
    let again = prop.until(half_hour).unwrap();
    assert_eq!(again.time, half_hour);
    assert!((again.radius_m - midpoint.radius_m).norm() < 10.0);
}

#[rstest]
fn methods_agree(earth: Environment) {
    init_logger();
    let init = cubesat();
    let dynamics = SpacecraftDynamics::torque_free(&earth);
    let prop_time = 10 * Unit::Minute;

    let mut finals = Vec::new();
    for setup in [
        Propagator::dp45(dynamics.clone(), PropOpts::default()),
        Propagator::rkf45(dynamics.clone(), PropOpts::default()),
        Propagator::cash_karp45(dynamics.clone(), PropOpts::default()),
        Propagator::rk4(dynamics.clone(), 1 * Unit::Second),
    ] {
        let mut prop = setup.with(init);
        let final_state = prop.for_duration(prop_time).unwrap();
        assert_eq!(final_state.time, prop_time);
        finals.push(final_state);
    }

    let reference = finals[0];
    for (i, other) in finals.iter().enumerate().skip(1) {
        let err_m = (other.radius_m - reference.radius_m).norm();
        assert!(err_m < 1.0, "method #{i} differs by {err_m} m");
        let att_err = (other.attitude - reference.attitude).norm();
        assert!(att_err < 1e-4, "method #{i} attitude differs by {att_err}");
    }
}

#[test]
fn fixed_step_details() {
    init_logger();
    let earth = Environment::earth();
    let setup = Propagator::rk4(SpacecraftDynamics::torque_free(&earth), 2 * Unit::Second);
    assert!(!setup.is_embedded());
    let mut prop = setup.with(cubesat());
    prop.for_duration(1 * Unit::Minute).unwrap();
    assert_eq!(prop.steps_taken, 30);
    let details = prop.latest_details();
    assert_eq!(details.step, 2 * Unit::Second);
    assert_eq!(details.error, 0.0);
}

#[test]
fn step_budget() {
    init_logger();
    let earth = Environment::earth();
    let mut opts = PropOpts::with_fixed_step(1 * Unit::Second);
    opts.max_steps = 5;
    let setup = Propagator::dp45(SpacecraftDynamics::torque_free(&earth), opts);
    let mut prop = setup.with(cubesat());
    let err = prop.for_duration(1 * Unit::Minute).unwrap_err();
    assert_eq!(
        err,
        PropagationError::StepBudgetExhausted {
            max_steps: 5,
            time: 5 * Unit::Second,
        }
    );
    // The instance keeps the last state reached
    assert_eq!(prop.state.time, 5 * Unit::Second);
}

#[test]
fn singular_gravity() {
    init_logger();
    let earth = Environment::earth();
    let at_center = cubesat().with_orbit(Vector3::zeros(), Vector3::new(0.0, 7_500.0, 0.0));
    let setup = Propagator::default(SpacecraftDynamics::torque_free(&earth));
    let mut prop = setup.with(at_center);
    let err = prop.for_duration(1 * Unit::Minute).unwrap_err();
    assert!(matches!(err, PropagationError::Dynamics { .. }), "{err}");
    assert_eq!(prop.state.time, 0 * Unit::Second);
}

#[test]
fn tolerance_at_min_step() {
    init_logger();
    let earth = Environment::earth();
    let mut opts = PropOpts::with_tolerance(1e-30);
    opts.set_min_step(1 * Unit::Second);
    opts.attempts = 3;
    let setup = Propagator::dp45(SpacecraftDynamics::torque_free(&earth), opts);
    let init = cubesat();
    let mut prop = setup.with(init);
    let err = prop.for_duration(1 * Unit::Minute).unwrap_err();
    assert!(
        matches!(err, PropagationError::ToleranceNotMet { time, .. } if time == 0 * Unit::Second),
        "{err}"
    );
    // The rejected step is not applied
    assert_eq!(prop.steps_taken, 0);
    assert_eq!(prop.state, init);
    assert!(prop.latest_details().error > 1e-30);
}
