extern crate cubesat_sim as cubesim;

use cubesim::dynamics::{Actuator, Adcs, ControlGains, Sensor, SpacecraftDynamics};
use cubesim::md::{RunConfig, Simulator};
use cubesim::propagators::{IntegratorKind, PropOpts, PropagationError, RSSSpacecraftStep};
use cubesim::time::Unit;
use cubesim::{Environment, SimError};
use rstest::*;

use crate::{cubesat, init_logger};

#[fixture]
fn full_adcs() -> SpacecraftDynamics {
    let env = Environment::earth();
    let adcs = Adcs::new(
        &[Sensor::SunSensor, Sensor::Magnetometer],
        &[Actuator::ReactionWheel, Actuator::Magnetorquer],
        ControlGains::default(),
        &env,
    )
    .unwrap();
    SpacecraftDynamics::from_environment(&env, adcs)
}

#[rstest]
fn one_hour_run(full_adcs: SpacecraftDynamics) {
    init_logger();
    let run = RunConfig::from_seconds(10.0, 3600.0).unwrap();
    let mut sim = Simulator::new(cubesat(), full_adcs, run).unwrap();
    let traj = sim.run().unwrap();

    assert_eq!(traj.len(), 360);
    let times = traj.times_s();
    assert_eq!(times[0], 0.0);
    assert_eq!(times[359], 3590.0);
    assert!(times.windows(2).all(|w| w[1] > w[0]));

    for sample in &traj {
        assert!((sample.attitude.norm() - 1.0).abs() < 1e-12, "{sample}");
        let rmag_km = sample.position_m.norm() * 1e-3;
        assert!(rmag_km > 6_800.0 && rmag_km < 7_001.0, "{sample}");
    }

    // Reaction wheel torques are bounded, so the rates stay bounded too
    let last = traj.last().unwrap();
    assert!(traj
        .iter()
        .all(|s| s.angular_velocity_rad_s.norm() < 1.0));

    // The spacecraft is left at the last sample
    assert_eq!(sim.spacecraft.time, 3590 * Unit::Second);
    assert_eq!(sim.spacecraft.radius_m, last.position_m);
}

#[test]
fn truncated_run() {
    init_logger();
    let env = Environment::earth();
    let run = RunConfig::from_seconds(10.0, 100.0).unwrap();
    let mut opts = PropOpts::with_fixed_step(1 * Unit::Second);
    opts.max_steps = 25;
    let mut sim =
        Simulator::with_opts(cubesat(), SpacecraftDynamics::torque_free(&env), run, opts).unwrap();

    let err = sim.run().unwrap_err();
    let partial = err.partial_trajectory().unwrap();
    // Samples at 0, 10 and 20 seconds, then the budget is exhausted on the way to 30 seconds
    assert_eq!(partial.times_s(), vec![0.0, 10.0, 20.0]);
    match &err {
        SimError::IntegrationFailure { source, .. } => assert_eq!(
            source,
            &PropagationError::StepBudgetExhausted {
                max_steps: 25,
                time: 25 * Unit::Second,
            }
        ),
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(sim.spacecraft.time, 20 * Unit::Second);
}

#[test]
fn passive_run_keeps_spinning() {
    init_logger();
    let env = Environment::earth();
    let run = RunConfig::from_seconds(60.0, 600.0).unwrap();
    let mut sim = Simulator::new(cubesat(), SpacecraftDynamics::torque_free(&env), run).unwrap();
    let traj = sim.run().unwrap();
    assert_eq!(traj.len(), 10);
    for sample in &traj {
        // Spin about a principal axis is steady
        assert!((sample.angular_velocity_rad_s[0] - 0.1).abs() < 1e-12);
        assert!(sample.angular_velocity_rad_s[1].abs() < 1e-12);
        assert!(sample.angular_velocity_rad_s[2].abs() < 1e-12);
    }
}

#[test]
fn tolerance_out_of_reach() {
    init_logger();
    let env = Environment::earth();
    let run = RunConfig::from_seconds(10.0, 100.0).unwrap();
    let mut opts = PropOpts::with_tolerance(1e-30);
    opts.set_min_step(5 * Unit::Second);
    let init = cubesat();
    let mut sim =
        Simulator::with_opts(init, SpacecraftDynamics::torque_free(&env), run, opts).unwrap();

    let err = sim.run().unwrap_err();
    // Only the initial conditions are recorded: the very first step cannot meet the tolerance
    let partial = err.partial_trajectory().unwrap();
    assert_eq!(partial.times_s(), vec![0.0]);
    match &err {
        SimError::IntegrationFailure {
            source:
                PropagationError::ToleranceNotMet {
                    error,
                    tolerance,
                    time,
                },
            ..
        } => {
            assert!(*error > *tolerance, "{err}");
            assert_eq!(*tolerance, 1e-30);
            assert_eq!(*time, 0 * Unit::Second);
        }
        other => panic!("unexpected error {other}"),
    }
    // The spacecraft is left untouched
    assert_eq!(sim.spacecraft, init);
}

#[test]
fn diverging_run() {
    init_logger();
    let env = Environment::earth();
    // Rate damping far too stiff for a one second RK4 step: the rate is amplified at each step until it overflows
    let gains = ControlGains::builder()
        .kp(0.0)
        .kd(0.5)
        .max_rw_torque_n_m(f64::MAX)
        .build();
    let adcs = Adcs::new(&[Sensor::Magnetometer], &[Actuator::ReactionWheel], gains, &env).unwrap();
    let dynamics = SpacecraftDynamics::from_environment(&env, adcs);
    let run = RunConfig::from_seconds(10.0, 100.0).unwrap();
    let mut sim = Simulator::with_opts(cubesat(), dynamics, run, PropOpts::with_fixed_step_s(1.0))
        .unwrap()
        .with_method(IntegratorKind::Rk4);

    let err = sim.run().unwrap_err();
    let partial = err.partial_trajectory().unwrap();
    assert_eq!(partial.times_s(), vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    for sample in partial {
        assert!(sample.angular_velocity_rad_s.iter().all(|w| w.is_finite()));
        assert!((sample.attitude.norm() - 1.0).abs() < 1e-12, "{sample}");
    }
    // Diverging, and still spinning about X only
    let last = partial.last().unwrap();
    assert!(last.angular_velocity_rad_s[0].abs() > 1e100);
    assert_eq!(last.angular_velocity_rad_s[1], 0.0);
    assert_eq!(last.angular_velocity_rad_s[2], 0.0);

    match &err {
        SimError::IntegrationFailure { source, .. } => assert!(
            matches!(
                source,
                PropagationError::NonFiniteState { time } if *time == 57 * Unit::Second
            ) || matches!(source, PropagationError::Dynamics { .. }),
            "unexpected cause {source}"
        ),
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(sim.spacecraft.time, 50 * Unit::Second);
    assert_eq!(sim.spacecraft.angular_velocity_rad_s, last.angular_velocity_rad_s);
    assert_eq!(sim.spacecraft.radius_m, last.position_m);
}

#[rstest]
#[case::fehlberg(IntegratorKind::Fehlberg45, PropOpts::default())]
#[case::cash_karp(IntegratorKind::CashKarp45, PropOpts::default())]
#[case::rk4(IntegratorKind::Rk4, PropOpts::with_fixed_step_s(1.0))]
fn selected_method(#[case] method: IntegratorKind, #[case] opts: PropOpts<RSSSpacecraftStep>) {
    init_logger();
    let env = Environment::earth();
    let run = RunConfig::from_seconds(60.0, 600.0).unwrap();
    let dynamics = SpacecraftDynamics::torque_free(&env);

    let reference = Simulator::new(cubesat(), dynamics.clone(), run)
        .unwrap()
        .run()
        .unwrap();
    let mut sim = Simulator::with_opts(cubesat(), dynamics, run, opts)
        .unwrap()
        .with_method(method);
    assert_eq!(sim.method, method);
    let traj = sim.run().unwrap();

    assert_eq!(traj.times_s(), reference.times_s());
    for (sample, expected) in traj.iter().zip(reference.iter()) {
        let err_m = (sample.position_m - expected.position_m).norm();
        assert!(err_m < 1.0, "{method}: {err_m} m at {sample}");
        let att_err = (sample.attitude - expected.attitude).norm();
        assert!(att_err < 1e-4, "{method}: attitude differs by {att_err} at {sample}");
    }
}
