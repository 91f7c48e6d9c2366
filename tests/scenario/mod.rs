extern crate cubesat_sim as cubesim;

use cubesim::dynamics::{Actuator, Sensor};
use cubesim::io::{ConfigError, ConfigRepr, ScenarioConfig};
use cubesim::linalg::{Vector3, Vector4};
use cubesim::propagators::IntegratorKind;
use cubesim::time::Unit;
use std::path::PathBuf;

use crate::init_logger;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

#[test]
fn load_sample_scenario() {
    init_logger();
    let scenario = ScenarioConfig::load(data_path("cubesat_1u.yaml")).unwrap();

    assert_eq!(scenario.ground_stations.len(), 1);
    assert_eq!(scenario.ground_stations[0].name, "GS1");
    assert_eq!(scenario.ground_stations[0].location(), (0.0, 0.0, 0.0));

    let sim = scenario.simulator().unwrap();
    assert_eq!(sim.spacecraft.time, 0 * Unit::Second);
    assert_eq!(sim.spacecraft.props.mass_kg, 1.33);
    assert_eq!(sim.spacecraft.radius_m, Vector3::new(7_000e3, 0.0, 0.0));
    assert_eq!(sim.spacecraft.velocity_m_s, Vector3::new(0.0, 7_500.0, 0.0));
    assert_eq!(sim.spacecraft.attitude, Vector4::new(1.0, 0.0, 0.0, 0.0));
    assert_eq!(
        sim.spacecraft.angular_velocity_rad_s,
        Vector3::new(0.1, 0.0, 0.0)
    );
    assert_eq!(sim.spacecraft.props.inertia()[(2, 2)], 0.02);

    let adcs = &sim.dynamics.adcs;
    assert_eq!(adcs.actuators(), &[Actuator::ReactionWheel, Actuator::Magnetorquer]);
    assert_eq!(adcs.sensors(), &[Sensor::SunSensor, Sensor::Magnetometer]);
    assert_eq!(adcs.laws().len(), 2);
    assert_eq!(adcs.gains().kmt, 100.0);
    assert_eq!(sim.method, IntegratorKind::Dormand45);

    assert_eq!(sim.run.time_step, 10 * Unit::Second);
    assert_eq!(sim.run.num_samples(), 360);
}

#[test]
fn missing_file() {
    let err = ScenarioConfig::load(data_path("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }), "{err}");
}

#[test]
fn missing_section() {
    let err = ScenarioConfig::loads(
        "
spacecraft:
  mass_kg: 1.0
  dimensions_m: [0.1, 0.1, 0.1]
  inertia_kg_m2: [[0.01, 0.0, 0.0], [0.0, 0.01, 0.0], [0.0, 0.0, 0.01]]
run:
  time_step_s: 1.0
  total_duration_s: 10.0
",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }), "{err}");
}
