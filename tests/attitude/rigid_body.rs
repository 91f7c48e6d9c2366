extern crate cubesat_sim as cubesim;

use approx::assert_relative_eq;
use cubesim::dynamics::{Actuator, Adcs, ControlGains, SpacecraftDynamics};
use cubesim::linalg::Vector3;
use cubesim::propagators::Propagator;
use cubesim::time::Unit;
use cubesim::{Environment, PhysicalProperties, Spacecraft};
use rstest::*;

use crate::{cubesat, init_logger};

/// Asymmetric body tumbling about all three axes
#[fixture]
fn tumbling() -> Spacecraft {
    let props = PhysicalProperties::from_principal_moments(
        1.33,
        Vector3::new(0.1, 0.1, 0.1),
        Vector3::new(0.01, 0.015, 0.02),
    )
    .unwrap();
    let mut sc = cubesat();
    sc.props = props;
    sc.angular_velocity_rad_s = Vector3::new(0.1, 0.05, 0.02);
    sc
}

#[rstest]
fn torque_free_conservation(tumbling: Spacecraft) {
    init_logger();
    let env = Environment::earth();
    let setup = Propagator::default(SpacecraftDynamics::torque_free(&env));
    let mut prop = setup.with(tumbling);
    let final_state = prop.for_duration(10 * Unit::Minute).unwrap();

    // The rates do change, but neither the momentum magnitude nor the energy
    assert!((final_state.angular_velocity_rad_s - tumbling.angular_velocity_rad_s).norm() > 1e-4);
    assert_relative_eq!(
        final_state.angular_momentum().norm(),
        tumbling.angular_momentum().norm(),
        max_relative = 1e-6
    );
    assert_relative_eq!(
        final_state.rotational_energy_j(),
        tumbling.rotational_energy_j(),
        max_relative = 1e-6
    );
    assert!((final_state.attitude.norm() - 1.0).abs() < 1e-12);
}

#[rstest]
fn detumble_dissipates(tumbling: Spacecraft) {
    init_logger();
    let env = Environment::earth();
    let adcs = Adcs::new(&[], &[Actuator::Magnetorquer], ControlGains::default(), &env).unwrap();
    let setup = Propagator::default(SpacecraftDynamics::from_environment(&env, adcs));
    let mut prop = setup.with(tumbling);
    let final_state = prop.for_duration(10 * Unit::Minute).unwrap();

    assert!(final_state.rotational_energy_j() < tumbling.rotational_energy_j());
}
