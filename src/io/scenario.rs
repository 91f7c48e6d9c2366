/*
    CubeSat-Sim, small spacecraft orbit and attitude propagation
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{ConfigError, ConfigRepr};
use crate::cosmic::{Environment, GroundStation, PhysicalProperties, Spacecraft, EARTH_RADIUS_M};
use crate::dynamics::{Actuator, Adcs, ControlGains, Sensor, SpacecraftDynamics};
use crate::linalg::{Matrix3, Vector3, Vector4};
use crate::md::{RunConfig, Simulator};
use crate::propagators::{IntegratorKind, PropOpts, RSSSpacecraftStep};
use crate::time::{Duration, Unit};
use serde_derive::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpacecraftConfig {
    pub mass_kg: f64,
    pub dimensions_m: [f64; 3],
    /// Rows of the inertia tensor in the body frame
    pub inertia_kg_m2: [[f64; 3]; 3],
}

impl SpacecraftConfig {
    pub fn properties(&self) -> Result<PhysicalProperties, ConfigError> {
        let i = &self.inertia_kg_m2;
        let inertia = Matrix3::new(
            i[0][0], i[0][1], i[0][2], i[1][0], i[1][1], i[1][2], i[2][0], i[2][1], i[2][2],
        );
        PhysicalProperties::new(self.mass_kg, Vector3::from(self.dimensions_m), inertia)
    }
}

fn identity_attitude() -> [f64; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialState {
    pub position_m: [f64; 3],
    pub velocity_m_s: [f64; 3],
    /// Scalar first quaternion, normalized upon setup
    #[serde(default = "identity_attitude")]
    pub attitude: [f64; 4],
    #[serde(default)]
    pub angular_velocity_rad_s: [f64; 3],
}

/// Overrides of the default control gains
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GainsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kmt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rw_torque_n_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dipole_a_m2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_attitude: Option<[f64; 4]>,
}

impl GainsConfig {
    pub fn gains(&self) -> Result<ControlGains, ConfigError> {
        let mut gains = ControlGains::default();
        if let Some(kp) = self.kp {
            gains.kp = kp;
        }
        if let Some(kd) = self.kd {
            gains.kd = kd;
        }
        if let Some(kmt) = self.kmt {
            gains.kmt = kmt;
        }
        if let Some(max_torque) = self.max_rw_torque_n_m {
            gains.max_rw_torque_n_m = max_torque;
        }
        if let Some(max_dipole) = self.max_dipole_a_m2 {
            gains.max_dipole_a_m2 = max_dipole;
        }
        if let Some(target) = self.target_attitude {
            gains.target_attitude = Vector4::from(target);
        }
        gains.validate()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdcsConfig {
    #[serde(default)]
    pub sensors: Vec<Sensor>,
    #[serde(default)]
    pub actuators: Vec<Actuator>,
    #[serde(default)]
    pub gains: GainsConfig,
}

/// Overrides of the Earth environment
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gm_m3_s2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnetic_field_t: Option<[f64; 3]>,
}

impl EnvironmentConfig {
    pub fn environment(&self) -> Result<Environment, ConfigError> {
        let earth = Environment::earth();
        Environment::new(
            self.gm_m3_s2.unwrap_or(earth.gm_m3_s2),
            self.magnetic_field_t
                .map_or(earth.magnetic_field_t, Vector3::from),
        )
    }

    /// Mean radius of the central body, only known for the Earth, i.e. when the gravitational parameter is not overridden.
    pub fn body_radius_m(&self) -> Option<f64> {
        match self.gm_m3_s2 {
            None => Some(EARTH_RADIUS_M),
            Some(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    pub time_step_s: f64,
    pub total_duration_s: f64,
}

/// Overrides of the default propagator options. A fixed step disables the adaptive step entirely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropagatorConfig {
    /// Dormand Prince 4-5 unless specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<IntegratorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_step_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_step_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_step_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_step_s: Option<f64>,
}

fn positive_duration(name: &str, seconds: f64) -> Result<Duration, ConfigError> {
    if seconds > 0.0 && seconds.is_finite() {
        Ok(seconds * Unit::Second)
    } else {
        Err(ConfigError::InvalidConfig {
            msg: format!("{name} must be strictly positive, got {seconds} s"),
        })
    }
}

impl PropagatorConfig {
    pub fn opts(&self) -> Result<PropOpts<RSSSpacecraftStep>, ConfigError> {
        let mut opts = match self.fixed_step_s {
            Some(step_s) => PropOpts::with_fixed_step(positive_duration("fixed step", step_s)?),
            None => PropOpts::default(),
        };
        if !opts.fixed_step {
            if let Some(min_step_s) = self.min_step_s {
                opts.set_min_step(positive_duration("minimum step", min_step_s)?);
            }
            if let Some(max_step_s) = self.max_step_s {
                opts.set_max_step(positive_duration("maximum step", max_step_s)?);
            }
            if let Some(init_step_s) = self.init_step_s {
                opts.init_step = positive_duration("initial step", init_step_s)?;
            }
            if let Some(tolerance) = self.tolerance {
                opts.tolerance = tolerance;
            }
            if let Some(attempts) = self.attempts {
                opts.attempts = attempts;
            }
        }
        if let Some(max_steps) = self.max_steps {
            opts.max_steps = max_steps;
        }
        Ok(opts)
    }
}

/// A complete simulation scenario, as stored in a YAML file.
///
/// The `environment`, `adcs`, `propagator` and `ground_stations` sections are optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub spacecraft: SpacecraftConfig,
    pub initial_state: InitialState,
    #[serde(default)]
    pub adcs: AdcsConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    pub run: RunSection,
    #[serde(default)]
    pub propagator: PropagatorConfig,
    #[serde(default)]
    pub ground_stations: Vec<GroundStation>,
}

impl ConfigRepr for ScenarioConfig {}

impl ScenarioConfig {
    /// Builds the initial spacecraft of this scenario, at t = 0.
    pub fn spacecraft(&self) -> Result<Spacecraft, ConfigError> {
        let state = &self.initial_state;
        Ok(Spacecraft::new(
            self.spacecraft.properties()?,
            Vector3::from(state.position_m),
            Vector3::from(state.velocity_m_s),
            Vector4::from(state.attitude),
            Vector3::from(state.angular_velocity_rad_s),
        ))
    }

    pub fn dynamics(&self) -> Result<SpacecraftDynamics, ConfigError> {
        let env = self.environment.environment()?;
        let adcs = Adcs::new(
            &self.adcs.sensors,
            &self.adcs.actuators,
            self.adcs.gains.gains()?,
            &env,
        )?;
        Ok(SpacecraftDynamics::from_environment(&env, adcs))
    }

    /// Validates every section and builds the simulator of this scenario.
    pub fn simulator(&self) -> Result<Simulator, ConfigError> {
        let run = RunConfig::from_seconds(self.run.time_step_s, self.run.total_duration_s)?;
        let sim = Simulator::with_opts(
            self.spacecraft()?,
            self.dynamics()?,
            run,
            self.propagator.opts()?,
        )?
        .with_method(self.propagator.method.unwrap_or_default());
        info!("Loaded scenario: {} with {}", sim.spacecraft, sim.dynamics);
        Ok(sim)
    }
}
