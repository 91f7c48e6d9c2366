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

use crate::cosmic::Environment;
use crate::io::ConfigError;
use crate::linalg::{Vector3, Vector4};
use crate::utils::normalize_quaternion;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

mod bdot;
mod pd;

pub use bdot::BDot;
pub use pd::AttitudePd;

/// Actuators which may be mounted on the spacecraft. Each actuator enables one control law.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actuator {
    /// Enables the PD attitude controller
    ReactionWheel,
    /// Enables the B-dot detumble controller
    Magnetorquer,
}

/// Sensors which may be mounted on the spacecraft.
///
/// The attitude is perfectly known in this model, so sensors are recorded but never gate a control law.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensor {
    SunSensor,
    Magnetometer,
    Gyroscope,
    StarTracker,
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ReactionWheel => write!(f, "reaction wheel"),
            Self::Magnetorquer => write!(f, "magnetorquer"),
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SunSensor => write!(f, "sun sensor"),
            Self::Magnetometer => write!(f, "magnetometer"),
            Self::Gyroscope => write!(f, "gyroscope"),
            Self::StarTracker => write!(f, "star tracker"),
        }
    }
}

/// Gains and saturation limits of the control laws, fixed for a run.
#[derive(Copy, Clone, Debug, PartialEq, TypedBuilder)]
#[builder(doc)]
pub struct ControlGains {
    /// Proportional gain of the PD attitude controller
    #[builder(default = 0.1)]
    pub kp: f64,
    /// Derivative gain of the PD attitude controller
    #[builder(default = 0.1)]
    pub kd: f64,
    /// Gain of the B-dot detumble controller
    #[builder(default = 100.0)]
    pub kmt: f64,
    /// Maximum torque of the reaction wheels on each axis, in N·m
    #[builder(default = 1e-3)]
    pub max_rw_torque_n_m: f64,
    /// Maximum dipole moment of the magnetorquers on each axis, in A·m²
    #[builder(default = 0.2)]
    pub max_dipole_a_m2: f64,
    /// Attitude targeted by the PD attitude controller, scalar first
    #[builder(default = Vector4::new(1.0, 0.0, 0.0, 0.0))]
    pub target_attitude: Vector4<f64>,
}

impl ControlGains {
    /// Checks that the gains are non negative, that the limits are strictly positive, and normalizes the target attitude.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        for (name, gain) in [("kp", self.kp), ("kd", self.kd), ("kmt", self.kmt)] {
            if !(gain >= 0.0 && gain.is_finite()) {
                return Err(ConfigError::InvalidConfig {
                    msg: format!("gain {name} must be a non negative number, got {gain}"),
                });
            }
        }
        for (name, limit) in [
            ("max_rw_torque_n_m", self.max_rw_torque_n_m),
            ("max_dipole_a_m2", self.max_dipole_a_m2),
        ] {
            // NaN fails this comparison too
            if !(limit > 0.0) {
                return Err(ConfigError::InvalidConfig {
                    msg: format!("saturation limit {name} must be strictly positive, got {limit}"),
                });
            }
        }
        match normalize_quaternion(&self.target_attitude) {
            Some(target) => {
                self.target_attitude = target;
                Ok(self)
            }
            None => Err(ConfigError::InvalidConfig {
                msg: format!(
                    "target attitude must have a non zero norm, got {}",
                    self.target_attitude
                ),
            }),
        }
    }
}

impl Default for ControlGains {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A control law enabled by one of the actuators.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ControlLaw {
    AttitudePd(AttitudePd),
    BDot(BDot),
}

impl ControlLaw {
    /// Actuator which executes this control law
    pub fn actuator(&self) -> Actuator {
        match self {
            Self::AttitudePd(_) => Actuator::ReactionWheel,
            Self::BDot(_) => Actuator::Magnetorquer,
        }
    }

    /// Saturated torque commanded by this law for the unit attitude `q` and the body rate `w`, in N·m
    pub fn torque(&self, q: &Vector4<f64>, w: &Vector3<f64>) -> Vector3<f64> {
        match self {
            Self::AttitudePd(pd) => pd.torque(q, w),
            Self::BDot(bdot) => bdot.torque(w),
        }
    }
}

impl fmt::Display for ControlLaw {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::AttitudePd(pd) => write!(f, "{pd}"),
            Self::BDot(bdot) => write!(f, "{bdot}"),
        }
    }
}

/// Attitude determination and control subsystem.
///
/// The actuators are resolved once into the list of enabled control laws. The total torque is the sum
/// of the torques of every enabled law, without any arbitration between them.
#[derive(Clone, Debug, PartialEq)]
pub struct Adcs {
    sensors: Vec<Sensor>,
    actuators: Vec<Actuator>,
    gains: ControlGains,
    laws: Vec<ControlLaw>,
}

impl Adcs {
    /// Initializes the subsystem and enables the control law of each actuator.
    pub fn new(
        sensors: &[Sensor],
        actuators: &[Actuator],
        gains: ControlGains,
        env: &Environment,
    ) -> Result<Self, ConfigError> {
        let gains = gains.validate()?;

        let mut uniq_sensors = Vec::with_capacity(sensors.len());
        for sensor in sensors {
            if !uniq_sensors.contains(sensor) {
                uniq_sensors.push(*sensor);
            }
        }

        let mut uniq_actuators = Vec::with_capacity(actuators.len());
        let mut laws = Vec::with_capacity(actuators.len());
        for actuator in actuators {
            if uniq_actuators.contains(actuator) {
                continue;
            }
            uniq_actuators.push(*actuator);
            laws.push(match actuator {
                Actuator::ReactionWheel => ControlLaw::AttitudePd(AttitudePd::new(&gains)),
                Actuator::Magnetorquer => {
                    ControlLaw::BDot(BDot::new(&gains, env.magnetic_field_t))
                }
            });
        }

        for law in &laws {
            debug!("enabled {law}");
        }

        Ok(Self {
            sensors: uniq_sensors,
            actuators: uniq_actuators,
            gains,
            laws,
        })
    }

    /// A subsystem without any actuator: the spacecraft is torque free.
    pub fn passive() -> Self {
        Self {
            sensors: Vec::new(),
            actuators: Vec::new(),
            gains: ControlGains::default(),
            laws: Vec::new(),
        }
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    pub fn gains(&self) -> &ControlGains {
        &self.gains
    }

    pub fn laws(&self) -> &[ControlLaw] {
        &self.laws
    }

    pub fn has_actuator(&self, actuator: Actuator) -> bool {
        self.actuators.contains(&actuator)
    }

    /// Sum of the torques commanded by every enabled control law, in N·m.
    ///
    /// The attitude `q` must already be a unit quaternion.
    pub fn total_torque(&self, q: &Vector4<f64>, w: &Vector3<f64>) -> Vector3<f64> {
        let mut torque = Vector3::zeros();
        for law in &self.laws {
            torque += law.torque(q, w);
        }
        torque
    }

    /// Torque commanded by the law of the provided actuator, which is zero if this actuator is absent.
    pub fn torque_from(&self, actuator: Actuator, q: &Vector4<f64>, w: &Vector3<f64>) -> Vector3<f64> {
        self.laws
            .iter()
            .find(|law| law.actuator() == actuator)
            .map_or_else(Vector3::zeros, |law| law.torque(q, w))
    }
}

impl fmt::Display for Adcs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let actuators = self
            .actuators
            .iter()
            .map(|a| format!("{a}"))
            .collect::<Vec<String>>();
        let sensors = self
            .sensors
            .iter()
            .map(|s| format!("{s}"))
            .collect::<Vec<String>>();
        write!(
            f,
            "ADCS with actuators [{}] and sensors [{}]",
            actuators.join(", "),
            sensors.join(", ")
        )
    }
}
