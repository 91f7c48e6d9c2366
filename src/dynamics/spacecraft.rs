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

use super::{euler_rotational_acceleration, Adcs, Dynamics, DynamicsError, PointMassGravity};
use crate::cosmic::{Environment, PhysicalProperties, Spacecraft, STATE_LEN};
use crate::linalg::{Const, OVector, Vector3, Vector4};
use crate::utils::{normalize_quaternion, quaternion_derivative};
use std::fmt;

/// Translational and rotational dynamics of the spacecraft: point mass gravity on the orbit, and
/// Euler's rigid body equation driven by the control torques on the attitude.
#[derive(Clone, Debug)]
pub struct SpacecraftDynamics {
    pub gravity: PointMassGravity,
    pub adcs: Adcs,
}

impl SpacecraftDynamics {
    pub fn new(gravity: PointMassGravity, adcs: Adcs) -> Self {
        Self { gravity, adcs }
    }

    /// Initializes the dynamics with the gravity of the provided environment.
    pub fn from_environment(env: &Environment, adcs: Adcs) -> Self {
        Self::new(PointMassGravity::from_environment(env), adcs)
    }

    /// Gravity only dynamics: no actuator, so the spacecraft tumbles freely.
    pub fn torque_free(env: &Environment) -> Self {
        Self::from_environment(env, Adcs::passive())
    }

    /// Computes the time derivative of the packed state `[r, v, q, w]`, in the same layout.
    ///
    /// The quaternion is renormalized before use. This is a pure function of its inputs and the time
    /// is unused since the environment does not vary.
    pub fn derivative(
        &self,
        _t_s: f64,
        state: &OVector<f64, Const<STATE_LEN>>,
        props: &PhysicalProperties,
    ) -> Result<OVector<f64, Const<STATE_LEN>>, DynamicsError> {
        let radius = state.fixed_rows::<3>(0).into_owned();
        let velocity = state.fixed_rows::<3>(3).into_owned();
        let raw_q: Vector4<f64> = state.fixed_rows::<4>(6).into_owned();
        let omega: Vector3<f64> = state.fixed_rows::<3>(10).into_owned();

        let q = normalize_quaternion(&raw_q).ok_or_else(|| DynamicsError::DegenerateQuaternion {
            norm: raw_q.norm(),
        })?;

        let acceleration = self.gravity.eom(&radius)?;
        let q_dot = quaternion_derivative(&q, &omega);
        let torque = self.adcs.total_torque(&q, &omega);
        let omega_dot =
            euler_rotational_acceleration(&omega, props.inertia(), props.inertia_inv(), &torque);

        Ok(OVector::<f64, Const<STATE_LEN>>::from_iterator(
            velocity
                .iter()
                .chain(acceleration.iter())
                .chain(q_dot.iter())
                .chain(omega_dot.iter())
                .cloned(),
        ))
    }
}

impl fmt::Display for SpacecraftDynamics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Spacecraft dynamics ({}, {})", self.gravity, self.adcs)
    }
}

impl Dynamics for SpacecraftDynamics {
    type StateType = Spacecraft;

    fn eom(
        &self,
        delta_t_s: f64,
        state_vec: &OVector<f64, Const<STATE_LEN>>,
        state_ctx: &Spacecraft,
    ) -> Result<OVector<f64, Const<STATE_LEN>>, DynamicsError> {
        self.derivative(
            state_ctx.time.to_seconds() + delta_t_s,
            state_vec,
            &state_ctx.props,
        )
    }

    /// Renormalizes the attitude quaternion after each step.
    fn finally(&self, mut next_state: Spacecraft) -> Result<Spacecraft, DynamicsError> {
        next_state.attitude =
            next_state
                .unit_attitude()
                .ok_or_else(|| DynamicsError::DegenerateQuaternion {
                    norm: next_state.attitude.norm(),
                })?;
        Ok(next_state)
    }
}
