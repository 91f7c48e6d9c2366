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

use super::ControlGains;
use crate::linalg::{Vector3, Vector4};
use crate::utils::{quaternion_conjugate, quaternion_multiply};
use std::fmt;

/// Proportional-derivative attitude controller, executed by the reaction wheels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AttitudePd {
    pub kp: f64,
    pub kd: f64,
    /// Per axis saturation, in N·m
    pub max_torque_n_m: f64,
    /// Unit quaternion, scalar first
    pub target: Vector4<f64>,
}

impl AttitudePd {
    pub fn new(gains: &ControlGains) -> Self {
        Self {
            kp: gains.kp,
            kd: gains.kd,
            max_torque_n_m: gains.max_rw_torque_n_m,
            target: gains.target_attitude,
        }
    }

    /// Error quaternion `q_target ∘ q⁻¹`, where the inverse of the unit quaternion `q` is its conjugate
    pub fn attitude_error(&self, q: &Vector4<f64>) -> Vector4<f64> {
        quaternion_multiply(&self.target, &quaternion_conjugate(q))
    }

    /// Returns the commanded torque `-Kp sign(q_e0) q_e,vec - Kd ω`, clamped on each axis.
    ///
    /// The sign of the scalar part selects the shortest rotation; a zero scalar part counts as positive.
    pub fn torque(&self, q: &Vector4<f64>, w: &Vector3<f64>) -> Vector3<f64> {
        let q_e = self.attitude_error(q);
        let sign = if q_e[0] < 0.0 { -1.0 } else { 1.0 };
        let q_e_vec = Vector3::new(q_e[1], q_e[2], q_e[3]);

        let torque = -self.kp * sign * q_e_vec - self.kd * w;
        torque.map(|t| t.clamp(-self.max_torque_n_m, self.max_torque_n_m))
    }
}

impl fmt::Display for AttitudePd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PD attitude control (Kp = {}, Kd = {}, |τ| <= {} N·m)",
            self.kp, self.kd, self.max_torque_n_m
        )
    }
}
