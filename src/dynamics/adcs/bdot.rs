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
use crate::linalg::Vector3;
use crate::utils::cross;
use std::fmt;

/// B-dot detumble controller, executed by the magnetorquers.
///
/// The rate of change of the field seen by the body is approximated as `B × ω`, where `B` is the
/// fixed field of the environment. The variation of the field along the orbit is neglected.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BDot {
    pub kmt: f64,
    /// Per axis saturation, in A·m²
    pub max_dipole_a_m2: f64,
    /// in Tesla
    pub field_t: Vector3<f64>,
}

impl BDot {
    pub fn new(gains: &ControlGains, field_t: Vector3<f64>) -> Self {
        Self {
            kmt: gains.kmt,
            max_dipole_a_m2: gains.max_dipole_a_m2,
            field_t,
        }
    }

    /// Approximate rate of change of the magnetic field, in T/s
    pub fn field_rate(&self, w: &Vector3<f64>) -> Vector3<f64> {
        cross(&self.field_t, w)
    }

    /// Commanded dipole moment `-Kmt dB/dt`, clamped on each axis, in A·m²
    pub fn dipole(&self, w: &Vector3<f64>) -> Vector3<f64> {
        (-self.kmt * self.field_rate(w))
            .map(|m| m.clamp(-self.max_dipole_a_m2, self.max_dipole_a_m2))
    }

    /// Torque `m × B` produced by the commanded dipole, in N·m
    pub fn torque(&self, w: &Vector3<f64>) -> Vector3<f64> {
        cross(&self.dipole(w), &self.field_t)
    }
}

impl fmt::Display for BDot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "B-dot detumble (Kmt = {}, |m| <= {} A·m²)",
            self.kmt, self.max_dipole_a_m2
        )
    }
}
