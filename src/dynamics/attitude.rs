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

use crate::linalg::{Matrix3, Vector3};
use crate::utils::cross;

/// Computes the angular acceleration of a rigid body from Euler's rotational equation.
///
/// Throughout this documentation [I] refers to the inertia tensor and ω to the angular velocity, both in the body frame.
/// [I]̲̇ω = -[̃ω][I]̲ω + ̲L
///
/// Unlike the principal axis form, this works with any full inertia tensor, provided its inverse.
///
/// Source: Schaub & Junkins, 3th ed., eq. 4.32.
pub fn euler_rotational_acceleration(
    omega: &Vector3<f64>,
    inertia: &Matrix3<f64>,
    inertia_inv: &Matrix3<f64>,
    torque: &Vector3<f64>,
) -> Vector3<f64> {
    let momentum = inertia * omega;
    inertia_inv * (torque - cross(omega, &momentum))
}
