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

use crate::linalg::{Matrix3, Matrix4, Vector3, Vector4};

/// Returns the tilde matrix from the provided Vector3, i.e. the matrix such that `[ṽ] b = v × b`.
pub fn tilde_matrix(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0,
        -v[(2, 0)],
        v[(1, 0)],
        v[(2, 0)],
        0.0,
        -v[(0, 0)],
        -v[(1, 0)],
        v[(0, 0)],
        0.0,
    )
}

/// Computes the cross product `a × b`, component by component.
pub fn cross(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    )
}

/// Hamilton product `q1 ∘ q2` of two scalar first quaternions.
///
/// This product is not commutative: an attitude error is `target ∘ current⁻¹`, not the reverse.
pub fn quaternion_multiply(q1: &Vector4<f64>, q2: &Vector4<f64>) -> Vector4<f64> {
    let (w1, x1, y1, z1) = (q1[0], q1[1], q1[2], q1[3]);
    let (w2, x2, y2, z2) = (q2[0], q2[1], q2[2], q2[3]);

    Vector4::new(
        w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
        w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
        w1 * y2 - x1 * z2 + y1 * w2 + z1 * x2,
        w1 * z2 + x1 * y2 - y1 * x2 + z1 * w2,
    )
}

/// Returns the conjugate of the quaternion, which is its inverse if it has a unit norm.
pub fn quaternion_conjugate(q: &Vector4<f64>) -> Vector4<f64> {
    Vector4::new(q[0], -q[1], -q[2], -q[3])
}

/// Returns the unit quaternion pointing in the same direction, or None if the norm is zero or not finite.
///
/// The quaternion is first scaled by its largest component so that the norm neither underflows nor overflows.
pub fn normalize_quaternion(q: &Vector4<f64>) -> Option<Vector4<f64>> {
    if q.iter().any(|x| !x.is_finite()) {
        return None;
    }
    let largest = q.amax();
    if largest <= 0.0 {
        return None;
    }
    let scaled = q / largest;
    Some(scaled / scaled.norm())
}

/// Returns the Ω matrix of the angular velocity such that `dq/dt = ½ Ω(ω) q`.
pub fn omega_matrix(w: &Vector3<f64>) -> Matrix4<f64> {
    let (wx, wy, wz) = (w[0], w[1], w[2]);
    Matrix4::new(
        0.0, -wx, -wy, -wz, //
        wx, 0.0, -wz, wy, //
        wy, wz, 0.0, -wx, //
        wz, -wy, wx, 0.0,
    )
}

/// Time derivative of the attitude quaternion `q` (scalar first) given the angular velocity `w` in rad/s.
///
/// This is the kinematic relation only, the angular acceleration is computed by the dynamics.
pub fn quaternion_derivative(q: &Vector4<f64>, w: &Vector3<f64>) -> Vector4<f64> {
    0.5 * omega_matrix(w) * q
}
