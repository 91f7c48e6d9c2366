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

use super::DynamicsError;
use crate::cosmic::Environment;
use crate::linalg::Vector3;
use std::fmt;

/// Returns the acceleration `-μ/|r|³ r` of a point mass of gravitational parameter `gm_m3_s2`, in m/s².
///
/// A zero or non finite position norm is reported as [DynamicsError::SingularGravity].
pub fn gravitational_acceleration(
    gm_m3_s2: f64,
    radius_m: &Vector3<f64>,
) -> Result<Vector3<f64>, DynamicsError> {
    let rmag = radius_m.norm();
    if !(rmag > 0.0 && rmag.is_finite()) {
        return Err(DynamicsError::SingularGravity { rmag_m: rmag });
    }
    Ok((-gm_m3_s2 / rmag.powi(3)) * radius_m)
}

/// Point mass gravity of the central body, the only force acting on the spacecraft.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointMassGravity {
    /// in m^3/s^2
    pub gm_m3_s2: f64,
}

impl PointMassGravity {
    pub fn new(gm_m3_s2: f64) -> Self {
        Self { gm_m3_s2 }
    }

    pub fn from_environment(env: &Environment) -> Self {
        Self::new(env.gm_m3_s2)
    }

    pub fn eom(&self, radius_m: &Vector3<f64>) -> Result<Vector3<f64>, DynamicsError> {
        gravitational_acceleration(self.gm_m3_s2, radius_m)
    }
}

impl fmt::Display for PointMassGravity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "point mass gravity (GM = {:.6e} m^3/s^2)", self.gm_m3_s2)
    }
}

#[cfg(test)]
mod ut_gravity {
    use super::*;
    use crate::cosmic::EARTH_GM;

    #[test]
    fn inverse_square() {
        let r = Vector3::new(7_000e3, 0.0, 0.0);
        let acc = gravitational_acceleration(EARTH_GM, &r).unwrap();
        // Points to the center of the body
        assert!(acc[0] < 0.0);
        assert_eq!(acc[1], 0.0);
        assert_eq!(acc[2], 0.0);
        assert!((acc.norm() - EARTH_GM / 7_000e3_f64.powi(2)).abs() < 1e-12);

        // Twice as far, four times weaker
        let acc2 = gravitational_acceleration(EARTH_GM, &(2.0 * r)).unwrap();
        assert!((acc.norm() / acc2.norm() - 4.0).abs() < 1e-12);

        // Off axis, still antiparallel to the position
        let r = Vector3::new(-1_000e3, 6_000e3, 3_000e3);
        let acc = gravitational_acceleration(EARTH_GM, &r).unwrap();
        assert!((acc.normalize() + r.normalize()).norm() < 1e-12);
    }

    #[test]
    fn singular_at_center() {
        assert_eq!(
            gravitational_acceleration(EARTH_GM, &Vector3::zeros()),
            Err(DynamicsError::SingularGravity { rmag_m: 0.0 })
        );
        assert!(PointMassGravity::new(EARTH_GM)
            .eom(&Vector3::new(f64::INFINITY, 0.0, 0.0))
            .is_err());
    }
}
