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

use crate::io::ConfigError;
use crate::linalg::Vector3;
use std::fmt;

/// Newtonian constant of gravitation, in m^3 kg^-1 s^-2
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;
/// Mass of the Earth, in kg
pub const EARTH_MASS_KG: f64 = 5.972e24;
/// Standard gravitational parameter of the Earth, in m^3/s^2
pub const EARTH_GM: f64 = GRAVITATIONAL_CONSTANT * EARTH_MASS_KG;
/// Mean radius of the Earth, in meters
pub const EARTH_RADIUS_M: f64 = 6_371e3;
/// Surface magnetic field of the Earth used by the detumble controller, in Tesla
pub const EARTH_MAGNETIC_FIELD_T: [f64; 3] = [3.12e-5, 3.12e-5, 3.12e-5];

/// The constants of the orbited body, fixed for a run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Environment {
    /// Gravitational parameter of the central body, in m^3/s^2
    pub gm_m3_s2: f64,
    /// Magnetic field, assumed constant, in Tesla
    pub magnetic_field_t: Vector3<f64>,
}

impl Environment {
    /// Initializes a new environment after checking that the gravitational parameter is positive and the field is finite.
    pub fn new(gm_m3_s2: f64, magnetic_field_t: Vector3<f64>) -> Result<Self, ConfigError> {
        if !(gm_m3_s2 > 0.0 && gm_m3_s2.is_finite()) {
            return Err(ConfigError::InvalidConfig {
                msg: format!("gravitational parameter must be positive, got {gm_m3_s2}"),
            });
        }
        if magnetic_field_t.iter().any(|b| !b.is_finite()) {
            return Err(ConfigError::InvalidConfig {
                msg: format!("magnetic field must be finite, got {magnetic_field_t}"),
            });
        }
        Ok(Self {
            gm_m3_s2,
            magnetic_field_t,
        })
    }

    /// The Earth, as a point mass with a constant magnetic field.
    pub fn earth() -> Self {
        Self {
            gm_m3_s2: EARTH_GM,
            magnetic_field_t: Vector3::from(EARTH_MAGNETIC_FIELD_T),
        }
    }

    /// Returns the period of a circular orbit of the provided radius, in seconds
    pub fn circular_period_s(&self, radius_m: f64) -> f64 {
        2.0 * std::f64::consts::PI * (radius_m.powi(3) / self.gm_m3_s2).sqrt()
    }

    /// Returns the velocity of a circular orbit of the provided radius, in m/s
    pub fn circular_velocity_m_s(&self, radius_m: f64) -> f64 {
        (self.gm_m3_s2 / radius_m).sqrt()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::earth()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GM = {:.6e} m^3/s^2\tB = [{:.3e}, {:.3e}, {:.3e}] T",
            self.gm_m3_s2,
            self.magnetic_field_t[0],
            self.magnetic_field_t[1],
            self.magnetic_field_t[2]
        )
    }
}

#[test]
fn earth_constants() {
    let earth = Environment::default();
    assert!((earth.gm_m3_s2 - 3.985_891_96e14).abs() < 1e6);
    // A 7000 km orbit takes a bit more than 97 minutes
    let period = earth.circular_period_s(7_000e3);
    assert!((period - 5_828.6).abs() < 0.1, "{period}");
    assert!((earth.circular_velocity_m_s(7_000e3) - 7_545.9).abs() < 0.1);

    assert!(Environment::new(-1.0, Vector3::zeros()).is_err());
    assert!(Environment::new(EARTH_GM, Vector3::new(f64::NAN, 0.0, 0.0)).is_err());
}
