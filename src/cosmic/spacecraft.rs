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

use super::State;
use crate::io::ConfigError;
use crate::linalg::{Const, Matrix3, OVector, Vector3, Vector4};
use crate::time::Duration;
use crate::utils::normalize_quaternion;
use std::fmt;

/// Length of the packed spacecraft state `[r(3), v(3), q(4), w(3)]`
pub const STATE_LEN: usize = 13;

/// Static properties of the spacecraft body, fixed for a run.
///
/// The inverse of the inertia tensor is computed once upon initialization.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicalProperties {
    /// in kg
    pub mass_kg: f64,
    /// Length, width and height in meters
    pub dimensions_m: Vector3<f64>,
    inertia: Matrix3<f64>,
    inertia_inv: Matrix3<f64>,
}

impl PhysicalProperties {
    /// Initializes the physical properties with a full inertia tensor, in kg·m², expressed in the body frame.
    ///
    /// Fails if the mass or the dimensions are not strictly positive, or if the inertia tensor is singular.
    pub fn new(
        mass_kg: f64,
        dimensions_m: Vector3<f64>,
        inertia: Matrix3<f64>,
    ) -> Result<Self, ConfigError> {
        if !(mass_kg > 0.0 && mass_kg.is_finite()) {
            return Err(ConfigError::InvalidConfig {
                msg: format!("mass must be strictly positive, got {mass_kg} kg"),
            });
        }
        if dimensions_m.iter().any(|d| !(*d > 0.0 && d.is_finite())) {
            return Err(ConfigError::InvalidConfig {
                msg: format!("dimensions must be strictly positive, got {dimensions_m}"),
            });
        }
        if inertia.iter().any(|i| !i.is_finite()) {
            return Err(ConfigError::InvalidConfig {
                msg: format!("inertia tensor must be finite, got {inertia}"),
            });
        }

        let inertia_inv = match inertia.try_inverse() {
            Some(inv) if inv.iter().all(|i| i.is_finite()) => inv,
            _ => {
                return Err(ConfigError::InvalidConfig {
                    msg: format!("inertia tensor is singular: {inertia}"),
                })
            }
        };

        Ok(Self {
            mass_kg,
            dimensions_m,
            inertia,
            inertia_inv,
        })
    }

    /// Initializes the physical properties from the principal moments of inertia, i.e. a diagonal inertia tensor.
    pub fn from_principal_moments(
        mass_kg: f64,
        dimensions_m: Vector3<f64>,
        moments_kg_m2: Vector3<f64>,
    ) -> Result<Self, ConfigError> {
        if moments_kg_m2.iter().any(|i| *i <= 0.0) {
            return Err(ConfigError::InvalidConfig {
                msg: format!("principal moments of inertia must be strictly positive, got {moments_kg_m2}"),
            });
        }
        Self::new(mass_kg, dimensions_m, Matrix3::from_diagonal(&moments_kg_m2))
    }

    /// Inertia tensor in kg·m²
    pub fn inertia(&self) -> &Matrix3<f64> {
        &self.inertia
    }

    /// Inverse of the inertia tensor
    pub fn inertia_inv(&self) -> &Matrix3<f64> {
        &self.inertia_inv
    }
}

/// The spacecraft: its translational and rotational state, and its physical properties.
///
/// Position and velocity are in the inertial frame, the angular velocity is in the body frame,
/// and the attitude is a scalar first quaternion of the body frame relative to the inertial frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spacecraft {
    /// Time elapsed since the start of the run
    pub time: Duration,
    /// in meters
    pub radius_m: Vector3<f64>,
    /// in meters per second
    pub velocity_m_s: Vector3<f64>,
    /// Unit quaternion, scalar first
    pub attitude: Vector4<f64>,
    /// in radians per second
    pub angular_velocity_rad_s: Vector3<f64>,
    pub props: PhysicalProperties,
}

impl Spacecraft {
    /// Initializes a new spacecraft at the start of a run.
    pub fn new(
        props: PhysicalProperties,
        radius_m: Vector3<f64>,
        velocity_m_s: Vector3<f64>,
        attitude: Vector4<f64>,
        angular_velocity_rad_s: Vector3<f64>,
    ) -> Self {
        Self {
            time: Duration::ZERO,
            radius_m,
            velocity_m_s,
            attitude,
            angular_velocity_rad_s,
            props,
        }
    }

    /// Returns a copy of this spacecraft with the provided position and velocity
    pub fn with_orbit(mut self, radius_m: Vector3<f64>, velocity_m_s: Vector3<f64>) -> Self {
        self.radius_m = radius_m;
        self.velocity_m_s = velocity_m_s;
        self
    }

    /// Returns a copy of this spacecraft with the provided attitude and angular velocity
    pub fn with_attitude(
        mut self,
        attitude: Vector4<f64>,
        angular_velocity_rad_s: Vector3<f64>,
    ) -> Self {
        self.attitude = attitude;
        self.angular_velocity_rad_s = angular_velocity_rad_s;
        self
    }

    /// Returns whether every component of the state is finite
    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|x| x.is_finite())
    }

    /// Returns the norm of the position vector, in meters
    pub fn rmag_m(&self) -> f64 {
        self.radius_m.norm()
    }

    /// Returns the attitude normalized to a unit quaternion, or None if it has a zero norm
    pub fn unit_attitude(&self) -> Option<Vector4<f64>> {
        normalize_quaternion(&self.attitude)
    }

    /// Returns the angular momentum [I]ω of the body, in the body frame
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.props.inertia * self.angular_velocity_rad_s
    }

    /// Returns the rotational kinetic energy ½ ωᵀ[I]ω, in Joules
    pub fn rotational_energy_j(&self) -> f64 {
        0.5 * self.angular_velocity_rad_s.dot(&self.angular_momentum())
    }

    /// Returns the specific orbital energy around a body of the provided gravitational parameter, in J/kg
    pub fn specific_energy(&self, gm_m3_s2: f64) -> f64 {
        0.5 * self.velocity_m_s.norm_squared() - gm_m3_s2 / self.rmag_m()
    }

    /// Returns the semi major axis of the osculating orbit, in meters
    pub fn sma_m(&self, gm_m3_s2: f64) -> f64 {
        -gm_m3_s2 / (2.0 * self.specific_energy(gm_m3_s2))
    }

    /// Returns the period of the osculating orbit, in seconds (NaN for escape trajectories)
    pub fn period_s(&self, gm_m3_s2: f64) -> f64 {
        2.0 * std::f64::consts::PI * (self.sma_m(gm_m3_s2).powi(3) / gm_m3_s2).sqrt()
    }
}

impl State for Spacecraft {
    type VecLength = Const<STATE_LEN>;

    /// Packs the state as `[r(3), v(3), q(4), w(3)]`
    fn to_vector(&self) -> OVector<f64, Const<STATE_LEN>> {
        OVector::<f64, Const<STATE_LEN>>::from_iterator(
            self.radius_m
                .iter()
                .chain(self.velocity_m_s.iter())
                .chain(self.attitude.iter())
                .chain(self.angular_velocity_rad_s.iter())
                .cloned(),
        )
    }

    fn set(&mut self, time: Duration, vector: &OVector<f64, Const<STATE_LEN>>) {
        self.time = time;
        self.radius_m = vector.fixed_rows::<3>(0).into_owned();
        self.velocity_m_s = vector.fixed_rows::<3>(3).into_owned();
        self.attitude = vector.fixed_rows::<4>(6).into_owned();
        self.angular_velocity_rad_s = vector.fixed_rows::<3>(10).into_owned();
    }

    fn time(&self) -> Duration {
        self.time
    }

    fn set_time(&mut self, time: Duration) {
        self.time = time;
    }
}

impl fmt::Display for Spacecraft {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[t = {}]\tr = [{:.3}, {:.3}, {:.3}] m\tv = [{:.6}, {:.6}, {:.6}] m/s\tq = [{:.6}, {:.6}, {:.6}, {:.6}]\tw = [{:.6}, {:.6}, {:.6}] rad/s",
            self.time,
            self.radius_m[0],
            self.radius_m[1],
            self.radius_m[2],
            self.velocity_m_s[0],
            self.velocity_m_s[1],
            self.velocity_m_s[2],
            self.attitude[0],
            self.attitude[1],
            self.attitude[2],
            self.attitude[3],
            self.angular_velocity_rad_s[0],
            self.angular_velocity_rad_s[1],
            self.angular_velocity_rad_s[2],
        )
    }
}

#[cfg(test)]
mod ut_spacecraft {
    use super::*;

    fn one_unit() -> PhysicalProperties {
        PhysicalProperties::from_principal_moments(
            1.33,
            Vector3::new(0.1, 0.1, 0.1),
            Vector3::new(0.01, 0.01, 0.02),
        )
        .unwrap()
    }

    #[test]
    fn packed_layout() {
        let sc = Spacecraft::new(
            one_unit(),
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(4.0, 5.0, 6.0),
            Vector4::new(7.0, 8.0, 9.0, 10.0),
            Vector3::new(11.0, 12.0, 13.0),
        );
        let vec = sc.to_vector();
        for (i, x) in vec.iter().enumerate() {
            assert_eq!(*x, (i + 1) as f64);
        }

        let mut other = sc;
        other.set(Duration::from_seconds(10.0), &(2.0 * vec));
        assert_eq!(other.time, Duration::from_seconds(10.0));
        assert_eq!(other.radius_m, Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(other.velocity_m_s, Vector3::new(8.0, 10.0, 12.0));
        assert_eq!(other.attitude, Vector4::new(14.0, 16.0, 18.0, 20.0));
        assert_eq!(other.angular_velocity_rad_s, Vector3::new(22.0, 24.0, 26.0));
        assert_eq!(other.props, sc.props);

        let mut shifted = other.set_with_delta_seconds(5.0, &vec);
        assert_eq!(shifted.time, Duration::from_seconds(15.0));
        assert_eq!(shifted.to_vector(), vec);
        shifted.set_time(Duration::ZERO);
        assert_eq!(shifted, sc);
    }

    #[test]
    fn inertia_inverse() {
        let props = one_unit();
        approx::assert_abs_diff_eq!(
            *props.inertia_inv(),
            Matrix3::from_diagonal(&Vector3::new(100.0, 100.0, 50.0)),
            epsilon = 1e-9
        );
    }

    #[test]
    fn invalid_properties() {
        let dims = Vector3::new(0.1, 0.1, 0.1);
        let moments = Vector3::new(0.01, 0.01, 0.02);
        assert!(PhysicalProperties::from_principal_moments(0.0, dims, moments).is_err());
        assert!(PhysicalProperties::from_principal_moments(-1.0, dims, moments).is_err());
        assert!(PhysicalProperties::from_principal_moments(f64::NAN, dims, moments).is_err());
        assert!(PhysicalProperties::from_principal_moments(1.0, Vector3::zeros(), moments).is_err());
        assert!(
            PhysicalProperties::from_principal_moments(1.0, dims, Vector3::new(0.01, 0.0, 0.02))
                .is_err()
        );
        // Rank deficient, but with positive diagonal
        let singular = Matrix3::new(1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(PhysicalProperties::new(1.0, dims, singular).is_err());
    }

    #[test]
    fn rigid_body_quantities() {
        let sc = Spacecraft::new(
            one_unit(),
            Vector3::new(7_000e3, 0.0, 0.0),
            Vector3::new(0.0, 7.5e3, 0.0),
            Vector4::new(2.0, 0.0, 0.0, 0.0),
            Vector3::new(0.1, 0.0, 0.2),
        );
        assert_eq!(sc.angular_momentum(), Vector3::new(0.001, 0.0, 0.004));
        assert!((sc.rotational_energy_j() - 0.5 * (0.0001 + 0.0008)).abs() < 1e-15);
        assert_eq!(sc.unit_attitude(), Some(Vector4::new(1.0, 0.0, 0.0, 0.0)));
        assert!(sc.is_finite());
        assert_eq!(sc.rmag_m(), 7_000e3);
    }
}
