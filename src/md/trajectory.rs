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

use crate::cosmic::Spacecraft;
use crate::linalg::{Vector3, Vector4};
use crate::time::Duration;
use std::fmt;
use std::ops;

/// A single record of the trajectory, frozen from the spacecraft state at a sampling instant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sample {
    /// Time of the spacecraft state, elapsed since its initial conditions
    pub time: Duration,
    /// in meters
    pub position_m: Vector3<f64>,
    /// in meters per second
    pub velocity_m_s: Vector3<f64>,
    /// Unit quaternion, scalar first
    pub attitude: Vector4<f64>,
    /// in radians per second
    pub angular_velocity_rad_s: Vector3<f64>,
}

impl Sample {
    /// Time of the sample, in seconds
    pub fn time_s(&self) -> f64 {
        self.time.to_seconds()
    }
}

impl From<&Spacecraft> for Sample {
    /// Records the spacecraft state, with its attitude renormalized.
    fn from(sc: &Spacecraft) -> Self {
        Self {
            time: sc.time,
            position_m: sc.radius_m,
            velocity_m_s: sc.velocity_m_s,
            attitude: sc.unit_attitude().unwrap_or(sc.attitude),
            angular_velocity_rad_s: sc.angular_velocity_rad_s,
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[t = {}]\tr = {:.3} km\t|v| = {:.3} m/s\t|w| = {:.6} rad/s",
            self.time,
            self.position_m.norm() * 1e-3,
            self.velocity_m_s.norm(),
            self.angular_velocity_rad_s.norm()
        )
    }
}

/// Store the samples of a run, in chronological order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    /// We use a vector because we know that the samples are produced in a chronological manner.
    pub samples: Vec<Sample>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the first sample of this trajectory
    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    /// Returns the last sample of this trajectory
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Returns the sampling times, in seconds
    pub fn times_s(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time_s()).collect()
    }

    /// Returns the sample recorded exactly at the provided time, if any.
    pub fn at(&self, time: Duration) -> Option<&Sample> {
        self.samples
            .binary_search_by(|sample| sample.time.cmp(&time))
            .ok()
            .map(|idx| &self.samples[idx])
    }
}

impl ops::Index<usize> for Trajectory {
    type Output = Sample;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.samples[idx]
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => write!(
                f,
                "Trajectory of {} samples from t = {} to t = {}",
                self.len(),
                first.time,
                last.time
            ),
            _ => write!(f, "Empty trajectory"),
        }
    }
}
