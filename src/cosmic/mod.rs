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

use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, DimName, OVector};
use crate::time::{Duration, Unit};
use std::fmt;

mod environment;
pub use self::environment::*;

mod ground_station;
pub use self::ground_station::GroundStation;

mod spacecraft;
pub use self::spacecraft::{PhysicalProperties, Spacecraft, STATE_LEN};

/// A trait for a propagated state.
///
/// The state is flattened into a vector of `VecLength` for the integrators, and rebuilt from that vector
/// after each step. The time of a state is the time elapsed since the start of the run.
pub trait State: Copy + PartialEq + fmt::Display + Send + Sync
where
    Self: Sized,
    DefaultAllocator: Allocator<Self::VecLength>,
{
    /// Length of the flattened state
    type VecLength: DimName;

    /// Return this state as a vector for the propagation
    fn to_vector(&self) -> OVector<f64, Self::VecLength>;

    /// Set this state from the time and the flattened vector
    fn set(&mut self, time: Duration, vector: &OVector<f64, Self::VecLength>);

    /// Reconstruct a new State from the provided delta time in seconds compared to the current state
    /// and with the provided vector.
    fn set_with_delta_seconds(
        mut self,
        delta_t_s: f64,
        vector: &OVector<f64, Self::VecLength>,
    ) -> Self {
        self.set(self.time() + delta_t_s * Unit::Second, vector);
        self
    }

    /// Retrieve the time elapsed since the start of the run
    fn time(&self) -> Duration;

    /// Set the time elapsed since the start of the run
    fn set_time(&mut self, time: Duration);
}
