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
use crate::linalg::{DefaultAllocator, OVector};
use crate::State;
use snafu::Snafu;

/// Point mass gravity of the central body.
pub mod gravity;
pub use self::gravity::*;

/// Rotational dynamics of a rigid body.
pub mod attitude;
pub use self::attitude::*;

/// Attitude determination and control: capabilities, gains and control laws.
pub mod adcs;
pub use self::adcs::{Actuator, Adcs, ControlGains, ControlLaw, Sensor};

/// Full translational and rotational dynamics of the spacecraft.
pub mod spacecraft;
pub use self::spacecraft::*;

/// A trait for models with equations of motion that can be integrated.
///
/// The equations of motion must be a pure function of the time and the state vector: the propagator
/// may evaluate them several times for the same step and discard some of the results.
pub trait Dynamics: Clone + Sync + Send
where
    DefaultAllocator: Allocator<<Self::StateType as State>::VecLength>,
{
    type StateType: State;

    /// Defines the equations of motion.
    ///
    /// - `delta_t_s`: Time in seconds past the time of the context state.
    /// - `state_vec`: The state vector, which changes at each integration stage.
    /// - `state_ctx`: The state context, used to rebuild the state from the state vector.
    fn eom(
        &self,
        delta_t_s: f64,
        state_vec: &OVector<f64, <Self::StateType as State>::VecLength>,
        state_ctx: &Self::StateType,
    ) -> Result<OVector<f64, <Self::StateType as State>::VecLength>, DynamicsError>;

    /// Performs final changes after each successful integration step.
    ///
    /// Also called before the first integration step to update the initial state if needed.
    fn finally(&self, next_state: Self::StateType) -> Result<Self::StateType, DynamicsError> {
        Ok(next_state)
    }
}

/// Dynamical model errors.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DynamicsError {
    /// The position is at the center of the attracting body, or is not finite.
    #[snafu(display("gravity is singular for a position norm of {rmag_m} m"))]
    SingularGravity { rmag_m: f64 },
    /// The attitude quaternion has a zero or non finite norm and cannot be renormalized.
    #[snafu(display("attitude quaternion cannot be normalized, its norm is {norm}"))]
    DegenerateQuaternion { norm: f64 },
}
