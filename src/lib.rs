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

/*! # cubesat-sim

Propagation of the translational and rotational state of a small spacecraft (a CubeSat) under
point mass gravity, with a PD attitude controller driving reaction wheels and a B-dot detumble
controller driving magnetorquers.

The state of the spacecraft is packed as `[r(3), v(3), q(4), w(3)]`, the attitude quaternion is scalar first.
*/

/// Provides all the propagators / integrators available in `cubesat-sim`.
pub mod propagators;

/// Provides the equations of motion: gravity, quaternion kinematics, rigid body rotation and attitude control.
pub mod dynamics;

/// Provides the spacecraft state, its physical properties, the environment and ground stations.
pub mod cosmic;

/// Vector and quaternion helpers shared by different modules.
pub mod utils;

mod errors;
/// Functions which may fail will return an error, the simulation will not panic.
pub use self::errors::SimError;

/// Loading of scenario configuration files.
pub mod io;

/// Simulation driver and trajectory records.
pub mod md;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export some useful things
pub use self::cosmic::{Environment, PhysicalProperties, Spacecraft, State};
