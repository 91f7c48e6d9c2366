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
use crate::md::Trajectory;
use crate::propagators::PropagationError;
use snafu::prelude::*;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SimError {
    #[snafu(display("invalid simulation setup: {source}"))]
    Config { source: ConfigError },
    /// The run stopped early: the trajectory holds every sample recorded before the failure.
    #[snafu(display("run truncated after {} samples: {source}", traj.len()))]
    IntegrationFailure {
        traj: Box<Trajectory>,
        source: PropagationError,
    },
}

impl SimError {
    /// Returns the samples recorded before a truncated run failed, if this error stems from the integration.
    pub fn partial_trajectory(&self) -> Option<&Trajectory> {
        match self {
            Self::IntegrationFailure { traj, .. } => Some(traj),
            Self::Config { .. } => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}
