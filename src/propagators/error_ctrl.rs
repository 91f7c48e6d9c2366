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

use crate::cosmic::STATE_LEN;
use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, DimName, OVector};

// This determines when to take into consideration the magnitude of the state_delta -- prevents dividing by too small of a number.
const REL_ERR_THRESH: f64 = 0.1;

/// The Error Control trait manages how a propagator computes the error in the current step.
pub trait ErrorCtrl: Copy + Send + Sync {
    /// Computes the actual error of the current step.
    ///
    /// The `error_est` is the estimated error computed from the difference in the two stages of
    /// of the RK propagator. The `candidate` variable is the candidate state, and `cur_state` is
    /// the current state. This function must return the error.
    fn estimate<N: DimName>(
        error_est: &OVector<f64, N>,
        candidate: &OVector<f64, N>,
        cur_state: &OVector<f64, N>,
    ) -> f64
    where
        DefaultAllocator: Allocator<N>;
}

/// An RSS step error control on the rows `start..start + len` of the state: the norm of the error
/// relative to the norm of the change in those rows.
fn rss_step_rows<N: DimName>(
    error_est: &OVector<f64, N>,
    candidate: &OVector<f64, N>,
    cur_state: &OVector<f64, N>,
    start: usize,
    len: usize,
) -> f64
where
    DefaultAllocator: Allocator<N>,
{
    let mag = (candidate.rows(start, len) - cur_state.rows(start, len)).norm();
    let err = error_est.rows(start, len).norm();
    if mag > REL_ERR_THRESH {
        err / mag
    } else {
        err
    }
}

/// A largest error control which effectively computes the largest error at each component
///
/// This is a standard error computation algorithm, but it's arguably bad if the state's components have different units.
/// It calculates the largest local estimate of the error from the integration (`error_est`)
/// given the difference in the candidate state and the previous state (`state_delta`).
/// This error estimator is from the physical model estimator of GMAT
/// [PhysicalModel.cpp](https://github.com/ChristopherRabotin/GMAT/blob/37201a6290e7f7b941bc98ee973a527a5857104b/src/base/forcemodel/PhysicalModel.cpp#L987)
#[derive(Clone, Copy, Debug, Default)]
pub struct LargestError;
impl ErrorCtrl for LargestError {
    fn estimate<N: DimName>(
        error_est: &OVector<f64, N>,
        candidate: &OVector<f64, N>,
        cur_state: &OVector<f64, N>,
    ) -> f64
    where
        DefaultAllocator: Allocator<N>,
    {
        let state_delta = candidate - cur_state;
        let mut max_err = 0.0;
        for (i, prop_err_i) in error_est.iter().enumerate() {
            let err = if state_delta[i].abs() > REL_ERR_THRESH {
                (prop_err_i / state_delta[i]).abs()
            } else {
                prop_err_i.abs()
            };
            if err > max_err {
                max_err = err;
            }
        }
        max_err
    }
}

/// An RSS step error control which effectively computes the L2 norm of the provided Vector
///
/// [ODEModel.cpp](https://github.com/ChristopherRabotin/GMAT/blob/37201a6290e7f7b941bc98ee973a527a5857104b/src/base/forcemodel/ODEModel.cpp#L3045)
#[derive(Clone, Copy, Debug, Default)]
pub struct RSSStep;
impl ErrorCtrl for RSSStep {
    fn estimate<N: DimName>(
        error_est: &OVector<f64, N>,
        candidate: &OVector<f64, N>,
        cur_state: &OVector<f64, N>,
    ) -> f64
    where
        DefaultAllocator: Allocator<N>,
    {
        rss_step_rows(error_est, candidate, cur_state, 0, N::dim())
    }
}

/// An RSS state error control: the norm of the error relative to the norm of the mean of the current and candidate states.
///
/// This is more stringent than [RSSStep].
/// [ODEModel.cpp](https://github.com/ChristopherRabotin/GMAT/blob/37201a6290e7f7b941bc98ee973a527a5857104b/src/base/forcemodel/ODEModel.cpp#L3004)
#[derive(Clone, Copy, Debug, Default)]
pub struct RSSState;
impl ErrorCtrl for RSSState {
    fn estimate<N: DimName>(
        error_est: &OVector<f64, N>,
        candidate: &OVector<f64, N>,
        cur_state: &OVector<f64, N>,
    ) -> f64
    where
        DefaultAllocator: Allocator<N>,
    {
        let mag = 0.5 * (candidate + cur_state).norm();
        let err = error_est.norm();
        if mag > REL_ERR_THRESH {
            err / mag
        } else {
            err
        }
    }
}

/// An RSS step error control for the spacecraft state: the worst of the RSS step errors of the position,
/// velocity, attitude and angular velocity blocks, each of which has homogeneous units.
///
/// States of another size are treated as a single block.
#[derive(Clone, Copy, Debug, Default)]
pub struct RSSSpacecraftStep;
impl ErrorCtrl for RSSSpacecraftStep {
    fn estimate<N: DimName>(
        error_est: &OVector<f64, N>,
        candidate: &OVector<f64, N>,
        cur_state: &OVector<f64, N>,
    ) -> f64
    where
        DefaultAllocator: Allocator<N>,
    {
        if N::dim() != STATE_LEN {
            return rss_step_rows(error_est, candidate, cur_state, 0, N::dim());
        }

        let mut max_err = 0.0;
        for (start, len) in [(0, 3), (3, 3), (6, 4), (10, 3)] {
            let err = rss_step_rows(error_est, candidate, cur_state, start, len);
            if err > max_err {
                max_err = err;
            }
        }
        max_err
    }
}
