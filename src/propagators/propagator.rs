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

use super::error_ctrl::{ErrorCtrl, RSSSpacecraftStep};
use super::{
    CashKarp45, Dormand45, Fehlberg45, IntegrationDetails, PropInstance, PropOpts, RK4Fixed, RK,
};
use crate::dynamics::Dynamics;
use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, OVector};
use crate::time::Duration;
use crate::State;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Runge Kutta method of a propagator, as selected in a scenario file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    #[default]
    Dormand45,
    Fehlberg45,
    CashKarp45,
    /// Classical fourth order Runge Kutta, always used with a fixed step (the initial step of the options)
    Rk4,
}

impl IntegratorKind {
    /// Returns whether this method can adapt its step size.
    pub fn is_embedded(&self) -> bool {
        !matches!(self, Self::Rk4)
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Dormand45 => "Dormand Prince 4-5",
            Self::Fehlberg45 => "Runge Kutta Fehlberg 4-5",
            Self::CashKarp45 => "Cash Karp 4-5",
            Self::Rk4 => "fixed step RK4",
        };
        write!(f, "{name}")
    }
}

/// A Propagator allows propagating a set of dynamics forward or backward in time.
/// It includes the options and the set of coefficients used for the monomorphic instance.
#[derive(Clone, Debug)]
pub struct Propagator<D: Dynamics, E: ErrorCtrl>
where
    DefaultAllocator: Allocator<<D::StateType as State>::VecLength>,
{
    pub dynamics: D, // Stores the dynamics used. *Must* use this to get the latest values
    pub opts: PropOpts<E>, // Stores the integration options (tolerance, min/max step, init step, etc.)
    pub(crate) order: u8, // Order of the integrator
    pub(crate) stages: usize, // Number of stages, i.e. how many times the derivatives will be called
    pub(crate) a_coeffs: &'static [f64],
    pub(crate) b_coeffs: &'static [f64],
}

impl<D: Dynamics, E: ErrorCtrl> Propagator<D, E>
where
    DefaultAllocator: Allocator<<D::StateType as State>::VecLength>,
{
    /// Each propagator must be initialized with `new` which stores propagator information.
    pub fn new<T: RK>(dynamics: D, opts: PropOpts<E>) -> Self {
        Self {
            dynamics,
            opts,
            stages: T::STAGES,
            order: T::ORDER,
            a_coeffs: T::A_COEFFS,
            b_coeffs: T::B_COEFFS,
        }
    }

    /// Set the tolerance for the propagator
    pub fn set_tolerance(&mut self, tol: f64) {
        self.opts.tolerance = tol;
    }

    /// Set the maximum step size for the propagator and sets the initial step to that value if currently greater
    pub fn set_max_step(&mut self, step: Duration) {
        self.opts.set_max_step(step);
    }

    pub fn set_min_step(&mut self, step: Duration) {
        self.opts.set_min_step(step);
    }

    /// A Dormand Prince 4-5 propagator (the default) with custom propagator options.
    pub fn dp45(dynamics: D, opts: PropOpts<E>) -> Self {
        Self::new::<Dormand45>(dynamics, opts)
    }

    /// A Runge Kutta Fehlberg 4-5 propagator with custom propagator options.
    pub fn rkf45(dynamics: D, opts: PropOpts<E>) -> Self {
        Self::new::<Fehlberg45>(dynamics, opts)
    }

    /// A Cash Karp 4-5 propagator with custom propagator options.
    pub fn cash_karp45(dynamics: D, opts: PropOpts<E>) -> Self {
        Self::new::<CashKarp45>(dynamics, opts)
    }

    /// A propagator of the provided kind with custom propagator options.
    pub fn from_kind(kind: IntegratorKind, dynamics: D, opts: PropOpts<E>) -> Self {
        match kind {
            IntegratorKind::Dormand45 => Self::dp45(dynamics, opts),
            IntegratorKind::Fehlberg45 => Self::rkf45(dynamics, opts),
            IntegratorKind::CashKarp45 => Self::cash_karp45(dynamics, opts),
            IntegratorKind::Rk4 => Self::new::<RK4Fixed>(dynamics, opts),
        }
    }

    /// Returns whether this method embeds an error estimate, i.e. whether it can adapt its step.
    pub fn is_embedded(&self) -> bool {
        self.b_coeffs[..self.stages] != self.b_coeffs[self.stages..]
    }

    pub fn with(&self, state: D::StateType) -> PropInstance<'_, D, E> {
        // Pre-allocate the k used in the propagator
        let mut k = Vec::with_capacity(self.stages + 1);
        for _ in 0..self.stages {
            k.push(OVector::<f64, <D::StateType as State>::VecLength>::zeros());
        }
        PropInstance {
            state,
            prop: self,
            details: IntegrationDetails {
                step: self.opts.init_step,
                error: 0.0,
                attempts: 1,
            },
            steps_taken: 0,
            step_size: self.opts.init_step,
            fixed_step: self.opts.fixed_step || !self.is_embedded(),
            k,
        }
    }
}

impl<D: Dynamics> Propagator<D, RSSSpacecraftStep>
where
    DefaultAllocator: Allocator<<D::StateType as State>::VecLength>,
{
    /// Default propagator is a Dormand Prince 4-5 with the default PropOpts.
    pub fn default(dynamics: D) -> Self {
        Self::new::<Dormand45>(dynamics, PropOpts::default())
    }

    /// A classical fourth order Runge Kutta with the provided fixed step.
    pub fn rk4(dynamics: D, step: Duration) -> Self {
        Self::new::<RK4Fixed>(dynamics, PropOpts::with_fixed_step(step))
    }
}
