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

use super::error_ctrl::ErrorCtrl;
use super::{DynamicsSnafu, IntegrationDetails, PropagationError, Propagator};
use crate::dynamics::Dynamics;
use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, OVector};
use crate::time::{Duration, Unit};
use crate::State;
use snafu::ResultExt;
use std::f64;
use std::time::Instant;

/// A propagator instance advances one state with the dynamics and the integrator of its [Propagator].
///
/// It stores the integrator details of the previous step, the adapted step size for the next step,
/// and the number of steps taken, which is bounded by the `max_steps` option.
pub struct PropInstance<'a, D: Dynamics, E: ErrorCtrl>
where
    DefaultAllocator: Allocator<<D::StateType as State>::VecLength>,
{
    /// The state of this propagator instance
    pub state: D::StateType,
    /// The propagator setup (kind, stages, etc.)
    pub prop: &'a Propagator<D, E>,
    /// Stores the details of the previous integration step
    pub details: IntegrationDetails,
    /// Number of accepted steps since this instance was created
    pub steps_taken: usize,
    pub(crate) step_size: Duration, // Stores the adapted step for the _next_ call
    pub(crate) fixed_step: bool,
    // Allows us to do pre-allocation of the ki vectors
    pub(crate) k: Vec<OVector<f64, <D::StateType as State>::VecLength>>,
}

impl<'a, D: Dynamics, E: ErrorCtrl> PropInstance<'a, D, E>
where
    DefaultAllocator: Allocator<<D::StateType as State>::VecLength>,
{
    /// Allows setting the step size of the propagator
    pub fn set_step(&mut self, step_size: Duration, fixed: bool) {
        self.step_size = step_size;
        self.fixed_step = fixed;
    }

    /// This method propagates the provided Dynamics for the provided duration, which may be negative.
    ///
    /// The state returned is exactly at the requested time. On error, the state of this instance is the
    /// last state successfully reached.
    pub fn for_duration(&mut self, duration: Duration) -> Result<D::StateType, PropagationError> {
        if duration == Duration::ZERO {
            return Ok(self.state);
        }
        let stop_time = self.state.time() + duration;

        let tick = Instant::now();
        let log_progress = duration.abs() >= 2 * Unit::Minute;

        if log_progress {
            info!("Propagating for {} until t = {}", duration, stop_time);
        }
        // Call `finally` on the current state to set anything up
        self.state = self
            .prop
            .dynamics
            .finally(self.state)
            .context(DynamicsSnafu)?;

        let backprop = duration.is_negative();
        if backprop {
            self.step_size = -self.step_size; // Invert the step size
        }

        let rslt = self.advance_until(stop_time, backprop);

        if backprop {
            self.step_size = -self.step_size; // Restore to a positive step size
        }
        rslt?;

        if log_progress {
            let tock: Duration = tick.elapsed().into();
            info!("Done in {} ({} steps so far)", tock, self.steps_taken);
        }

        Ok(self.state)
    }

    /// Propagates the provided Dynamics until the provided time since the start of the run. Returns the end state.
    pub fn until(&mut self, end_time: Duration) -> Result<D::StateType, PropagationError> {
        let duration: Duration = end_time - self.state.time();
        self.for_duration(duration)
    }

    fn advance_until(&mut self, stop_time: Duration, backprop: bool) -> Result<(), PropagationError> {
        loop {
            let time = self.state.time();
            if time == stop_time {
                return Ok(());
            }
            let remaining = stop_time - time;
            if (!backprop && self.step_size > remaining) || (backprop && self.step_size < remaining)
            {
                // Aim for the stop time: the step may still be shrunk to meet the tolerance,
                // in which case the loop continues from the adapted step.
                let prev_step_size = self.step_size;
                self.step_size = remaining;

                self.single_step()?;

                if self.state.time() == stop_time {
                    // Restore the step size for subsequent calls
                    self.step_size = prev_step_size;
                }
            } else {
                self.single_step()?;
            }
        }
    }

    /// Take a single propagator step.
    ///
    /// Fails if the step budget is exhausted, if the dynamics fail, if the error cannot be brought
    /// within the tolerance, or if the new state is not finite.
    /// In all these cases, the state is left unchanged.
    pub fn single_step(&mut self) -> Result<(), PropagationError> {
        if self.steps_taken >= self.prop.opts.max_steps {
            return Err(PropagationError::StepBudgetExhausted {
                max_steps: self.prop.opts.max_steps,
                time: self.state.time(),
            });
        }

        let (step, state_vec) = self.derive()?;
        if state_vec.iter().any(|x| !x.is_finite()) {
            return Err(PropagationError::NonFiniteState {
                time: self.state.time(),
            });
        }

        let mut next_state = self.state;
        next_state.set(self.state.time() + step, &state_vec);
        self.state = self
            .prop
            .dynamics
            .finally(next_state)
            .context(DynamicsSnafu)?;
        self.steps_taken += 1;

        Ok(())
    }

    /// This method integrates whichever function is provided as `d_xdt`. Everything passed to this function is in **seconds**.
    ///
    /// This function returns the step sized used (as a Duration) and the new state as y_{n+1} = y_n + \frac{dy_n}{dt}.
    /// If the step was not shrunk, the step returned is exactly the requested one.
    /// To get the integration details, check `self.latest_details`.
    fn derive(
        &mut self,
    ) -> Result<(Duration, OVector<f64, <D::StateType as State>::VecLength>), PropagationError>
    {
        let state_vec = &self.state.to_vector();
        let state_ctx = &self.state;
        let requested_step = self.step_size;
        let min_step = self.prop.opts.min_step.to_seconds();
        let max_step = self.prop.opts.max_step.to_seconds();
        // Reset the number of attempts used (we don't reset the error because it's set before it's read)
        self.details.attempts = 1;
        // Convert the step size to seconds -- it's mutable because we may change it below
        let mut step_size = requested_step.to_seconds();
        loop {
            let ki = self
                .prop
                .dynamics
                .eom(0.0, state_vec, state_ctx)
                .context(DynamicsSnafu)?;
            self.k[0] = ki;
            let mut a_idx: usize = 0;
            for i in 0..(self.prop.stages - 1) {
                // Let's compute the c_i by summing the relevant items from the list of coefficients.
                // \sum_{j=1}^{i-1} a_ij  ∀ i ∈ [2, s]
                let mut ci: f64 = 0.0;
                // The wi stores the a_{s1} * k_1 + a_{s2} * k_2 + ... + a_{s, s-1} * k_{s-1} +
                let mut wi = OVector::<f64, <D::StateType as State>::VecLength>::from_element(0.0);
                for kj in &self.k[0..i + 1] {
                    let a_ij = self.prop.a_coeffs[a_idx];
                    ci += a_ij;
                    wi += a_ij * kj;
                    a_idx += 1;
                }

                let ki = self
                    .prop
                    .dynamics
                    .eom(ci * step_size, &(state_vec + step_size * wi), state_ctx)
                    .context(DynamicsSnafu)?;
                self.k[i + 1] = ki;
            }
            // Compute the next state and the error
            let mut next_state = state_vec.clone();
            // State error estimation from https://en.wikipedia.org/wiki/Runge%E2%80%93Kutta_methods#Adaptive_Runge%E2%80%93Kutta_methods
            // This is consistent with GMAT https://github.com/ChristopherRabotin/GMAT/blob/37201a6290e7f7b941bc98ee973a527a5857104b/src/base/propagator/RungeKutta.cpp#L537
            let mut error_est =
                OVector::<f64, <D::StateType as State>::VecLength>::from_element(0.0);
            for (i, ki) in self.k.iter().enumerate() {
                let b_i = self.prop.b_coeffs[i];
                if !self.fixed_step {
                    let b_i_star = self.prop.b_coeffs[i + self.prop.stages];
                    error_est += step_size * (b_i - b_i_star) * ki;
                }
                next_state += step_size * b_i * ki;
            }

            if self.fixed_step {
                // Using a fixed step, no adaptive step necessary
                self.details.step = requested_step;
                self.details.error = 0.0;
                return Ok((requested_step, next_state));
            }

            // Compute the error estimate.
            self.details.error = E::estimate(&error_est, &next_state, state_vec);
            if !self.details.error.is_finite() {
                return Err(PropagationError::NonFiniteState {
                    time: self.state.time(),
                });
            }

            if self.details.error <= self.prop.opts.tolerance {
                self.details.step = if self.details.attempts == 1 {
                    requested_step
                } else {
                    step_size * Unit::Second
                };
                if self.details.error < self.prop.opts.tolerance {
                    // Error is less than tolerance, let's attempt to increase the step for the next iteration.
                    let proposed_step = if self.details.error > 0.0 {
                        0.9 * step_size
                            * (self.prop.opts.tolerance / self.details.error)
                                .powf(1.0 / f64::from(self.prop.order))
                    } else {
                        max_step.copysign(step_size)
                    };
                    step_size = if proposed_step.abs() > max_step {
                        max_step.copysign(step_size)
                    } else {
                        proposed_step
                    };
                }
                // In all cases, let's update the step size to whatever was the adapted step size
                self.step_size = step_size * Unit::Second;
                return Ok((self.details.step, next_state));
            } else if step_size.abs() <= min_step
                || self.details.attempts >= self.prop.opts.attempts
            {
                // The step cannot be shrunk any further: the state is left untouched.
                warn!(
                    "Tolerance not met at t = {} after {} attempts (error {:.3e}, step {} s)",
                    self.state.time(),
                    self.details.attempts,
                    self.details.error,
                    step_size
                );
                return Err(PropagationError::ToleranceNotMet {
                    error: self.details.error,
                    tolerance: self.prop.opts.tolerance,
                    time: self.state.time(),
                });
            } else {
                // Error is too high and we aren't using the smallest step, and we haven't hit the max number of attempts.
                // So let's adapt the step size.
                self.details.attempts += 1;
                let proposed_step = 0.9
                    * step_size
                    * (self.prop.opts.tolerance / self.details.error)
                        .powf(1.0 / f64::from(self.prop.order - 1));
                step_size = if proposed_step.abs() < min_step {
                    min_step.copysign(step_size)
                } else {
                    proposed_step
                };
                // Note that we don't set self.step_size, that will be updated right before we return
            }
        }
    }

    /// Copy the details of the latest integration step.
    pub fn latest_details(&self) -> IntegrationDetails {
        self.details
    }
}
