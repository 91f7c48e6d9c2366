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

use super::{Sample, Trajectory};
use crate::cosmic::Spacecraft;
use crate::dynamics::SpacecraftDynamics;
use crate::errors::SimError;
use crate::io::ConfigError;
use crate::propagators::{IntegratorKind, PropOpts, Propagator, RSSSpacecraftStep};
use crate::time::{Duration, Unit};
use std::fmt;
use std::time::Instant;

/// Sampling of a run: one sample every `time_step`, over `total_duration`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub time_step: Duration,
    pub total_duration: Duration,
}

impl RunConfig {
    /// Fails if either duration is not strictly positive.
    pub fn new(time_step: Duration, total_duration: Duration) -> Result<Self, ConfigError> {
        if time_step <= Duration::ZERO {
            return Err(ConfigError::InvalidConfig {
                msg: format!("time step must be strictly positive, got {time_step}"),
            });
        }
        if total_duration <= Duration::ZERO {
            return Err(ConfigError::InvalidConfig {
                msg: format!("total duration must be strictly positive, got {total_duration}"),
            });
        }
        Ok(Self {
            time_step,
            total_duration,
        })
    }

    pub fn from_seconds(time_step_s: f64, total_duration_s: f64) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("time step", time_step_s),
            ("total duration", total_duration_s),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidConfig {
                    msg: format!("{name} must be finite, got {value} s"),
                });
            }
        }
        Self::new(time_step_s * Unit::Second, total_duration_s * Unit::Second)
    }

    /// Number of samples of the run, i.e. `floor(total_duration / time_step)`.
    ///
    /// The last sample is at `(n - 1) * time_step`, so an exact multiple does not include `total_duration` itself.
    pub fn num_samples(&self) -> usize {
        let step_ns = self.time_step.total_nanoseconds();
        if step_ns <= 0 {
            return 0;
        }
        usize::try_from(self.total_duration.total_nanoseconds() / step_ns).unwrap_or(0)
    }

    /// Offset of the i-th sample from the start of the run
    pub fn sample_offset(&self, i: usize) -> Duration {
        self.time_step * (i as i64)
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} samples every {} over {}",
            self.num_samples(),
            self.time_step,
            self.total_duration
        )
    }
}

/// The simulator owns the spacecraft, its dynamics, the sampling of the run, the integration method and
/// the propagator options.
///
/// Each call to [Simulator::run] starts from the current state of the spacecraft, and leaves the spacecraft
/// at the last recorded sample.
#[derive(Clone, Debug)]
pub struct Simulator {
    pub spacecraft: Spacecraft,
    pub dynamics: SpacecraftDynamics,
    pub run: RunConfig,
    pub method: IntegratorKind,
    pub opts: PropOpts<RSSSpacecraftStep>,
}

impl Simulator {
    /// Initializes a simulator with the default Dormand Prince 4-5 options.
    ///
    /// Fails if the spacecraft state is not finite or if its attitude cannot be normalized.
    pub fn new(
        spacecraft: Spacecraft,
        dynamics: SpacecraftDynamics,
        run: RunConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_opts(spacecraft, dynamics, run, PropOpts::default())
    }

    pub fn with_opts(
        mut spacecraft: Spacecraft,
        dynamics: SpacecraftDynamics,
        run: RunConfig,
        opts: PropOpts<RSSSpacecraftStep>,
    ) -> Result<Self, ConfigError> {
        if !spacecraft.is_finite() {
            return Err(ConfigError::InvalidConfig {
                msg: format!("initial state must be finite, got {spacecraft}"),
            });
        }
        spacecraft.attitude =
            spacecraft
                .unit_attitude()
                .ok_or_else(|| ConfigError::InvalidConfig {
                    msg: format!(
                        "initial attitude must have a non zero norm, got {}",
                        spacecraft.attitude
                    ),
                })?;

        validate_opts(&opts)?;

        Ok(Self {
            spacecraft,
            dynamics,
            run,
            method: IntegratorKind::default(),
            opts,
        })
    }

    /// Sets the integration method of the subsequent runs.
    pub fn with_method(mut self, method: IntegratorKind) -> Self {
        self.method = method;
        self
    }

    /// Propagates the spacecraft and records one sample at each `t_i = t_0 + i * time_step`.
    ///
    /// If the integration fails, the error carries every sample recorded so far along with its cause.
    pub fn run(&mut self) -> Result<Trajectory, SimError> {
        let num_samples = self.run.num_samples();
        let start = self.spacecraft.time;
        info!("Running {} from t = {}", self.run, start);
        debug!("Dynamics: {}", self.dynamics);
        debug!("Propagator: {} with {}", self.method, self.opts);

        let tick = Instant::now();
        let prop = Propagator::from_kind(self.method, self.dynamics.clone(), self.opts);
        let mut instance = prop.with(self.spacecraft);
        let mut traj = Trajectory::with_capacity(num_samples);
        let mut last_state = self.spacecraft;

        for i in 0..num_samples {
            match instance.until(start + self.run.sample_offset(i)) {
                Ok(state) => {
                    traj.push(Sample::from(&state));
                    last_state = state;
                }
                Err(source) => {
                    error!(
                        "Run truncated after {} of {} samples: {}",
                        traj.len(),
                        num_samples,
                        source
                    );
                    self.spacecraft = last_state;
                    return Err(SimError::IntegrationFailure {
                        traj: Box::new(traj),
                        source,
                    });
                }
            }
        }

        self.spacecraft = last_state;
        let tock: Duration = tick.elapsed().into();
        info!(
            "Recorded {} samples in {} ({} steps)",
            traj.len(),
            tock,
            instance.steps_taken
        );
        Ok(traj)
    }
}

fn validate_opts(opts: &PropOpts<RSSSpacecraftStep>) -> Result<(), ConfigError> {
    if opts.init_step <= Duration::ZERO || opts.min_step <= Duration::ZERO {
        return Err(ConfigError::InvalidConfig {
            msg: format!("propagator steps must be strictly positive ({opts})"),
        });
    }
    if opts.max_steps == 0 {
        return Err(ConfigError::InvalidConfig {
            msg: "propagator must allow at least one step".to_string(),
        });
    }
    if !opts.fixed_step {
        if opts.max_step < opts.min_step {
            return Err(ConfigError::InvalidConfig {
                msg: format!("maximum step is smaller than the minimum step ({opts})"),
            });
        }
        if !(opts.tolerance > 0.0 && opts.tolerance.is_finite()) || opts.attempts == 0 {
            return Err(ConfigError::InvalidConfig {
                msg: format!("adaptive step needs a positive tolerance and attempts ({opts})"),
            });
        }
    }
    Ok(())
}
