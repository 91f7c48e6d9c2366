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

extern crate cubesat_sim as cubesim;
extern crate log;
extern crate pretty_env_logger;

use clap::Parser;
use cubesim::io::{ConfigRepr, ScenarioConfig};
use log::{error, info};
use std::env::var;
use std::error::Error;
use std::path::PathBuf;

const LOG_VAR: &str = "CUBESIM_LOG";

/// Propagates the orbit and the attitude of a CubeSat described in a YAML scenario.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the scenario file
    scenario: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filters = var(LOG_VAR).unwrap_or_else(|_| "info".to_string());
    if pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .try_init()
        .is_err()
    {
        eprintln!("could not init logger");
    }

    let scenario = ScenarioConfig::load(&cli.scenario)?;
    for station in &scenario.ground_stations {
        info!("Ground station {station}");
    }

    let mut sim = scenario.simulator()?;
    match sim.run() {
        Ok(traj) => {
            info!("{traj}");
            if let Some(last) = traj.last() {
                info!("Final state {last}");
                let rmag_m = last.position_m.norm();
                match scenario.environment.body_radius_m() {
                    Some(radius_m) => info!(
                        "Final altitude above the Earth mean radius {:.3} km",
                        (rmag_m - radius_m) * 1e-3
                    ),
                    None => info!("Final distance to the central body {:.3} km", rmag_m * 1e-3),
                }
            }
            Ok(())
        }
        Err(e) => {
            if let Some(partial) = e.partial_trajectory() {
                error!("Partial {partial}");
            }
            Err(e.into())
        }
    }
}
