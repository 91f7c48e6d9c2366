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

use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// A ground station which may communicate with the spacecraft.
///
/// This is only a record of a location: the dynamics never consult it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundStation {
    pub name: String,
    /// in degrees
    pub latitude_deg: f64,
    /// in degrees
    pub longitude_deg: f64,
    /// in meters
    pub altitude_m: f64,
}

impl GroundStation {
    pub fn new(name: &str, latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Returns the location as (latitude, longitude, altitude)
    pub fn location(&self) -> (f64, f64, f64) {
        (self.latitude_deg, self.longitude_deg, self.altitude_m)
    }
}

impl fmt::Display for GroundStation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (lat.: {:.4} deg    long.: {:.4} deg    alt.: {:.3} m)",
            self.name, self.latitude_deg, self.longitude_deg, self.altitude_m
        )
    }
}

#[test]
fn ground_station_location() {
    let gs = GroundStation::new("GS1", 0.0, 0.0, 0.0);
    assert_eq!(gs.location(), (0.0, 0.0, 0.0));
    assert_eq!(
        format!("{gs}"),
        "GS1 (lat.: 0.0000 deg    long.: 0.0000 deg    alt.: 0.000 m)"
    );
}
