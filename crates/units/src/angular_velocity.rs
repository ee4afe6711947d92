use serde::{Deserialize, Serialize};

use crate::length::Length;
use crate::time::Time;
use crate::velocity::G;

/// Angular velocity in rad/s
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AngularVelocity(f64);

impl AngularVelocity {
    pub fn from_rad_per_sec(value: f64) -> Self {
        Self(value)
    }

    /// Keplerian orbital frequency Ω = √(G M / r³).
    pub fn keplerian(central_mass_kg: f64, r: Length) -> Self {
        let r_m = r.to_meters();
        Self((G * central_mass_kg / (r_m * r_m * r_m)).sqrt())
    }

    pub fn to_rad_per_sec(&self) -> f64 {
        self.0
    }

    /// Orbital period 2π/Ω.
    pub fn orbital_period(&self) -> Time {
        Time::from_seconds(2.0 * std::f64::consts::PI / self.0)
    }
}
