use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

use crate::time::{Time, SECONDS_PER_YEAR};

/// Mass of Mars (kg).
pub const MARS_MASS_KG: f64 = 6.4171e23;

/// A mass flow rate in kg/s.
///
/// Used for the integrated mass-loss rates of a disk cell, which are
/// customarily quoted in planetary masses per year.
///
/// # Examples
///
/// ```rust
/// use units::MassRate;
///
/// let loss = MassRate::from_kg_per_sec(1e6);
/// assert!(loss.to_mars_masses_per_year() > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MassRate(f64); // Base unit: kg/s

impl MassRate {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_kg_per_sec(value: f64) -> Self {
        Self(value)
    }

    pub fn from_mars_masses_per_year(value: f64) -> Self {
        Self(value * MARS_MASS_KG / SECONDS_PER_YEAR)
    }

    pub fn to_kg_per_sec(&self) -> f64 {
        self.0
    }

    pub fn to_mars_masses_per_year(&self) -> f64 {
        self.0 * SECONDS_PER_YEAR / MARS_MASS_KG
    }

    /// Mass (kg) accumulated at this rate over `duration`.
    pub fn integrate(&self, duration: Time) -> f64 {
        self.0 * duration.to_seconds()
    }
}

impl Add for MassRate {
    type Output = MassRate;

    fn add(self, rhs: MassRate) -> MassRate {
        MassRate(self.0 + rhs.0)
    }
}

impl Sub for MassRate {
    type Output = MassRate;

    fn sub(self, rhs: MassRate) -> MassRate {
        MassRate(self.0 - rhs.0)
    }
}

impl Mul<f64> for MassRate {
    type Output = MassRate;

    fn mul(self, rhs: f64) -> MassRate {
        MassRate(self.0 * rhs)
    }
}

impl Div<f64> for MassRate {
    type Output = MassRate;

    fn div(self, rhs: f64) -> MassRate {
        MassRate(self.0 / rhs)
    }
}
