use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

use crate::length::Length;

/// Gravitational constant (m³ kg⁻¹ s⁻²)
pub const G: f64 = 6.674_30e-11;

/// Circular Keplerian speed around a body of mass `central_mass_kg`.
///
/// ```text
/// v_K = √(G M / r)
/// ```
///
/// # Examples
/// ```
/// use units::{circular_orbital_velocity, Length, MARS_MASS_KG};
///
/// let v = circular_orbital_velocity(MARS_MASS_KG, Length::from_mars_radii(2.0));
/// // ~2.5 km/s at two Mars radii
/// assert!((v.to_km_per_sec() - 2.5).abs() < 0.1);
/// ```
pub fn circular_orbital_velocity(central_mass_kg: f64, r: Length) -> Velocity {
    Velocity((G * central_mass_kg / r.to_meters()).sqrt())
}

/// A speed in m/s.
///
/// Used both for orbital and relative impact speeds, and for the rate of
/// change of a grain radius (ds/dt), which has the same dimension.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Velocity(f64); // Base unit: m/s

impl Velocity {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_meters_per_sec(value: f64) -> Self {
        Self(value)
    }

    pub fn from_km_per_sec(value: f64) -> Self {
        Self(value * 1e3)
    }

    /// Grain-radius change rate in microns per year.
    pub fn from_microns_per_year(value: f64) -> Self {
        Self(value * 1e-6 / crate::time::SECONDS_PER_YEAR)
    }

    pub fn to_meters_per_sec(&self) -> f64 {
        self.0
    }

    pub fn to_km_per_sec(&self) -> f64 {
        self.0 / 1e3
    }
}

impl Add for Velocity {
    type Output = Velocity;

    fn add(self, rhs: Velocity) -> Velocity {
        Velocity(self.0 + rhs.0)
    }
}

impl Sub for Velocity {
    type Output = Velocity;

    fn sub(self, rhs: Velocity) -> Velocity {
        Velocity(self.0 - rhs.0)
    }
}

impl Mul<f64> for Velocity {
    type Output = Velocity;

    fn mul(self, rhs: f64) -> Velocity {
        Velocity(self.0 * rhs)
    }
}

impl Div<f64> for Velocity {
    type Output = Velocity;

    fn div(self, rhs: f64) -> Velocity {
        Velocity(self.0 / rhs)
    }
}
