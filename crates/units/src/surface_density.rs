use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

use crate::mass_rate::MassRate;
use crate::time::Time;

/// A surface mass density (mass per area) in kg/m².
///
/// The aggregate of a particle size distribution in one disk cell,
/// Σ = Σ_i N_i m_i, is reported in this unit.
///
/// # Examples
///
/// ```rust
/// use units::SurfaceDensity;
///
/// let sigma = SurfaceDensity::from_grams_per_cm2(1.0);
/// assert_eq!(sigma.to_kg_per_m2(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SurfaceDensity(f64); // Base unit: kg/m²

impl SurfaceDensity {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_kg_per_m2(value: f64) -> Self {
        Self(value)
    }

    pub fn from_grams_per_cm2(value: f64) -> Self {
        Self(value * 10.0)
    }

    pub fn to_kg_per_m2(&self) -> f64 {
        self.0
    }

    pub fn to_grams_per_cm2(&self) -> f64 {
        self.0 / 10.0
    }
}

impl Add for SurfaceDensity {
    type Output = SurfaceDensity;

    fn add(self, rhs: SurfaceDensity) -> SurfaceDensity {
        SurfaceDensity(self.0 + rhs.0)
    }
}

impl Sub for SurfaceDensity {
    type Output = SurfaceDensity;

    fn sub(self, rhs: SurfaceDensity) -> SurfaceDensity {
        SurfaceDensity(self.0 - rhs.0)
    }
}

impl Mul<f64> for SurfaceDensity {
    type Output = SurfaceDensity;

    fn mul(self, rhs: f64) -> SurfaceDensity {
        SurfaceDensity(self.0 * rhs)
    }
}

impl Div<f64> for SurfaceDensity {
    type Output = SurfaceDensity;

    fn div(self, rhs: f64) -> SurfaceDensity {
        SurfaceDensity(self.0 / rhs)
    }
}

impl Div<Time> for SurfaceDensity {
    type Output = SurfaceDensityRate;

    fn div(self, rhs: Time) -> SurfaceDensityRate {
        SurfaceDensityRate(self.0 / rhs.to_seconds())
    }
}

/// Rate of change of surface density in kg m⁻² s⁻¹.
///
/// External mass production and the blow-out/sublimation outflows of a
/// cell are all expressed in this unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SurfaceDensityRate(f64); // Base unit: kg m⁻² s⁻¹

impl SurfaceDensityRate {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_kg_per_m2_per_sec(value: f64) -> Self {
        Self(value)
    }

    pub fn to_kg_per_m2_per_sec(&self) -> f64 {
        self.0
    }

    /// Total mass rate through an area of `area_m2` square metres.
    pub fn over_area(&self, area_m2: f64) -> MassRate {
        MassRate::from_kg_per_sec(self.0 * area_m2)
    }
}

impl Mul<Time> for SurfaceDensityRate {
    type Output = SurfaceDensity;

    fn mul(self, rhs: Time) -> SurfaceDensity {
        SurfaceDensity(self.0 * rhs.to_seconds())
    }
}

impl Add for SurfaceDensityRate {
    type Output = SurfaceDensityRate;

    fn add(self, rhs: SurfaceDensityRate) -> SurfaceDensityRate {
        SurfaceDensityRate(self.0 + rhs.0)
    }
}
