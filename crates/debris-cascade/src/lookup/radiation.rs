//! Radiation pressure efficiency table and blow-out size.
//!
//! # Physics
//!
//! The ratio of radiation pressure to stellar gravity for a grain of
//! radius s and bulk density ρ is (Burns, Lamy & Soter 1979)
//!
//! ```text
//! β(s) = 3 L Q_pr(s, T) / (16 π c G M ρ s)
//! ```
//!
//! Grains released on circular orbits become unbound for β ≥ ½. The
//! blow-out radius is the fixed point of s = 3 L Q_pr(s, T) / (8 π c G M ρ).

use std::f64::consts::PI;

use units::G;

use crate::error::{CascadeError, Result};
use crate::lookup::{ClampKind, ClampStats};

/// Speed of light (m/s)
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e8;

/// Nominal solar luminosity (W)
pub const SOLAR_LUMINOSITY_W: f64 = 3.828e26;

/// Wien displacement constant (m K)
const WIEN_B: f64 = 2.897_771_955e-3;

/// Star parameters for β and the blow-out radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiationInputs {
    /// Stellar luminosity (W)
    pub luminosity: f64,
    /// Mass of the central body the grains orbit (kg)
    pub central_mass: f64,
    /// Radiation temperature for the Q_pr table (K)
    pub temperature: f64,
}

/// Q_pr tabulated over grain size and temperature.
///
/// Interpolation is bilinear in (ln s, T). Inputs outside the table are
/// clamped to its edges and reported to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct QprTable {
    log_sizes: Vec<f64>,
    temperatures: Vec<f64>,
    /// Row-major, one row per temperature
    values: Vec<f64>,
}

/// Result of a table evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct QprSample {
    pub value: f64,
    pub size_clamped: bool,
    pub temperature_clamped: bool,
}

impl QprTable {
    /// Table from sizes (m), temperatures (K) and `values[t][s]`.
    pub fn new(sizes: &[f64], temperatures: &[f64], values: Vec<f64>) -> Result<Self> {
        let strictly_increasing = |v: &[f64]| v.windows(2).all(|w| w[1] > w[0]);
        if sizes.len() < 2 || temperatures.len() < 2 {
            return Err(CascadeError::InvalidConfig(
                "Q_pr table needs at least 2 sizes and 2 temperatures".into(),
            ));
        }
        if sizes.iter().any(|s| !(s.is_finite() && *s > 0.0)) || !strictly_increasing(sizes) {
            return Err(CascadeError::InvalidConfig(
                "Q_pr table sizes must be positive and increasing".into(),
            ));
        }
        if temperatures.iter().any(|t| !t.is_finite()) || !strictly_increasing(temperatures) {
            return Err(CascadeError::InvalidConfig(
                "Q_pr table temperatures must be finite and increasing".into(),
            ));
        }
        if values.len() != sizes.len() * temperatures.len() {
            return Err(CascadeError::InvalidConfig(format!(
                "Q_pr table needs {} values, got {}",
                sizes.len() * temperatures.len(),
                values.len()
            )));
        }
        if values.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(CascadeError::InvalidConfig(
                "Q_pr values must be finite and >= 0".into(),
            ));
        }

        Ok(Self {
            log_sizes: sizes.iter().map(|s| s.ln()).collect(),
            temperatures: temperatures.to_vec(),
            values,
        })
    }

    /// Grey-body approximation Q_pr = x / (1 + x), x = 2πs / λ_peak(T).
    ///
    /// Used when no optical-constants table is supplied. 0.1 µm to 10 cm,
    /// 1000 K to 10000 K.
    pub fn grey_body() -> Self {
        let sizes: Vec<f64> = (0..=60).map(|k| 1e-7 * 10f64.powf(k as f64 / 10.0)).collect();
        let temperatures: Vec<f64> = (0..=18).map(|k| 1000.0 + 500.0 * k as f64).collect();
        let mut values = Vec::with_capacity(sizes.len() * temperatures.len());
        for &t in &temperatures {
            let lambda_peak = WIEN_B / t;
            for &s in &sizes {
                let x = 2.0 * PI * s / lambda_peak;
                values.push(x / (1.0 + x));
            }
        }
        Self {
            log_sizes: sizes.iter().map(|s| s.ln()).collect(),
            temperatures,
            values,
        }
    }

    pub fn size_range(&self) -> (f64, f64) {
        (
            self.log_sizes[0].exp(),
            self.log_sizes[self.log_sizes.len() - 1].exp(),
        )
    }

    pub fn temperature_range(&self) -> (f64, f64) {
        (self.temperatures[0], self.temperatures[self.temperatures.len() - 1])
    }

    pub(crate) fn sample(&self, s: f64, temperature: f64) -> QprSample {
        let (x, size_clamped) = bracket(&self.log_sizes, s.ln());
        let (y, temperature_clamped) = bracket(&self.temperatures, temperature);

        let ns = self.log_sizes.len();
        let at = |ti: usize, si: usize| self.values[ti * ns + si];
        let (i0, fx) = x;
        let (j0, fy) = y;
        let lower = at(j0, i0) * (1.0 - fx) + at(j0, i0 + 1) * fx;
        let upper = at(j0 + 1, i0) * (1.0 - fx) + at(j0 + 1, i0 + 1) * fx;

        QprSample {
            value: lower * (1.0 - fy) + upper * fy,
            size_clamped,
            temperature_clamped,
        }
    }

    /// Q_pr at size `s` (m) and temperature (K), clamping silently.
    pub fn qpr(&self, s: f64, temperature: f64) -> f64 {
        self.sample(s, temperature).value
    }
}

/// Lower cell index and fractional position of `x` in `axis`, clamped.
fn bracket(axis: &[f64], x: f64) -> ((usize, f64), bool) {
    let last = axis.len() - 1;
    if x.is_nan() || x <= axis[0] {
        return ((0, 0.0), x.is_nan() || x < axis[0]);
    }
    if x >= axis[last] {
        return ((last - 1, 1.0), x > axis[last]);
    }
    let upper = axis.partition_point(|&a| a <= x);
    let i = upper - 1;
    ((i, (x - axis[i]) / (axis[i + 1] - axis[i])), false)
}

/// β for a grain of radius `s` (m), bulk density `rho` (kg/m³) and efficiency `qpr`.
pub fn radiation_beta(qpr: f64, s: f64, rho: f64, star: &RadiationInputs) -> f64 {
    3.0 * star.luminosity * qpr / (16.0 * PI * SPEED_OF_LIGHT * G * star.central_mass * rho * s)
}

/// Fixed-point iteration for the blow-out radius, counting clamped lookups.
pub(crate) fn solve_blowout_radius(
    table: &QprTable,
    rho: f64,
    star: &RadiationInputs,
    clamps: &ClampStats,
) -> f64 {
    let prefactor = 3.0 * star.luminosity / (8.0 * PI * SPEED_OF_LIGHT * G * star.central_mass * rho);
    let mut s = prefactor;
    for _ in 0..100 {
        let sample = table.sample(s, star.temperature);
        if sample.size_clamped {
            clamps.record(ClampKind::QprSize);
        }
        if sample.temperature_clamped {
            clamps.record(ClampKind::QprTemperature);
        }
        let next = prefactor * sample.value;
        if (next - s).abs() <= 1e-10 * s.abs() {
            return next;
        }
        s = next;
    }
    s
}
