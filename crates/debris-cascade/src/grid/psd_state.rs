//! Per-cell particle size distribution.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use units::{Density, SurfaceDensity};

use crate::error::{ensure_finite, ensure_len, ensure_positive, CascadeError, Result};
use crate::grid::SizeGrid;

/// Mass of a spherical grain of radius `s` (m) and bulk density `rho` (kg/m³).
pub fn grain_mass(s: f64, rho: f64) -> f64 {
    4.0 / 3.0 * PI * rho * s.powi(3)
}

/// Number surface density per size bin for one spatial cell.
///
/// `number[i]` is the count of grains per unit area (m⁻²) in bin `i`.
/// Entries are kept non-negative and finite by [`PsdState::sanitize`].
/// The grid and the per-bin masses are fixed for the lifetime of the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsdState {
    grid: SizeGrid,
    number: Vec<f64>,
    mass: Vec<f64>,
    rho: f64,
}

impl PsdState {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// A state with every bin empty.
    pub fn empty(grid: SizeGrid, rho: Density) -> Result<Self> {
        let n = grid.n_bins();
        Self::from_number(grid, rho, vec![0.0; n])
    }

    /// A state from explicit per-bin number surface densities.
    ///
    /// Negative or non-finite entries are rejected; use [`sanitize`](Self::sanitize)
    /// for recovery after a numerical update, not for input validation.
    pub fn from_number(grid: SizeGrid, rho: Density, number: Vec<f64>) -> Result<Self> {
        let rho = ensure_positive("bulk density", rho.to_kg_per_m3())?;
        ensure_len("number", grid.n_bins(), number.len())?;
        for &value in &number {
            ensure_finite("number", value)?;
            if value < 0.0 {
                return Err(CascadeError::OutOfRange {
                    quantity: "number",
                    value,
                    expected: "must be >= 0",
                });
            }
        }

        let mass = grid.sizes().iter().map(|&s| grain_mass(s, rho)).collect();
        Ok(Self {
            grid,
            number,
            mass,
            rho,
        })
    }

    /// Power-law population dN/ds ∝ s^(-q) holding surface density `sigma`.
    ///
    /// The count in each bin is the integral of s^(-q) over the bin,
    /// then the whole array is scaled so Σ N_i m_i equals `sigma`.
    ///
    /// # Example
    /// ```
    /// use debris_cascade::grid::{PsdState, SizeGrid};
    /// use units::{Density, SurfaceDensity};
    ///
    /// let grid = SizeGrid::geometric(1e-6, 1.0, 40).unwrap();
    /// let psd = PsdState::power_law(
    ///     grid,
    ///     Density::from_kg_per_m3(3000.0),
    ///     3.5,
    ///     SurfaceDensity::from_kg_per_m2(1e-3),
    /// )
    /// .unwrap();
    /// assert!((psd.surface_density().to_kg_per_m2() - 1e-3).abs() < 1e-15);
    /// ```
    pub fn power_law(grid: SizeGrid, rho: Density, q: f64, sigma: SurfaceDensity) -> Result<Self> {
        ensure_finite("power-law index", q)?;
        let sigma = sigma.to_kg_per_m2();
        ensure_finite("surface density", sigma)?;
        if sigma < 0.0 {
            return Err(CascadeError::OutOfRange {
                quantity: "surface density",
                value: sigma,
                expected: "must be >= 0",
            });
        }

        let shape: Vec<f64> = grid
            .edges()
            .windows(2)
            .map(|e| power_integral(e[0], e[1], q))
            .collect();

        let mut state = Self::from_number(grid, rho, shape)?;
        let unscaled = state.surface_density().to_kg_per_m2();
        if unscaled > 0.0 {
            let scale = sigma / unscaled;
            state.number.iter_mut().for_each(|n| *n *= scale);
        }
        Ok(state)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn grid(&self) -> &SizeGrid {
        &self.grid
    }

    pub fn n_bins(&self) -> usize {
        self.number.len()
    }

    /// Bin centre sizes (m).
    pub fn sizes(&self) -> &[f64] {
        self.grid.sizes()
    }

    /// Number surface density per bin (m⁻²).
    pub fn number(&self) -> &[f64] {
        &self.number
    }

    /// Mutable access for in-place updates. Callers must [`sanitize`](Self::sanitize)
    /// afterwards if the update can produce negative or non-finite values.
    pub fn number_mut(&mut self) -> &mut [f64] {
        &mut self.number
    }

    /// Per-grain mass of each bin (kg).
    pub fn mass(&self) -> &[f64] {
        &self.mass
    }

    /// Bulk density (kg/m³).
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Mass surface density in each bin (kg/m²).
    pub fn mass_per_bin(&self) -> Vec<f64> {
        self.number
            .iter()
            .zip(&self.mass)
            .map(|(n, m)| n * m)
            .collect()
    }

    /// Σ = Σ_i N_i m_i
    pub fn surface_density(&self) -> SurfaceDensity {
        SurfaceDensity::from_kg_per_m2(total_mass(&self.number, &self.mass))
    }

    /// Replace the whole number array. The length must match the grid.
    pub fn set_number(&mut self, number: &[f64]) -> Result<()> {
        ensure_len("number", self.n_bins(), number.len())?;
        self.number.copy_from_slice(number);
        self.sanitize();
        Ok(())
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Clamp negative, NaN and infinite entries to zero.
    ///
    /// Returns the number of entries that were changed. Applying it to an
    /// already sanitized state changes nothing.
    pub fn sanitize(&mut self) -> usize {
        sanitize_slice(&mut self.number)
    }

    pub fn is_sanitized(&self) -> bool {
        self.number.iter().all(|n| n.is_finite() && *n >= 0.0)
    }
}

/// Σ_i n_i m_i over two parallel slices.
pub(crate) fn total_mass(number: &[f64], mass: &[f64]) -> f64 {
    number.iter().zip(mass).map(|(n, m)| n * m).sum()
}

pub(crate) fn sanitize_slice(values: &mut [f64]) -> usize {
    let mut changed = 0;
    for v in values.iter_mut() {
        if !v.is_finite() || *v < 0.0 {
            *v = 0.0;
            changed += 1;
        }
    }
    changed
}

/// ∫_a^b s^(-q) ds, with the logarithmic limit at q = 1.
pub(crate) fn power_integral(a: f64, b: f64, q: f64) -> f64 {
    let exponent = 1.0 - q;
    if exponent.abs() < 1e-10 {
        (b / a).ln()
    } else {
        (b.powf(exponent) - a.powf(exponent)) / exponent
    }
}
