//! External mass supply.
//!
//! Production (for example from impact ejecta or a feeding reservoir) adds
//! surface density at a prescribed rate, spread over an injection window
//! of sizes. Both modes use the same membership rule: a bin takes supply
//! only if its centre lies in [s_inj_min, s_inj_max], since injected grains
//! are counted at the centre size. For a power-law injection dN/ds ∝ s^(-q),
//! the mass injected into a member bin is proportional to ∫ s^(1-q) ds over
//! the part of the bin inside the window.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_len, ensure_non_negative, CascadeError, Result};
use crate::grid::SizeGrid;

/// How production is distributed over sizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum SupplyMode {
    /// No external supply.
    #[default]
    Off,

    /// dN/ds ∝ s^(-q) on [s_inj_min, s_inj_max] (m).
    PowerLaw {
        s_inj_min: f64,
        s_inj_max: f64,
        q: f64,
    },

    /// Per-bin mass weights on [s_inj_min, s_inj_max] (m).
    DiscreteBins {
        s_inj_min: f64,
        s_inj_max: f64,
        weights: Vec<f64>,
    },
}

impl SupplyMode {
    pub fn validate(&self) -> Result<()> {
        let check_window = |s_min: f64, s_max: f64| {
            if s_min > 0.0 && s_max > s_min && s_max.is_finite() {
                Ok(())
            } else {
                Err(CascadeError::InvalidConfig(format!(
                    "supply window must satisfy 0 < s_inj_min < s_inj_max, got [{s_min}, {s_max}]"
                )))
            }
        };
        match self {
            Self::Off => Ok(()),
            Self::PowerLaw {
                s_inj_min,
                s_inj_max,
                q,
            } => {
                check_window(*s_inj_min, *s_inj_max)?;
                if q.is_finite() {
                    Ok(())
                } else {
                    Err(CascadeError::InvalidConfig(format!("supply index q must be finite, got {q}")))
                }
            }
            Self::DiscreteBins {
                s_inj_min,
                s_inj_max,
                weights,
            } => {
                check_window(*s_inj_min, *s_inj_max)?;
                if weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
                    return Err(CascadeError::InvalidConfig(
                        "supply weights must be finite and >= 0".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Converts a production mass rate into a per-bin number source.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplySource {
    mode: SupplyMode,
}

impl SupplySource {
    pub fn new(mode: SupplyMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &SupplyMode {
        &self.mode
    }

    /// Fraction of the production mass going to each bin. Sums to one
    /// unless the supply is off.
    pub fn mass_fractions(&self, grid: &SizeGrid) -> Result<Vec<f64>> {
        let n = grid.n_bins();
        let mut fractions = vec![0.0; n];

        let (s_min, s_max) = match &self.mode {
            SupplyMode::Off => return Ok(fractions),
            SupplyMode::PowerLaw {
                s_inj_min,
                s_inj_max,
                q,
            } => {
                for bin in grid.bins() {
                    if !in_window(bin.center, *s_inj_min, *s_inj_max) {
                        continue;
                    }
                    let lo = bin.left.max(*s_inj_min);
                    let hi = bin.right.min(*s_inj_max);
                    if hi > lo {
                        fractions[bin.index] = mass_integral(lo, hi, *q);
                    }
                }
                (*s_inj_min, *s_inj_max)
            }
            SupplyMode::DiscreteBins {
                s_inj_min,
                s_inj_max,
                weights,
            } => {
                ensure_len("supply weights", n, weights.len())?;
                for (k, &s) in grid.sizes().iter().enumerate() {
                    if in_window(s, *s_inj_min, *s_inj_max) {
                        fractions[k] = weights[k];
                    }
                }
                (*s_inj_min, *s_inj_max)
            }
        };

        let total: f64 = fractions.iter().sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(CascadeError::EmptySupplyWindow { s_min, s_max });
        }
        fractions.iter_mut().for_each(|f| *f /= total);
        Ok(fractions)
    }

    /// Number source dN_k/dt (m⁻² s⁻¹) for a production rate in kg m⁻² s⁻¹.
    pub fn number_rates(&self, grid: &SizeGrid, mass: &[f64], production: f64) -> Result<Vec<f64>> {
        ensure_len("mass", grid.n_bins(), mass.len())?;
        ensure_non_negative("production rate", production)?;
        if production == 0.0 || self.mode == SupplyMode::Off {
            return Ok(vec![0.0; grid.n_bins()]);
        }

        let fractions = self.mass_fractions(grid)?;
        Ok(fractions
            .iter()
            .zip(mass)
            .map(|(&f, &m)| if f > 0.0 && m > 0.0 { production * f / m } else { 0.0 })
            .collect())
    }
}

fn in_window(center: f64, s_min: f64, s_max: f64) -> bool {
    center >= s_min && center <= s_max
}

/// ∫_a^b s^(1-q) ds, logarithmic at q = 2.
fn mass_integral(a: f64, b: f64, q: f64) -> f64 {
    let exponent = 2.0 - q;
    if exponent.abs() < 1e-10 {
        (b / a).ln()
    } else {
        (b.powf(exponent) - a.powf(exponent)) / exponent
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::grid::{grain_mass, total_mass};

    fn grid() -> SizeGrid {
        SizeGrid::geometric(1e-6, 1.0, 24).unwrap()
    }

    fn masses(grid: &SizeGrid) -> Vec<f64> {
        grid.sizes().iter().map(|&s| grain_mass(s, 3000.0)).collect()
    }

    #[test]
    fn power_law_injects_only_inside_window() {
        let grid = grid();
        let source = SupplySource::new(SupplyMode::PowerLaw {
            s_inj_min: 1e-4,
            s_inj_max: 1e-2,
            q: 3.5,
        });

        let rates = source.number_rates(&grid, &masses(&grid), 1e-9).unwrap();

        for (bin, rate) in grid.bins().zip(&rates) {
            if bin.center < 1e-4 || bin.center > 1e-2 {
                assert_eq!(*rate, 0.0, "bin {} injected outside window", bin.index);
            } else {
                assert!(*rate > 0.0);
            }
        }
    }

    #[test]
    fn injected_mass_equals_production() {
        let grid = grid();
        let mass = masses(&grid);
        let source = SupplySource::new(SupplyMode::PowerLaw {
            s_inj_min: 3e-5,
            s_inj_max: 2e-3,
            q: 2.0,
        });

        let rates = source.number_rates(&grid, &mass, 4e-10).unwrap();

        assert_relative_eq!(total_mass(&rates, &mass), 4e-10, max_relative = 1e-12);
    }

    #[test]
    fn discrete_weights_are_masked_to_window() {
        let grid = grid();
        let weights = vec![1.0; 24];
        let source = SupplySource::new(SupplyMode::DiscreteBins {
            s_inj_min: 1e-3,
            s_inj_max: 1e-1,
            weights,
        });

        let fractions = source.mass_fractions(&grid).unwrap();

        for (s, f) in grid.sizes().iter().zip(&fractions) {
            if *s < 1e-3 || *s > 1e-1 {
                assert_eq!(*f, 0.0);
            }
        }
        assert_relative_eq!(fractions.iter().sum::<f64>(), 1.0, max_relative = 1e-14);
    }

    #[test]
    fn both_modes_select_bins_by_centre() {
        let grid = grid();
        // Cuts the bin [1e-4, 1.78e-4] above its centre
        let (s_inj_min, s_inj_max) = (1.5e-4, 1e-2);
        let power_law = SupplySource::new(SupplyMode::PowerLaw { s_inj_min, s_inj_max, q: 3.5 })
            .mass_fractions(&grid)
            .unwrap();
        let discrete = SupplySource::new(SupplyMode::DiscreteBins {
            s_inj_min,
            s_inj_max,
            weights: vec![1.0; 24],
        })
        .mass_fractions(&grid)
        .unwrap();

        let cut = grid.bins().find(|b| b.left < s_inj_min && b.right > s_inj_min).unwrap();
        assert!(cut.center < s_inj_min);
        assert_eq!(power_law[cut.index], 0.0);
        for (p, d) in power_law.iter().zip(&discrete) {
            assert_eq!(*p > 0.0, *d > 0.0);
        }
    }

    #[test]
    fn window_outside_grid_is_an_error() {
        let grid = grid();
        let source = SupplySource::new(SupplyMode::PowerLaw {
            s_inj_min: 10.0,
            s_inj_max: 100.0,
            q: 3.5,
        });

        assert!(matches!(
            source.number_rates(&grid, &masses(&grid), 1e-9),
            Err(CascadeError::EmptySupplyWindow { .. })
        ));
    }

    #[test]
    fn zero_production_or_off_gives_zero() {
        let grid = grid();
        let off = SupplySource::new(SupplyMode::Off);
        assert!(off.number_rates(&grid, &masses(&grid), 1.0).unwrap().iter().all(|&r| r == 0.0));

        let on = SupplySource::new(SupplyMode::PowerLaw {
            s_inj_min: 1e-4,
            s_inj_max: 1e-2,
            q: 3.5,
        });
        assert!(on.number_rates(&grid, &masses(&grid), 0.0).unwrap().iter().all(|&r| r == 0.0));
        assert!(on.number_rates(&grid, &masses(&grid), -1.0).is_err());
    }

    #[test]
    fn validation() {
        assert!(SupplyMode::Off.validate().is_ok());
        let reversed = SupplyMode::PowerLaw {
            s_inj_min: 1e-2,
            s_inj_max: 1e-4,
            q: 3.5,
        };
        assert!(reversed.validate().is_err());
        let negative = SupplyMode::DiscreteBins {
            s_inj_min: 1e-4,
            s_inj_max: 1e-2,
            weights: vec![-1.0],
        };
        assert!(negative.validate().is_err());
    }
}
