//! Uniform size drift with mass-preserving rebinning.
//!
//! Every populated bin moves to s' = s + (ds/dt) dt and its mass is split
//! between the two grid centres bracketing s' so that both the mass and
//! the mass-weighted mean size are preserved.
//!
//! With mass-conserving sublimation enabled, bins that start above the
//! blow-out size and drift to or below it within the step are handed to the
//! blow-out channel whole. The sublimation channel books nothing for them.
//! Bins already at or below the blow-out size are rebinned like any other
//! and left to the blow-out sink's rate.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_len, ensure_non_negative, CascadeError, Result};
use crate::grid::{grain_mass, sanitize_slice, SizeGrid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SublimationConfig {
    pub enabled: bool,
    /// Book blow-out crossings to blow-out and keep all other mass
    pub mass_conserving: bool,
    /// Smallest size a drifted bin may land on (m); defaults to the first centre
    pub floor_size: Option<f64>,
}

impl Default for SublimationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mass_conserving: true,
            floor_size: None,
        }
    }
}

impl SublimationConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(floor) = self.floor_size {
            if !(floor > 0.0 && floor.is_finite()) {
                return Err(CascadeError::InvalidConfig(format!(
                    "sublimation floor size must be positive, got {floor}"
                )));
            }
        }
        Ok(())
    }
}

/// Surface density (kg/m²) removed by one drift, per channel.
///
/// `sublimation` is negative when condensation adds mass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriftOutcome {
    pub blowout: f64,
    pub sublimation: f64,
    /// Bins that started above the blow-out size and drifted to or below it
    pub crossed_bins: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SublimationDrift {
    config: SublimationConfig,
}

impl SublimationDrift {
    pub fn new(config: SublimationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SublimationConfig {
        &self.config
    }

    /// Shift every bin by `ds_dt × dt` and rebin in place.
    ///
    /// `mass` holds the per-grain mass of each bin at density `rho`.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        number: &mut [f64],
        grid: &SizeGrid,
        mass: &[f64],
        rho: f64,
        ds_dt: f64,
        dt: f64,
        a_blow: f64,
    ) -> Result<DriftOutcome> {
        let n = grid.n_bins();
        ensure_len("number", n, number.len())?;
        ensure_len("mass", n, mass.len())?;
        ensure_finite("ds_dt", ds_dt)?;
        ensure_non_negative("dt", dt)?;
        ensure_non_negative("a_blow", a_blow)?;

        let shift = ds_dt * dt;
        if !self.config.enabled || shift == 0.0 {
            return Ok(DriftOutcome::default());
        }

        let centers = grid.sizes();
        let floor = self.config.floor_size.unwrap_or(centers[0]).max(centers[0]);
        let top = centers[n - 1];

        let mut shifted = vec![0.0; n];
        let mut outcome = DriftOutcome::default();

        for i in 0..n {
            let count = number[i];
            if count <= 0.0 {
                continue;
            }
            let bin_mass = count * mass[i];
            let s_new = centers[i] + shift;

            let kept_mass = if self.config.mass_conserving {
                if centers[i] > a_blow && s_new <= a_blow {
                    outcome.blowout += bin_mass;
                    outcome.crossed_bins += 1;
                    continue;
                }
                bin_mass
            } else {
                if s_new <= 0.0 {
                    outcome.sublimation += bin_mass;
                    continue;
                }
                let remaining = count * grain_mass(s_new, rho);
                outcome.sublimation += bin_mass - remaining;
                remaining
            };

            deposit(&mut shifted, centers, s_new.clamp(floor, top), kept_mass, mass);
        }

        number.copy_from_slice(&shifted);
        sanitize_slice(number);
        Ok(outcome)
    }
}

/// Split `bin_mass` between the centres bracketing `s`, linear in size.
fn deposit(number: &mut [f64], centers: &[f64], s: f64, bin_mass: f64, mass: &[f64]) {
    let n = centers.len();
    let upper = centers.partition_point(|&c| c < s);
    if upper == 0 {
        number[0] += bin_mass / mass[0];
        return;
    }
    if upper >= n {
        number[n - 1] += bin_mass / mass[n - 1];
        return;
    }

    let lo = upper - 1;
    let hi = upper;
    let frac_hi = (s - centers[lo]) / (centers[hi] - centers[lo]);
    number[lo] += bin_mass * (1.0 - frac_hi) / mass[lo];
    number[hi] += bin_mass * frac_hi / mass[hi];
}
