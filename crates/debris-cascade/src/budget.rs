//! Per-step mass conservation audit.
//!
//! ```text
//! error = |M_after + extra × dt - (M_before + production × dt)| / baseline
//! ```
//!
//! `extra` is the rate of mass that left the size distribution through
//! tracked channels (blow-out, sublimation). The baseline is M_before when
//! positive, otherwise max(M_before + production × dt, floor).

use serde::{Deserialize, Serialize};

use crate::error::{ensure_len, CascadeError, Result};
use crate::grid::total_mass;

/// Residual above which a step counts as a conservation failure
const DEFAULT_TOLERANCE: f64 = 5e-3;

const DEFAULT_FLOOR: f64 = 1e-30;

/// Relative residual of one step's mass balance.
///
/// Returns exactly zero when the number array is unchanged and no mass
/// was produced or removed.
pub fn mass_budget_error(
    n_old: &[f64],
    n_new: &[f64],
    mass: &[f64],
    production: f64,
    dt: f64,
    extra: f64,
) -> Result<f64> {
    mass_budget_error_with_floor(n_old, n_new, mass, production, dt, extra, DEFAULT_FLOOR)
}

fn mass_budget_error_with_floor(
    n_old: &[f64],
    n_new: &[f64],
    mass: &[f64],
    production: f64,
    dt: f64,
    extra: f64,
    floor: f64,
) -> Result<f64> {
    ensure_len("n_new", n_old.len(), n_new.len())?;
    ensure_len("mass", n_old.len(), mass.len())?;

    let before = total_mass(n_old, mass);
    let after = total_mass(n_new, mass);
    let expected = before + production * dt;
    let baseline = if before > 0.0 {
        before
    } else {
        expected.max(floor)
    };

    Ok(((after + extra * dt) - expected).abs() / baseline)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassBudgetAuditor {
    /// Largest acceptable relative error
    pub tolerance: f64,
    /// Smallest baseline mass (kg/m²)
    pub floor: f64,
    /// Turn failed audits into errors
    pub strict: bool,
}

impl Default for MassBudgetAuditor {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            floor: DEFAULT_FLOOR,
            strict: false,
        }
    }
}

/// Outcome of one audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassBudgetReport {
    pub relative_error: f64,
    /// Surface density before the step (kg/m²)
    pub mass_before: f64,
    pub mass_after: f64,
    pub tolerance: f64,
    pub passed: bool,
    pub strict: bool,
}

impl MassBudgetReport {
    /// `Err` when the audit failed and the auditor is strict.
    pub fn enforce(&self) -> Result<()> {
        if self.passed || !self.strict {
            Ok(())
        } else {
            Err(CascadeError::MassBudget {
                relative_error: self.relative_error,
                tolerance: self.tolerance,
            })
        }
    }
}

impl MassBudgetAuditor {
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(CascadeError::InvalidConfig(format!(
                "mass budget tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !(self.floor > 0.0 && self.floor.is_finite()) {
            return Err(CascadeError::InvalidConfig(format!(
                "mass budget floor must be positive, got {}",
                self.floor
            )));
        }
        Ok(())
    }

    pub fn audit(
        &self,
        n_old: &[f64],
        n_new: &[f64],
        mass: &[f64],
        production: f64,
        dt: f64,
        extra: f64,
    ) -> Result<MassBudgetReport> {
        let relative_error =
            mass_budget_error_with_floor(n_old, n_new, mass, production, dt, extra, self.floor)?;
        let passed = relative_error <= self.tolerance;
        if !passed && !self.strict {
            log::warn!(
                "mass budget residual {relative_error:.3e} exceeds tolerance {:.3e}",
                self.tolerance
            );
        }

        Ok(MassBudgetReport {
            relative_error,
            mass_before: total_mass(n_old, mass),
            mass_after: total_mass(n_new, mass),
            tolerance: self.tolerance,
            passed,
            strict: self.strict,
        })
    }
}
