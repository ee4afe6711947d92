//! Engine configuration.
//!
//! Every section deserializes with defaults for missing fields, so a
//! configuration file only needs to name what it changes. Parsing the file
//! itself is left to the caller; this module only defines the shape and
//! checks consistency with [`CascadeConfig::validate`].

use serde::{Deserialize, Serialize};
use units::Density;

use crate::backend::BackendPreference;
use crate::budget::MassBudgetAuditor;
use crate::collisions::{DynamicsConfig, FragmentModel};
use crate::error::{CascadeError, Result};
use crate::grid::SizeGrid;
use crate::sinks::{BlowoutConfig, SublimationConfig};
use crate::supply::{SupplyMode, SupplySource};
use crate::timestep::TimestepConfig;

/// Size grid and material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Smallest bin edge (m)
    pub s_min: f64,
    /// Largest bin edge (m)
    pub s_max: f64,
    pub n_bins: usize,
    /// Bulk density of the grains
    pub rho: Density,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            s_min: 1e-6,
            s_max: 3.0,
            n_bins: 40,
            rho: Density::from_kg_per_m3(3000.0),
        }
    }
}

impl GridConfig {
    pub fn build(&self) -> Result<SizeGrid> {
        SizeGrid::geometric(self.s_min, self.s_max, self.n_bins)
    }
}

/// Complete configuration of the cascade engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub grid: GridConfig,
    pub dynamics: DynamicsConfig,
    pub fragmentation: FragmentModel,
    pub blowout: BlowoutConfig,
    pub sublimation: SublimationConfig,
    pub supply: SupplyMode,
    pub timestep: TimestepConfig,
    pub budget: MassBudgetAuditor,
    pub backend: BackendPreference,
    /// Largest fraction of a bin that collisions may remove in one (sub)step
    pub collision_depletion_cap: f64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            dynamics: DynamicsConfig::default(),
            fragmentation: FragmentModel::default(),
            blowout: BlowoutConfig::default(),
            sublimation: SublimationConfig::default(),
            supply: SupplyMode::default(),
            timestep: TimestepConfig::default(),
            budget: MassBudgetAuditor::default(),
            backend: BackendPreference::default(),
            collision_depletion_cap: 0.5,
        }
    }
}

impl CascadeConfig {
    /// Check every section and their mutual consistency.
    pub fn validate(&self) -> Result<()> {
        let grid = self.grid.build()?;
        let rho = self.grid.rho.to_kg_per_m3();
        if !(rho > 0.0 && rho.is_finite()) {
            return Err(CascadeError::InvalidConfig(format!(
                "bulk density must be positive, got {rho} kg/m³"
            )));
        }

        self.dynamics.validate()?;
        self.fragmentation.validate()?;
        self.blowout.validate()?;
        self.sublimation.validate()?;
        self.supply.validate()?;
        self.timestep.validate()?;
        self.budget.validate()?;

        if !(self.collision_depletion_cap > 0.0 && self.collision_depletion_cap <= 1.0) {
            return Err(CascadeError::InvalidConfig(format!(
                "collision_depletion_cap must lie in (0, 1], got {}",
                self.collision_depletion_cap
            )));
        }

        if self.supply != SupplyMode::Off {
            SupplySource::new(self.supply.clone()).mass_fractions(&grid)?;
        }
        Ok(())
    }
}
