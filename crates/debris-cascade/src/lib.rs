//! Discretized coagulation–fragmentation–removal engine for debris-disk
//! particle size distributions.
//!
//! The engine advances the PSD of a single spatial cell by one step:
//!
//! - pairwise collision rates from a dynamics model and a kernel
//!   ([`collisions`])
//! - fragment redistribution from a strength and remnant law
//! - gain/loss accumulation on a reference or accelerated backend
//!   ([`backend`])
//! - radiation-pressure blow-out and sublimation drift ([`sinks`])
//! - an external mass supply ([`supply`])
//! - a per-step mass-budget audit ([`budget`]) and timestep advice
//!   ([`timestep`])
//!
//! [`CellStepper`] runs all of the above for one [`PsdState`]. Cells are
//! independent, so a radial driver can step many cells in parallel with a
//! shared stepper.
//!
//! ```no_run
//! use debris_cascade::{CascadeConfig, CellStepper, PsdState, StepInputs};
//! use units::{
//!     AngularVelocity, Length, SurfaceDensity, SurfaceDensityRate, Time, Velocity,
//! };
//!
//! # fn main() -> debris_cascade::Result<()> {
//! let config = CascadeConfig::default();
//! let grid = config.grid.build()?;
//! let mut psd = PsdState::power_law(
//!     grid,
//!     config.grid.rho,
//!     3.5,
//!     SurfaceDensity::from_kg_per_m2(1.0),
//! )?;
//! let stepper = CellStepper::new(config)?;
//!
//! let inputs = StepInputs {
//!     dt: Time::from_days(1.0),
//!     omega: AngularVelocity::from_rad_per_sec(2.0e-4),
//!     v_k: Velocity::from_km_per_sec(3.0),
//!     r: Length::from_km(1.5e4),
//!     tau_eff: 0.01,
//!     a_blow: Length::from_microns(1.0),
//!     ds_dt: Velocity::zero(),
//!     production: SurfaceDensityRate::zero(),
//!     area_m2: 1.0e14,
//! };
//! let result = stepper.step(&mut psd, &inputs)?;
//! println!("blow-out {:?}", result.dsigma_dt_blowout);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod budget;
pub mod collisions;
pub mod config;
pub mod error;
pub mod grid;
pub mod lookup;
pub mod sinks;
pub mod step;
pub mod supply;
pub mod timestep;

#[cfg(test)]
mod config_test;

pub use backend::{BackendPreference, KernelDispatch, NumericKernels};
pub use budget::{mass_budget_error, MassBudgetAuditor, MassBudgetReport};
pub use config::{CascadeConfig, GridConfig};
pub use error::{CascadeError, Result};
pub use grid::{PsdState, SizeBin, SizeGrid};
pub use lookup::LookupService;
pub use sinks::{BlowoutMode, SublimationConfig};
pub use step::{CellStepper, StepDiagnostics, StepInputs, StepResult};
pub use supply::{SupplyMode, SupplySource};
pub use timestep::{TimestepAdvice, TimestepConfig, TimestepLimit};
