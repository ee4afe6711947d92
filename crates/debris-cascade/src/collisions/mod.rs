//! Collisional cascade: kernel, fragment outcomes and gain/loss fluxes.
//!
//! # Physics
//!
//! The discretized Smoluchowski equation for a destructive cascade:
//!
//! ```text
//! dN_k/dt = Σ_{i≤j} C_ij/(1+δ_ij) × (m_i + m_j) × Y_kij / m_k  -  Σ_j C_kj
//! ```
//!
//! with the pair collision rate per unit area
//!
//! ```text
//! C_ij = K_ij × N_i × N_j,   K_ij = π(s_i + s_j)² v_ij / (√(2π) H_ij)
//! ```
//!
//! Every collision destroys both projectile and target. The combined mass
//! is redistributed by the fragment tensor Y: a largest remnant of mass
//! fraction f_lr plus a power-law debris tail below it.
//!
//! # References
//!
//! - Smoluchowski (1916) - Original coagulation equation
//! - Dohnanyi (1969) - Collisional steady state, q = 3.5
//! - Benz & Asphaug (1999) - Catastrophic disruption thresholds
//! - Leinhardt & Stewart (2012) - Largest remnant scaling law
//! - Thébault & Augereau (2007) - Debris disk cascades and blow-out

mod dynamics;
mod fragments;
mod gain_loss;
mod kernel;
mod matrix;
mod strength;

#[cfg(test)]
mod kernel_test;

pub use dynamics::{DynamicalInputs, DynamicsConfig, DynamicsModel, DynamicsProfile, ScaleHeightMode};
pub use fragments::{
    debris_weights, largest_remnant_fraction, specific_impact_energy, FragmentModel, PairOutcome,
    PairOutcomes, RemnantLaw,
};
pub use gain_loss::{depletion_factors, limit_pair_rates, min_collision_time, LimitedRates};
pub use kernel::{collision_kernel, pair_velocities};
pub use matrix::{FragmentTensor, PairMatrix};
pub use strength::{StrengthCoefficients, StrengthLaw};
