//! Size grid and particle size distribution state.
//!
//! A cell's particle population is represented statistically: the number
//! surface density of grains in each logarithmic size bin. The grid is
//! fixed for a run; the number array is the only evolving quantity.
//!
//! # Physics
//!
//! Grain mass follows from size and bulk density, m = (4/3)πρs³, so the
//! aggregate surface density is Σ = Σ_i N_i m_i. For a collisional
//! cascade, dN/ds ∝ s^(-q) with q ≈ 3.5 (Dohnanyi 1969) puts most of the
//! mass in the largest bodies and most of the cross-section in the smallest.

mod psd_state;
mod size_grid;

#[cfg(test)]
mod psd_state_test;

pub use psd_state::{grain_mass, PsdState};
pub use size_grid::{SizeBin, SizeGrid};

pub(crate) use psd_state::{power_integral, sanitize_slice, total_mass};
pub(crate) use size_grid::locate_in_edges;
