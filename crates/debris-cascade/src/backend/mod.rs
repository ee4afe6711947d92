//! Numeric kernels with a reference and an accelerated execution path.
//!
//! Both paths implement [`NumericKernels`] and must agree to within
//! floating-point round-off. [`KernelDispatch`] picks one at startup and
//! drops permanently to the reference path the first time the accelerated
//! path panics or produces non-finite output.

mod accelerated;
mod dispatch;
mod reference;

#[cfg(test)]
mod dispatch_test;

pub use accelerated::AcceleratedKernels;
pub use dispatch::{BackendPreference, KernelDispatch};
pub use reference::ReferenceKernels;

use crate::collisions::{FragmentTensor, PairMatrix, PairOutcomes};

/// The array kernels of one collisional step.
///
/// Implementations are stateless with respect to the physics and must be
/// shareable across worker threads.
pub trait NumericKernels: Send + Sync {
    /// Short identifier reported in step diagnostics.
    fn name(&self) -> &'static str;

    /// C_ij = K_ij × N_i × N_j
    fn collision_rates(&self, kernel: &PairMatrix, number: &[f64]) -> PairMatrix;

    /// Fill Y[k, i, j] from the largest remnant of each pair.
    ///
    /// `edges` has `n + 1` entries. `alpha` is the debris mass index.
    fn fragment_tensor(&self, edges: &[f64], outcomes: &PairOutcomes, alpha: f64) -> FragmentTensor;

    /// loss_i = Σ_j C_ij
    fn loss(&self, rates: &PairMatrix) -> Vec<f64>;

    /// gain_k = Σ_{i≤j} C_ij / (1 + δ_ij) × (m_i + m_j) × Y_kij / m_k
    ///
    /// Bins with non-positive mass get zero gain.
    fn gain(&self, rates: &PairMatrix, tensor: &FragmentTensor, mass: &[f64]) -> Vec<f64>;
}
