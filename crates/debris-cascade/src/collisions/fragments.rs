//! Collision outcomes and fragment redistribution.
//!
//! # Physics
//!
//! For each pair the specific impact energy Q_R = ½ μ v² / M_tot is compared
//! with the disruption threshold Q*_D of a body holding the combined mass.
//! Their ratio φ = Q_R / Q*_D fixes the largest remnant fraction
//! (Leinhardt & Stewart 2012):
//!
//! ```text
//! f_lr = 1 - φ/2                   φ < 1.8
//! f_lr = 0.1 (φ / 1.8)^(-1.5)      φ ≥ 1.8
//! ```
//!
//! The remaining mass is spread as a power-law debris tail dM/ds ∝ s^(-α)
//! over every bin up to and including the largest remnant's bin.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::collisions::{PairMatrix, StrengthLaw};
use crate::error::{ensure_len, ensure_positive, CascadeError, Result};
use crate::grid::{locate_in_edges, power_integral};
use crate::lookup::LookupService;

/// Largest remnant law f_lr(φ).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum RemnantLaw {
    #[default]
    LeinhardtStewart,
    /// Fixed remnant fraction for every pair.
    Constant(f64),
}

/// Fragmentation part of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentModel {
    /// Debris mass index α, dM/ds ∝ s^(-α)
    pub alpha: f64,
    pub remnant: RemnantLaw,
    pub strength: StrengthLaw,
}

impl Default for FragmentModel {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            remnant: RemnantLaw::default(),
            strength: StrengthLaw::default(),
        }
    }
}

/// Largest remnant of one colliding pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairOutcome {
    pub valid: bool,
    pub f_lr: f64,
    pub k_lr: usize,
}

/// Outcomes of every bin pair, mirrored across the diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct PairOutcomes {
    n: usize,
    outcomes: Vec<PairOutcome>,
}

impl PairOutcomes {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            outcomes: vec![PairOutcome::default(); n * n],
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> PairOutcome {
        self.outcomes[i * self.n + j]
    }

    pub fn set_symmetric(&mut self, i: usize, j: usize, outcome: PairOutcome) {
        self.outcomes[i * self.n + j] = outcome;
        self.outcomes[j * self.n + i] = outcome;
    }
}

/// Q_R = ½ μ v² / (m_i + m_j), μ = m_i m_j / (m_i + m_j).
pub fn specific_impact_energy(m_i: f64, m_j: f64, v: f64) -> f64 {
    let m_tot = m_i + m_j;
    let mu = m_i * m_j / m_tot;
    0.5 * mu * v * v / m_tot
}

/// Largest remnant mass fraction for energy ratio φ = Q_R / Q*_D, in [0, 1].
pub fn largest_remnant_fraction(law: &RemnantLaw, phi: f64) -> f64 {
    let f = match law {
        RemnantLaw::LeinhardtStewart => {
            if phi < 1.8 {
                1.0 - 0.5 * phi
            } else {
                0.1 * (phi / 1.8).powf(-1.5)
            }
        }
        RemnantLaw::Constant(f) => *f,
    };
    f.clamp(0.0, 1.0)
}

/// Normalized debris weights over bins `0..=k_lr`.
///
/// w_k ∝ ∫ s^(-α) ds over bin k, the logarithmic integral when α ≈ 1.
/// Bins above `k_lr` get zero weight.
pub fn debris_weights(edges: &[f64], k_lr: usize, alpha: f64) -> Vec<f64> {
    let n = edges.len() - 1;
    let mut weights = vec![0.0; n];
    let top = k_lr.min(n - 1);
    for k in 0..=top {
        weights[k] = power_integral(edges[k], edges[k + 1], alpha);
    }
    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        weights.iter_mut().for_each(|w| *w /= total);
    }
    weights
}

fn combined_radius(mass: f64, rho: f64) -> f64 {
    (3.0 * mass / (4.0 * PI * rho)).cbrt()
}

impl FragmentModel {
    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() {
            return Err(CascadeError::InvalidConfig(format!(
                "debris index alpha must be finite, got {}",
                self.alpha
            )));
        }
        if let RemnantLaw::Constant(f) = self.remnant {
            if !(0.0..=1.0).contains(&f) {
                return Err(CascadeError::InvalidConfig(format!(
                    "constant remnant fraction must lie in [0, 1], got {f}"
                )));
            }
        }
        self.strength.validate()
    }

    /// Largest remnant fraction and bin for every pair.
    ///
    /// Pairs with a non-positive or non-finite impact speed or mass are
    /// marked invalid and produce no fragments.
    pub fn pair_outcomes(
        &self,
        masses: &[f64],
        edges: &[f64],
        velocities: &PairMatrix,
        rho: f64,
        lookup: &LookupService,
    ) -> Result<PairOutcomes> {
        let n = masses.len();
        ensure_len("edges", n + 1, edges.len())?;
        ensure_len("pair velocities", n, velocities.n())?;
        ensure_positive("bulk density", rho)?;

        let mut outcomes = PairOutcomes::new(n);
        for i in 0..n {
            for j in i..n {
                let (m_i, m_j) = (masses[i], masses[j]);
                let v = velocities.get(i, j);
                let usable = |x: f64| x.is_finite() && x > 0.0;
                if !(usable(m_i) && usable(m_j) && usable(v)) {
                    continue;
                }

                let m_tot = m_i + m_j;
                let q_r = specific_impact_energy(m_i, m_j, v);
                let coefficients = lookup.strength_coefficients(&self.strength, v);
                let q_star = coefficients.q_star(combined_radius(m_tot, rho), rho);
                let phi = q_r / q_star;
                if !phi.is_finite() {
                    continue;
                }

                let f_lr = largest_remnant_fraction(&self.remnant, phi);
                let s_lr = combined_radius(f_lr * m_tot, rho);
                let k_lr = locate_in_edges(edges, s_lr);

                outcomes.set_symmetric(
                    i,
                    j,
                    PairOutcome {
                        valid: true,
                        f_lr,
                        k_lr,
                    },
                );
            }
        }
        Ok(outcomes)
    }
}
