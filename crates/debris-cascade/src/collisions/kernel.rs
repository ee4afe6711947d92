//! Pair relative velocities and the collision kernel.

use std::f64::consts::PI;

use units::G;

use crate::collisions::{DynamicsProfile, PairMatrix};
use crate::error::{ensure_len, ensure_positive, Result};

/// Mean impact speed of every bin pair (m/s).
///
/// For pair-rms eccentricity and inclination,
/// v_ij = v_k × √(1.25 e_ij² + i_ij²) (Wetherill & Stewart 1993).
pub fn pair_velocities(profile: &DynamicsProfile, v_k: f64) -> Result<PairMatrix> {
    ensure_positive("v_k", v_k)?;
    let n = profile.n_bins();
    Ok(PairMatrix::from_upper(n, |i, j| {
        let e2 = 0.5 * (profile.e[i].powi(2) + profile.e[j].powi(2));
        let i2 = 0.5 * (profile.i[i].powi(2) + profile.i[j].powi(2));
        v_k * (1.25 * e2 + i2).sqrt()
    }))
}

/// Collision kernel K_ij (m² s⁻¹ per unit area pair).
///
/// ```text
/// K_ij = π(s_i + s_j)² v_ij / (√(2π) H_ij),   H_ij = √(H_i² + H_j²)
/// ```
///
/// With focusing enabled the cross-section is enhanced by
/// 1 + v_esc²/v_ij², where v_esc² = 2G(m_i + m_j)/(s_i + s_j).
pub fn collision_kernel(
    sizes: &[f64],
    masses: &[f64],
    profile: &DynamicsProfile,
    velocities: &PairMatrix,
    gravitational_focusing: bool,
) -> Result<PairMatrix> {
    let n = sizes.len();
    ensure_len("masses", n, masses.len())?;
    ensure_len("dynamics profile", n, profile.n_bins())?;
    ensure_len("pair velocities", n, velocities.n())?;
    for &h in &profile.h {
        ensure_positive("scale height", h)?;
    }

    let sqrt_2pi = (2.0 * PI).sqrt();
    Ok(PairMatrix::from_upper(n, |i, j| {
        let s_sum = sizes[i] + sizes[j];
        let v = velocities.get(i, j);
        let h_pair = (profile.h[i].powi(2) + profile.h[j].powi(2)).sqrt();

        let mut cross_section = PI * s_sum * s_sum;
        if gravitational_focusing && v > 0.0 {
            let v_esc2 = 2.0 * G * (masses[i] + masses[j]) / s_sum;
            cross_section *= 1.0 + v_esc2 / (v * v);
        }

        cross_section * v / (sqrt_2pi * h_pair)
    }))
}
