//! Velocity dispersion and vertical structure of the grain population.
//!
//! The kernel needs per-bin eccentricity e, inclination i and scale height H.
//! Which model produces them is chosen once per run; each variant is a pure
//! function of the configuration and the cell's dynamical inputs.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, CascadeError, Result};

/// Model for the eccentricity and inclination dispersion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DynamicsModel {
    /// Steady state of stirring against inelastic collisional damping.
    ///
    /// Stirring supplies a velocity v_s = e_seed × v_k × √(1 + wake × τ).
    /// Collisions dissipate a fraction 1 - ε² of the random energy, with a
    /// velocity-dependent coefficient of restitution
    /// ε(c) = min(1, (c / v_crit)^(-p)). The equilibrium dispersion c solves
    /// c² (1 - ε(c)²) = v_s², then e = c / v_k and i = e / 2.
    ExcitationDamping {
        /// Seed eccentricity from external stirring
        e_seed: f64,
        /// Velocity below which collisions are elastic (m/s)
        v_crit: f64,
        /// Restitution power-law exponent p (0 < p < 1)
        restitution_exponent: f64,
        /// Self-gravity wake enhancement per unit optical depth
        wake_factor: f64,
    },

    /// Inclination set by the disk aspect ratio: i = H/r, e = 2i.
    DiskThickness {
        /// Disk aspect ratio H/r
        h_over_r: f64,
    },

    /// Prescribed e and i, independent of the cell state.
    Fixed { e: f64, i: f64 },
}

impl Default for DynamicsModel {
    fn default() -> Self {
        Self::ExcitationDamping {
            e_seed: 0.01,
            v_crit: 1.0,
            restitution_exponent: 0.234,
            wake_factor: 0.0,
        }
    }
}

/// How the vertical scale height of each bin is obtained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ScaleHeightMode {
    /// H_i = h_factor × i_i × r
    #[default]
    FromInclination,

    /// One scale height for every bin (m).
    Fixed { height: f64 },
}

/// Dynamical part of the engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub model: DynamicsModel,
    pub scale_height: ScaleHeightMode,
    /// Multiplier on i × r for [`ScaleHeightMode::FromInclination`]
    pub h_factor: f64,
    /// Multiply the kernel by 1 + v_esc²/v²
    pub gravitational_focusing: bool,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            model: DynamicsModel::default(),
            scale_height: ScaleHeightMode::default(),
            h_factor: 1.0,
            gravitational_focusing: false,
        }
    }
}

/// Cell quantities the dynamics model depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicalInputs {
    /// Keplerian speed (m/s)
    pub v_k: f64,
    /// Orbital radius (m)
    pub r: f64,
    /// Effective optical depth
    pub tau_eff: f64,
}

impl DynamicalInputs {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("v_k", self.v_k)?;
        ensure_positive("r", self.r)?;
        ensure_non_negative("tau_eff", self.tau_eff)?;
        Ok(())
    }
}

/// Per-bin eccentricity, inclination and scale height (m).
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicsProfile {
    pub e: Vec<f64>,
    pub i: Vec<f64>,
    pub h: Vec<f64>,
}

impl DynamicsProfile {
    pub fn n_bins(&self) -> usize {
        self.e.len()
    }
}

impl DynamicsModel {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::ExcitationDamping {
                e_seed,
                v_crit,
                restitution_exponent,
                wake_factor,
            } => {
                ensure_config_positive("e_seed", e_seed)?;
                ensure_config_positive("v_crit", v_crit)?;
                if !(restitution_exponent > 0.0 && restitution_exponent < 1.0) {
                    return Err(CascadeError::InvalidConfig(format!(
                        "restitution_exponent must lie in (0, 1), got {restitution_exponent}"
                    )));
                }
                if !(wake_factor >= 0.0 && wake_factor.is_finite()) {
                    return Err(CascadeError::InvalidConfig(format!(
                        "wake_factor must be >= 0, got {wake_factor}"
                    )));
                }
            }
            Self::DiskThickness { h_over_r } => ensure_config_positive("h_over_r", h_over_r)?,
            Self::Fixed { e, i } => {
                ensure_config_positive("e", e)?;
                ensure_config_positive("i", i)?;
            }
        }
        Ok(())
    }

    /// Uniform (e, i) for the given cell.
    pub fn eccentricity_inclination(&self, inputs: &DynamicalInputs) -> Result<(f64, f64)> {
        inputs.validate()?;
        match *self {
            Self::ExcitationDamping {
                e_seed,
                v_crit,
                restitution_exponent,
                wake_factor,
            } => {
                let v_stir = e_seed * inputs.v_k * (1.0 + wake_factor * inputs.tau_eff).sqrt();
                let c = equilibrium_dispersion(v_stir, v_crit, restitution_exponent);
                let e = ensure_finite("eccentricity", c / inputs.v_k)?;
                Ok((e, 0.5 * e))
            }
            Self::DiskThickness { h_over_r } => Ok((2.0 * h_over_r, h_over_r)),
            Self::Fixed { e, i } => Ok((e, i)),
        }
    }
}

impl DynamicsConfig {
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        ensure_config_positive("h_factor", self.h_factor)?;
        if let ScaleHeightMode::Fixed { height } = self.scale_height {
            ensure_config_positive("scale height", height)?;
        }
        Ok(())
    }

    /// Evaluate e, i and H for every bin.
    pub fn profile(&self, n_bins: usize, inputs: &DynamicalInputs) -> Result<DynamicsProfile> {
        let (e, i) = self.model.eccentricity_inclination(inputs)?;
        let h = match self.scale_height {
            ScaleHeightMode::FromInclination => self.h_factor * i * inputs.r,
            ScaleHeightMode::Fixed { height } => height,
        };
        ensure_positive("scale height", h)?;

        Ok(DynamicsProfile {
            e: vec![e; n_bins],
            i: vec![i; n_bins],
            h: vec![h; n_bins],
        })
    }
}

/// Restitution coefficient ε(c) = min(1, (c / v_crit)^(-p)).
pub(crate) fn restitution(c: f64, v_crit: f64, p: f64) -> f64 {
    if c <= v_crit {
        1.0
    } else {
        (c / v_crit).powf(-p)
    }
}

/// Solve c² (1 - ε(c)²) = v_s² for c by bisection.
///
/// The left side is zero up to v_crit and increases monotonically above it
/// for 0 < p < 1, so the root is unique and at least v_crit.
fn equilibrium_dispersion(v_stir: f64, v_crit: f64, p: f64) -> f64 {
    let balance = |c: f64| {
        let eps = restitution(c, v_crit, p);
        c * c * (1.0 - eps * eps) - v_stir * v_stir
    };

    let mut lo = v_crit;
    let mut hi = v_crit.max(v_stir) * 2.0;
    while balance(hi) < 0.0 {
        lo = hi;
        hi *= 2.0;
    }

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if balance(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-14 * hi {
            break;
        }
    }
    0.5 * (lo + hi)
}

fn ensure_config_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CascadeError::InvalidConfig(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}
