//! Catastrophic disruption threshold Q*_D.
//!
//! # Physics
//!
//! The specific energy needed to disperse half of the target mass combines a
//! material-strength term that weakens with size and a self-gravity term
//! that strengthens with size (Benz & Asphaug 1999):
//!
//! ```text
//! Q*_D(s) = Q_s (s / 1 m)^(-a_s) + B ρ (s / 1 m)^(b_g)
//! ```
//!
//! Coefficients are tabulated at two impact velocities (3 and 5 km/s for
//! basalt) and interpolated linearly in between. Velocities outside the
//! table are clamped to its ends.

use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};

/// One row of the strength table, SI units (J/kg, m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthCoefficients {
    /// Strength-regime normalization Q_s (J/kg)
    pub q_s: f64,
    /// Strength-regime exponent a_s
    pub a_s: f64,
    /// Gravity-regime normalization B (J m³ kg⁻²)
    pub b: f64,
    /// Gravity-regime exponent b_g
    pub b_g: f64,
}

impl StrengthCoefficients {
    /// Q*_D (J/kg) for a body of radius `s` (m) and bulk density `rho` (kg/m³).
    pub fn q_star(&self, s: f64, rho: f64) -> f64 {
        self.q_s * s.powf(-self.a_s) + self.b * rho * s.powf(self.b_g)
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            q_s: self.q_s + t * (other.q_s - self.q_s),
            a_s: self.a_s + t * (other.a_s - self.a_s),
            b: self.b + t * (other.b - self.b),
            b_g: self.b_g + t * (other.b_g - self.b_g),
        }
    }
}

/// Material strength law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StrengthLaw {
    /// Two-velocity Benz & Asphaug table.
    BenzAsphaug {
        /// Lower reference impact velocity (m/s)
        v_low: f64,
        low: StrengthCoefficients,
        /// Upper reference impact velocity (m/s)
        v_high: f64,
        high: StrengthCoefficients,
    },

    /// Size-independent threshold (J/kg).
    Constant { q_star: f64 },
}

impl Default for StrengthLaw {
    /// Basalt at 3 and 5 km/s.
    fn default() -> Self {
        Self::BenzAsphaug {
            v_low: 3.0e3,
            low: StrengthCoefficients {
                q_s: 608.0,
                a_s: 0.38,
                b: 1.58e-5,
                b_g: 1.36,
            },
            v_high: 5.0e3,
            high: StrengthCoefficients {
                q_s: 1714.0,
                a_s: 0.36,
                b: 2.63e-5,
                b_g: 1.36,
            },
        }
    }
}

impl StrengthLaw {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::BenzAsphaug {
                v_low,
                low,
                v_high,
                high,
            } => {
                if !(*v_low > 0.0 && v_high > v_low && v_high.is_finite()) {
                    return Err(CascadeError::InvalidConfig(format!(
                        "strength table velocities must satisfy 0 < v_low < v_high, got {v_low}, {v_high}"
                    )));
                }
                for c in [low, high] {
                    let values = [c.q_s, c.a_s, c.b, c.b_g];
                    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(CascadeError::InvalidConfig(format!(
                            "strength coefficients must be finite and >= 0, got {c:?}"
                        )));
                    }
                }
                Ok(())
            }
            Self::Constant { q_star } => {
                if *q_star > 0.0 && q_star.is_finite() {
                    Ok(())
                } else {
                    Err(CascadeError::InvalidConfig(format!(
                        "constant Q*_D must be positive, got {q_star}"
                    )))
                }
            }
        }
    }

    /// Coefficients at impact velocity `v` (m/s), and whether `v` was clamped.
    ///
    /// A constant law is expressed as a pure strength term with zero slope.
    pub fn coefficients_at(&self, v: f64) -> (StrengthCoefficients, bool) {
        match self {
            Self::BenzAsphaug {
                v_low,
                low,
                v_high,
                high,
            } => {
                let clamped = v < *v_low || v > *v_high;
                let v = v.clamp(*v_low, *v_high);
                let t = (v - v_low) / (v_high - v_low);
                (low.lerp(high, t), clamped)
            }
            Self::Constant { q_star } => (
                StrengthCoefficients {
                    q_s: *q_star,
                    a_s: 0.0,
                    b: 0.0,
                    b_g: 0.0,
                },
                false,
            ),
        }
    }
}
