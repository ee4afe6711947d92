//! Radiation pressure blow-out with fast-removal mitigation.
//!
//! # Physics
//!
//! Grains with s ≤ a_blow leave the cell on the timescale
//! t_blow = χ_blow / Ω. The explicit update N ← N (1 - dt/t_blow) is only
//! stable for dt ≤ t_blow. Beyond that the sink either switches to the
//! exact exponential decay, N ← N e^(-dt/t_blow), or splits the step.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, CascadeError, Result};

/// How blow-out handles dt > t_blow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum BlowoutMode {
    /// Explicit removal regardless of the ratio. Overshoot is only logged.
    None,
    /// Exponential removal when the ratio exceeds one.
    #[default]
    Correction,
    /// Split the step so each piece has ratio ≤ `ratio_max`.
    Substep { ratio_max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlowoutConfig {
    pub enabled: bool,
    /// Blow-out efficiency χ_blow, t_blow = χ_blow / Ω
    pub chi_blow: f64,
    pub mode: BlowoutMode,
}

impl Default for BlowoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chi_blow: 1.0,
            mode: BlowoutMode::default(),
        }
    }
}

impl BlowoutConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.chi_blow > 0.0 && self.chi_blow.is_finite()) {
            return Err(CascadeError::InvalidConfig(format!(
                "chi_blow must be positive, got {}",
                self.chi_blow
            )));
        }
        if let BlowoutMode::Substep { ratio_max } = self.mode {
            if !(ratio_max > 0.0 && ratio_max.is_finite()) {
                return Err(CascadeError::InvalidConfig(format!(
                    "substep ratio_max must be positive, got {ratio_max}"
                )));
            }
        }
        Ok(())
    }
}

/// Threshold flags on dt / t_blow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioFlags {
    pub above_unity: bool,
    pub above_3: bool,
    pub above_10: bool,
}

impl RatioFlags {
    pub fn from_ratio(ratio: f64) -> Self {
        Self {
            above_unity: ratio > 1.0,
            above_3: ratio > 3.0,
            above_10: ratio > 10.0,
        }
    }
}

/// t_blow = χ_blow / Ω (s).
pub fn blowout_timescale(omega: f64, chi_blow: f64) -> Result<f64> {
    ensure_positive("omega", omega)?;
    ensure_positive("chi_blow", chi_blow)?;
    Ok(chi_blow / omega)
}

/// dt / t_blow.
pub fn blowout_ratio(dt: f64, omega: f64, chi_blow: f64) -> Result<f64> {
    ensure_non_negative("dt", dt)?;
    Ok(dt / blowout_timescale(omega, chi_blow)?)
}

/// How a step of length dt is handled by the sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlowoutPlan {
    pub t_blow: f64,
    /// Ratio over the whole step
    pub ratio: f64,
    pub substeps: usize,
    pub flags: RatioFlags,
}

impl BlowoutPlan {
    /// Ratio over one sub-step.
    pub fn substep_ratio(&self) -> f64 {
        self.ratio / self.substeps as f64
    }
}

/// Mass removed by one application of the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlowoutRemoval {
    /// Surface density removed (kg/m²)
    pub mass: f64,
    pub correction_applied: bool,
    /// (1 - e^(-ratio)) / ratio, 1 when no correction fired
    pub chi_eff: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlowoutSink {
    config: BlowoutConfig,
}

impl BlowoutSink {
    pub fn new(config: BlowoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BlowoutConfig {
        &self.config
    }

    /// Ratio, flags and sub-step count for a step of `dt` seconds.
    pub fn plan(&self, dt: f64, omega: f64) -> Result<BlowoutPlan> {
        let t_blow = blowout_timescale(omega, self.config.chi_blow)?;
        let ratio = blowout_ratio(dt, omega, self.config.chi_blow)?;
        let substeps = match self.config.mode {
            BlowoutMode::Substep { ratio_max } if self.config.enabled && ratio > ratio_max => {
                (ratio / ratio_max).ceil().max(1.0) as usize
            }
            _ => 1,
        };

        if self.config.enabled && self.config.mode == BlowoutMode::None && ratio > 1.0 {
            log::warn!("blow-out ratio dt/t_blow = {ratio:.3} > 1 without mitigation; explicit removal overshoots");
        }

        Ok(BlowoutPlan {
            t_blow,
            ratio,
            substeps,
            flags: RatioFlags::from_ratio(ratio),
        })
    }

    /// Remove blow-out grains over an interval `h` from bins with s ≤ `a_blow`.
    ///
    /// `number` is updated in place. In [`BlowoutMode::None`] an interval
    /// longer than t_blow drives counts negative; the caller sanitizes and
    /// the mass audit exposes the overshoot.
    pub fn apply(
        &self,
        number: &mut [f64],
        sizes: &[f64],
        mass: &[f64],
        a_blow: f64,
        h: f64,
        t_blow: f64,
    ) -> BlowoutRemoval {
        if !self.config.enabled || h <= 0.0 {
            return BlowoutRemoval {
                chi_eff: 1.0,
                ..Default::default()
            };
        }

        let ratio = h / t_blow;
        let corrected = ratio > 1.0 && self.config.mode != BlowoutMode::None;
        let fraction = if corrected { -(-ratio).exp_m1() } else { ratio };

        let mut removed = 0.0;
        for ((n, &s), &m) in number.iter_mut().zip(sizes).zip(mass) {
            if s <= a_blow && *n > 0.0 {
                let dn = *n * fraction;
                *n -= dn;
                removed += dn * m;
            }
        }

        BlowoutRemoval {
            mass: removed,
            correction_applied: corrected,
            chi_eff: if corrected { fraction / ratio } else { 1.0 },
        }
    }
}
