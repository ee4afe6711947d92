//! Timestep advice from the collisional and blow-out timescales.
//!
//! The caller picks dt; this module reports how large it may safely be.
//!
//! ```text
//! dt = clamp(min(safety × t_coll, ratio_target × t_blow), dt_min, dt_max)
//! ```

use serde::{Deserialize, Serialize};
use units::Time;

use crate::error::{CascadeError, Result};
use crate::sinks::blowout_timescale;

/// Fraction of the collision time used per step.
const DEFAULT_SAFETY_FACTOR: f64 = 0.1;

/// Smallest advised step (s)
const DEFAULT_MIN_DT_S: f64 = 1.0;

/// Largest advised step (one year)
const DEFAULT_MAX_DT_S: f64 = units::SECONDS_PER_YEAR;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestepConfig {
    pub safety_factor: f64,
    /// Largest dt / t_blow the caller wants to take
    pub blowout_ratio_target: f64,
    pub dt_min: Time,
    pub dt_max: Time,
}

impl Default for TimestepConfig {
    fn default() -> Self {
        Self {
            safety_factor: DEFAULT_SAFETY_FACTOR,
            blowout_ratio_target: 1.0,
            dt_min: Time::from_seconds(DEFAULT_MIN_DT_S),
            dt_max: Time::from_seconds(DEFAULT_MAX_DT_S),
        }
    }
}

/// Which constraint set the advised step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestepLimit {
    Collisions,
    Blowout,
    Minimum,
    Maximum,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestepAdvice {
    /// Kernel-minimum collision time (s), infinite if nothing collides
    pub t_coll_min: f64,
    pub t_blow: f64,
    pub dt_collision: f64,
    pub dt_blowout: f64,
    pub dt_suggested: Time,
    pub limiting: TimestepLimit,
}

impl TimestepConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.safety_factor > 0.0 && self.safety_factor <= 1.0) {
            return Err(CascadeError::InvalidConfig(format!(
                "safety_factor must lie in (0, 1], got {}",
                self.safety_factor
            )));
        }
        if !(self.blowout_ratio_target > 0.0 && self.blowout_ratio_target.is_finite()) {
            return Err(CascadeError::InvalidConfig(format!(
                "blowout_ratio_target must be positive, got {}",
                self.blowout_ratio_target
            )));
        }
        let (lo, hi) = (self.dt_min.to_seconds(), self.dt_max.to_seconds());
        if !(lo > 0.0 && hi >= lo && hi.is_finite()) {
            return Err(CascadeError::InvalidConfig(format!(
                "need 0 < dt_min <= dt_max, got [{lo}, {hi}] s"
            )));
        }
        Ok(())
    }

    /// Advise a step from the last collision time and the cell's Ω.
    pub fn advise(&self, t_coll_min: f64, omega: f64, chi_blow: f64) -> Result<TimestepAdvice> {
        if t_coll_min.is_nan() || t_coll_min <= 0.0 {
            return Err(CascadeError::OutOfRange {
                quantity: "t_coll_min",
                value: t_coll_min,
                expected: "must be > 0 (may be infinite)",
            });
        }
        let t_blow = blowout_timescale(omega, chi_blow)?;
        let dt_collision = self.safety_factor * t_coll_min;
        let dt_blowout = self.blowout_ratio_target * t_blow;

        let (raw, mut limiting) = if dt_collision <= dt_blowout {
            (dt_collision, TimestepLimit::Collisions)
        } else {
            (dt_blowout, TimestepLimit::Blowout)
        };

        let (lo, hi) = (self.dt_min.to_seconds(), self.dt_max.to_seconds());
        if raw < lo {
            limiting = TimestepLimit::Minimum;
        } else if raw > hi {
            limiting = TimestepLimit::Maximum;
        }

        Ok(TimestepAdvice {
            t_coll_min,
            t_blow,
            dt_collision,
            dt_blowout,
            dt_suggested: Time::from_seconds(raw.clamp(lo, hi)),
            limiting,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn collisions_limit_when_fast() {
        let advice = TimestepConfig::default().advise(100.0, 1e-4, 1.0).unwrap();

        assert_eq!(advice.limiting, TimestepLimit::Collisions);
        assert_relative_eq!(advice.dt_suggested.to_seconds(), 10.0);
        assert_relative_eq!(advice.t_blow, 1e4);
    }

    #[test]
    fn blowout_limits_when_collisions_are_slow() {
        let advice = TimestepConfig::default().advise(1e9, 1e-4, 1.0).unwrap();

        assert_eq!(advice.limiting, TimestepLimit::Blowout);
        assert_relative_eq!(advice.dt_suggested.to_seconds(), 1e4);
    }

    #[test]
    fn no_collisions_still_gives_finite_step() {
        let advice = TimestepConfig::default().advise(f64::INFINITY, 1e-9, 1.0).unwrap();

        assert_eq!(advice.limiting, TimestepLimit::Maximum);
        assert_relative_eq!(advice.dt_suggested.to_seconds(), units::SECONDS_PER_YEAR);
    }

    #[test]
    fn respects_minimum() {
        let advice = TimestepConfig::default().advise(1e-3, 1e-4, 1.0).unwrap();

        assert_eq!(advice.limiting, TimestepLimit::Minimum);
        assert_eq!(advice.dt_suggested.to_seconds(), 1.0);
    }

    #[test]
    fn rejects_bad_inputs() {
        let config = TimestepConfig::default();
        assert!(config.advise(0.0, 1e-4, 1.0).is_err());
        assert!(config.advise(f64::NAN, 1e-4, 1.0).is_err());
        assert!(config.advise(10.0, f64::INFINITY, 1.0).is_err());

        let bad = TimestepConfig {
            dt_min: Time::from_seconds(10.0),
            dt_max: Time::from_seconds(1.0),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
