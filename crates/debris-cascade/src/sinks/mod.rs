//! Removal processes acting alongside collisions.
//!
//! - [`BlowoutSink`]: radiation pressure ejects grains smaller than the
//!   blow-out size on roughly an orbital timescale.
//! - [`SublimationDrift`]: a uniform size drift (sublimation, ablation or
//!   condensation) shifts every bin and rebins the result.

mod blowout;
mod sublimation;

#[cfg(test)]
mod blowout_test;

pub use blowout::{
    blowout_ratio, blowout_timescale, BlowoutConfig, BlowoutMode, BlowoutPlan, BlowoutRemoval,
    BlowoutSink, RatioFlags,
};
pub use sublimation::{DriftOutcome, SublimationConfig, SublimationDrift};
