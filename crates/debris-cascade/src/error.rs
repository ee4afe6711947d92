//! Error taxonomy for the cascade engine.
//!
//! Only domain errors and configuration errors are raised as `Err`.
//! Numerical-stability conditions are recovered locally (sanitize, logged
//! warnings) and conservation residuals are reported as data in
//! [`MassBudgetReport`](crate::budget::MassBudgetReport); they become an
//! error only when the caller enforces a strict budget.

/// Errors raised by the cascade engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CascadeError {
    /// A physical input is NaN or infinite.
    #[error("non-finite {quantity}: {value}")]
    NonFinite { quantity: &'static str, value: f64 },

    /// A physical input is finite but outside its admissible range.
    #[error("{quantity} = {value} is out of range: {expected}")]
    OutOfRange {
        quantity: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// Array arguments disagree on the number of size bins.
    #[error("{quantity} has length {found}, expected {expected}")]
    ShapeMismatch {
        quantity: &'static str,
        expected: usize,
        found: usize,
    },

    /// The size grid is malformed.
    #[error("invalid size grid: {0}")]
    InvalidGrid(String),

    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The supply window does not cover any bin of the grid.
    #[error("supply window [{s_min}, {s_max}] m covers no size bin")]
    EmptySupplyWindow { s_min: f64, s_max: f64 },

    /// A strict mass-budget check failed.
    #[error("mass budget violated: relative error {relative_error:.3e} exceeds {tolerance:.3e}")]
    MassBudget { relative_error: f64, tolerance: f64 },
}

pub type Result<T> = std::result::Result<T, CascadeError>;

/// Reject NaN and infinities.
pub(crate) fn ensure_finite(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CascadeError::NonFinite { quantity, value })
    }
}

/// Reject non-finite and non-positive values.
pub(crate) fn ensure_positive(quantity: &'static str, value: f64) -> Result<f64> {
    ensure_finite(quantity, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(CascadeError::OutOfRange {
            quantity,
            value,
            expected: "must be > 0",
        })
    }
}

/// Reject non-finite and negative values.
pub(crate) fn ensure_non_negative(quantity: &'static str, value: f64) -> Result<f64> {
    ensure_finite(quantity, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(CascadeError::OutOfRange {
            quantity,
            value,
            expected: "must be >= 0",
        })
    }
}

pub(crate) fn ensure_len(quantity: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(CascadeError::ShapeMismatch {
            quantity,
            expected,
            found,
        })
    }
}
