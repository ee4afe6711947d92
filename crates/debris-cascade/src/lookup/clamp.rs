//! Atomic counters for table inputs that fell outside the tabulated range.

use std::sync::atomic::{AtomicU64, Ordering};

/// Table input that can be clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClampKind {
    /// Impact velocity outside the strength table
    StrengthVelocity,
    /// Grain size outside the Q_pr table
    QprSize,
    /// Temperature outside the Q_pr table
    QprTemperature,
}

/// Point-in-time copy of [`ClampStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClampSnapshot {
    pub strength_velocity: u64,
    pub qpr_size: u64,
    pub qpr_temperature: u64,
}

impl ClampSnapshot {
    pub fn total(&self) -> u64 {
        self.strength_velocity + self.qpr_size + self.qpr_temperature
    }
}

#[derive(Debug, Default)]
pub struct ClampStats {
    strength_velocity: AtomicU64,
    qpr_size: AtomicU64,
    qpr_temperature: AtomicU64,
}

impl ClampStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, kind: ClampKind) -> &AtomicU64 {
        match kind {
            ClampKind::StrengthVelocity => &self.strength_velocity,
            ClampKind::QprSize => &self.qpr_size,
            ClampKind::QprTemperature => &self.qpr_temperature,
        }
    }

    pub fn record(&self, kind: ClampKind) {
        self.counter(kind).fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self, kind: ClampKind) -> u64 {
        self.counter(kind).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ClampSnapshot {
        ClampSnapshot {
            strength_velocity: self.count(ClampKind::StrengthVelocity),
            qpr_size: self.count(ClampKind::QprSize),
            qpr_temperature: self.count(ClampKind::QprTemperature),
        }
    }

    pub fn reset(&self) {
        for kind in [
            ClampKind::StrengthVelocity,
            ClampKind::QprSize,
            ClampKind::QprTemperature,
        ] {
            self.counter(kind).store(0, Ordering::Relaxed);
        }
    }
}
