//! Process-wide owner of the lookup caches.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::collisions::{StrengthCoefficients, StrengthLaw};
use crate::error::{ensure_positive, Result};
use crate::lookup::radiation::solve_blowout_radius;
use crate::lookup::{
    radiation_beta, BoundedCache, CacheStats, ClampKind, ClampSnapshot, ClampStats, QprTable,
    RadiationInputs,
};

pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Bit pattern of a strength law, usable as a hash key.
type StrengthKey = [u64; 11];

/// Bit patterns of (s, T).
type QprKey = (u64, u64);

static GLOBAL: OnceLock<LookupService> = OnceLock::new();

/// Cached material-strength coefficients and Q_pr values.
///
/// One instance is shared by every worker via [`LookupService::global`];
/// tests build private instances with [`LookupService::new`]. Call
/// [`reload`](Self::reload) after changing configuration so no stale
/// entries survive.
#[derive(Debug)]
pub struct LookupService {
    strength: BoundedCache<StrengthKey, (StrengthCoefficients, bool)>,
    qpr: BoundedCache<QprKey, (f64, bool, bool)>,
    qpr_table: RwLock<Arc<QprTable>>,
    clamps: ClampStats,
}

impl LookupService {
    pub fn new(capacity: usize) -> Self {
        Self {
            strength: BoundedCache::new(capacity),
            qpr: BoundedCache::new(capacity),
            qpr_table: RwLock::new(Arc::new(QprTable::grey_body())),
            clamps: ClampStats::new(),
        }
    }

    /// The process-wide instance, created on first use.
    pub fn global() -> &'static LookupService {
        GLOBAL.get_or_init(|| Self::new(DEFAULT_CACHE_CAPACITY))
    }

    /// Drop every cached value. Counters are left alone.
    pub fn reload(&self) {
        self.strength.clear();
        self.qpr.clear();
    }

    /// Install a new Q_pr table and invalidate cached values.
    pub fn set_qpr_table(&self, table: QprTable) {
        *self.qpr_table.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
        self.qpr.clear();
    }

    fn table(&self) -> Arc<QprTable> {
        Arc::clone(&self.qpr_table.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn clamp_stats(&self) -> &ClampStats {
        &self.clamps
    }

    pub fn clamp_snapshot(&self) -> ClampSnapshot {
        self.clamps.snapshot()
    }

    pub fn strength_cache_stats(&self) -> CacheStats {
        self.strength.stats()
    }

    pub fn qpr_cache_stats(&self) -> CacheStats {
        self.qpr.stats()
    }

    /// Strength coefficients of `law` at impact velocity `v` (m/s).
    ///
    /// Every call with an out-of-table velocity is counted, cached or not.
    pub fn strength_coefficients(&self, law: &StrengthLaw, v: f64) -> StrengthCoefficients {
        let (coefficients, clamped) = self
            .strength
            .get_or_insert_with(strength_key(law, v), || law.coefficients_at(v));
        if clamped {
            self.clamps.record(ClampKind::StrengthVelocity);
        }
        coefficients
    }

    /// Q_pr at grain size `s` (m) and temperature (K).
    pub fn qpr(&self, s: f64, temperature: f64) -> f64 {
        let (value, size_clamped, temperature_clamped) =
            self.qpr.get_or_insert_with((s.to_bits(), temperature.to_bits()), || {
                let sample = self.table().sample(s, temperature);
                (sample.value, sample.size_clamped, sample.temperature_clamped)
            });
        if size_clamped {
            self.clamps.record(ClampKind::QprSize);
        }
        if temperature_clamped {
            self.clamps.record(ClampKind::QprTemperature);
        }
        value
    }

    /// Radiation pressure to gravity ratio β for a grain of size `s` (m).
    pub fn beta(&self, s: f64, rho: f64, star: &RadiationInputs) -> Result<f64> {
        ensure_positive("grain size", s)?;
        ensure_positive("bulk density", rho)?;
        validate_star(star)?;
        Ok(radiation_beta(self.qpr(s, star.temperature), s, rho, star))
    }

    /// Grain radius (m) at which β = ½.
    pub fn blowout_radius(&self, rho: f64, star: &RadiationInputs) -> Result<f64> {
        ensure_positive("bulk density", rho)?;
        validate_star(star)?;
        Ok(solve_blowout_radius(&self.table(), rho, star, &self.clamps))
    }
}

fn validate_star(star: &RadiationInputs) -> Result<()> {
    ensure_positive("luminosity", star.luminosity)?;
    ensure_positive("central mass", star.central_mass)?;
    ensure_positive("temperature", star.temperature)?;
    Ok(())
}

fn strength_key(law: &StrengthLaw, v: f64) -> StrengthKey {
    match law {
        StrengthLaw::BenzAsphaug {
            v_low,
            low,
            v_high,
            high,
        } => [
            v.to_bits(),
            v_low.to_bits(),
            low.q_s.to_bits(),
            low.a_s.to_bits(),
            low.b.to_bits(),
            low.b_g.to_bits(),
            v_high.to_bits(),
            high.q_s.to_bits(),
            high.a_s.to_bits(),
            high.b.to_bits(),
            high.b_g.to_bits(),
        ],
        // Distinct tag in the last slot: a NaN pattern no table can hold
        StrengthLaw::Constant { q_star } => {
            let mut key = [0; 11];
            key[0] = v.to_bits();
            key[1] = q_star.to_bits();
            key[10] = u64::MAX;
            key
        }
    }
}
