//! Stability limiter and collision timescale for the gain/loss update.
//!
//! The gain and loss sums themselves live behind
//! [`NumericKernels`](crate::backend::NumericKernels); this module holds the
//! pieces shared by both execution paths.

use crate::collisions::PairMatrix;

/// Pair rates after the depletion limiter.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitedRates {
    pub rates: PairMatrix,
    /// Per-bin depletion factor θ_i in (0, 1]
    pub theta: Vec<f64>,
    /// True if any pair rate was scaled down
    pub limited: bool,
}

/// θ_i = min(1, cap × N_i / (h × loss_i)).
///
/// A bin whose explicit loss over `h` would exceed `cap` of its population
/// gets a factor below one.
pub fn depletion_factors(number: &[f64], loss: &[f64], h: f64, cap: f64) -> Vec<f64> {
    number
        .iter()
        .zip(loss)
        .map(|(&n, &l)| {
            let removed = l * h;
            let allowed = cap * n;
            if removed > allowed && removed > 0.0 {
                allowed / removed
            } else {
                1.0
            }
        })
        .collect()
}

/// Scale every pair rate C_ij by θ_ij = min(θ_i, θ_j).
///
/// Loss and gain are later computed from the same scaled matrix, so the
/// limiter never breaks mass conservation. It only slows collisions down
/// for the (sub)step.
pub fn limit_pair_rates(
    rates: &PairMatrix,
    loss: &[f64],
    number: &[f64],
    h: f64,
    cap: f64,
) -> LimitedRates {
    let theta = depletion_factors(number, loss, h, cap);
    let limited = theta.iter().any(|&t| t < 1.0);
    if !limited {
        return LimitedRates {
            rates: rates.clone(),
            theta,
            limited,
        };
    }

    let n = rates.n();
    let scaled = PairMatrix::from_upper(n, |i, j| rates.get(i, j) * theta[i].min(theta[j]));
    LimitedRates {
        rates: scaled,
        theta,
        limited,
    }
}

/// Shortest per-particle collisional lifetime, 1 / max_i(loss_i / N_i) (s).
///
/// Only populated bins count. Returns infinity when nothing collides.
pub fn min_collision_time(loss: &[f64], number: &[f64]) -> f64 {
    let max_rate = loss
        .iter()
        .zip(number)
        .filter(|&(_, &n)| n > 0.0)
        .map(|(&l, &n)| l / n)
        .filter(|r| r.is_finite())
        .fold(0.0_f64, f64::max);

    if max_rate > 0.0 {
        1.0 / max_rate
    } else {
        f64::INFINITY
    }
}
