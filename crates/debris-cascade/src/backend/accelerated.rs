//! Packed and unrolled kernels, parallel across bins with the `parallel` feature.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::backend::NumericKernels;
use crate::collisions::{FragmentTensor, PairMatrix, PairOutcomes};
use crate::grid::power_integral;

/// Fast path for the step kernels.
///
/// - Pair sums run over a packed list of the non-zero upper-triangle pairs.
/// - Row sums use four independent accumulators.
/// - Debris weights are built once per largest-remnant bin from prefix sums
///   instead of once per pair.
/// - With the `parallel` feature, rows and output bins are spread over the
///   rayon pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceleratedKernels;

/// Upper-triangle pair with a non-zero collisional mass flux.
struct PackedPair {
    /// Offset of (i, j) inside an `n × n` slab
    offset: usize,
    /// C_ij / (1 + δ_ij) × (m_i + m_j)
    mass_flux: f64,
}

#[cfg(feature = "parallel")]
fn map_bins<F>(n: usize, f: F) -> Vec<f64>
where
    F: Fn(usize) -> f64 + Send + Sync,
{
    (0..n).into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_bins<F>(n: usize, f: F) -> Vec<f64>
where
    F: Fn(usize) -> f64,
{
    (0..n).map(f).collect()
}

/// Sum with four accumulators.
#[inline]
fn unrolled_sum(values: &[f64]) -> f64 {
    let mut acc = [0.0; 4];
    let chunks = values.chunks_exact(4);
    let tail = chunks.remainder();
    for c in chunks {
        acc[0] += c[0];
        acc[1] += c[1];
        acc[2] += c[2];
        acc[3] += c[3];
    }
    let mut sum = (acc[0] + acc[1]) + (acc[2] + acc[3]);
    for v in tail {
        sum += v;
    }
    sum
}

impl NumericKernels for AcceleratedKernels {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn collision_rates(&self, kernel: &PairMatrix, number: &[f64]) -> PairMatrix {
        let n = kernel.n();
        let mut data = vec![0.0; n * n];

        let fill_row = |(i, row): (usize, &mut [f64])| {
            let k_row = kernel.row(i);
            let n_i = number[i];
            for ((c, &k), &n_j) in row.iter_mut().zip(k_row).zip(number) {
                *c = k * (n_i * n_j);
            }
        };

        #[cfg(feature = "parallel")]
        data.par_chunks_mut(n.max(1)).enumerate().for_each(fill_row);
        #[cfg(not(feature = "parallel"))]
        data.chunks_mut(n.max(1)).enumerate().for_each(fill_row);

        // Square buffer by construction
        PairMatrix::from_row_major(n, data).unwrap_or_else(|| PairMatrix::zeros(n))
    }

    fn fragment_tensor(&self, edges: &[f64], outcomes: &PairOutcomes, alpha: f64) -> FragmentTensor {
        let n = outcomes.n();
        let mut tensor = FragmentTensor::zeros(n);
        if n == 0 {
            return tensor;
        }

        let integrals: Vec<f64> = edges
            .windows(2)
            .map(|e| power_integral(e[0], e[1], alpha))
            .collect();
        let mut prefix = Vec::with_capacity(n);
        let mut running = 0.0;
        for &w in &integrals {
            running += w;
            prefix.push(running);
        }

        for i in 0..n {
            for j in i..n {
                let outcome = outcomes.get(i, j);
                if !outcome.valid {
                    continue;
                }
                let k_lr = outcome.k_lr.min(n - 1);
                let f_lr = outcome.f_lr;
                let total = prefix[k_lr];
                let norm = if total > 0.0 && total.is_finite() {
                    (1.0 - f_lr) / total
                } else {
                    1.0 - f_lr
                };

                for (k, &w) in integrals.iter().enumerate().take(k_lr) {
                    tensor.set_symmetric(k, i, j, norm * w);
                }
                tensor.set_symmetric(k_lr, i, j, f_lr + norm * integrals[k_lr]);
                tensor.set_remnant(i, j, k_lr, f_lr);
            }
        }
        tensor
    }

    fn loss(&self, rates: &PairMatrix) -> Vec<f64> {
        map_bins(rates.n(), |i| unrolled_sum(rates.row(i)))
    }

    fn gain(&self, rates: &PairMatrix, tensor: &FragmentTensor, mass: &[f64]) -> Vec<f64> {
        let n = rates.n();
        let mut pairs = Vec::with_capacity(n * (n + 1) / 2);
        for i in 0..n {
            for j in i..n {
                let c = rates.get(i, j);
                if c == 0.0 {
                    continue;
                }
                let symmetry = if i == j { 0.5 } else { 1.0 };
                pairs.push(PackedPair {
                    offset: i * n + j,
                    mass_flux: symmetry * c * (mass[i] + mass[j]),
                });
            }
        }

        map_bins(n, |k| {
            let m_k = mass[k];
            if m_k <= 0.0 || m_k.is_nan() {
                return 0.0;
            }
            let slab = tensor.slab(k);
            let sum: f64 = pairs.iter().map(|p| p.mass_flux * slab[p.offset]).sum();
            sum / m_k
        })
    }
}
