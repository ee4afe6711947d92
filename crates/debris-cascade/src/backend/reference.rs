//! Plain nested-loop kernels.

use crate::backend::NumericKernels;
use crate::collisions::{debris_weights, FragmentTensor, PairMatrix, PairOutcomes};

/// Straightforward implementation of every kernel.
///
/// Each sum follows its defining formula term by term. This is the path
/// other implementations are checked against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceKernels;

impl NumericKernels for ReferenceKernels {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn collision_rates(&self, kernel: &PairMatrix, number: &[f64]) -> PairMatrix {
        PairMatrix::from_upper(kernel.n(), |i, j| kernel.get(i, j) * (number[i] * number[j]))
    }

    fn fragment_tensor(&self, edges: &[f64], outcomes: &PairOutcomes, alpha: f64) -> FragmentTensor {
        let n = outcomes.n();
        let mut tensor = FragmentTensor::zeros(n);

        for i in 0..n {
            for j in i..n {
                let outcome = outcomes.get(i, j);
                if !outcome.valid {
                    continue;
                }
                let k_lr = outcome.k_lr.min(n - 1);
                let f_lr = outcome.f_lr;
                let weights = debris_weights(edges, k_lr, alpha);

                for (k, &w) in weights.iter().enumerate().take(k_lr + 1) {
                    let mut y = (1.0 - f_lr) * w;
                    if k == k_lr {
                        y += f_lr;
                    }
                    tensor.set_symmetric(k, i, j, y);
                }
                tensor.set_remnant(i, j, k_lr, f_lr);
            }
        }
        tensor
    }

    fn loss(&self, rates: &PairMatrix) -> Vec<f64> {
        let n = rates.n();
        (0..n)
            .map(|i| (0..n).map(|j| rates.get(i, j)).sum())
            .collect()
    }

    fn gain(&self, rates: &PairMatrix, tensor: &FragmentTensor, mass: &[f64]) -> Vec<f64> {
        let n = rates.n();
        let mut gain = vec![0.0; n];

        for (k, g) in gain.iter_mut().enumerate() {
            if mass[k] <= 0.0 || mass[k].is_nan() {
                continue;
            }
            let mut sum = 0.0;
            for i in 0..n {
                for j in i..n {
                    let symmetry = if i == j { 0.5 } else { 1.0 };
                    sum += symmetry * rates.get(i, j) * (mass[i] + mass[j]) * tensor.get(k, i, j);
                }
            }
            *g = sum / mass[k];
        }
        gain
    }
}
