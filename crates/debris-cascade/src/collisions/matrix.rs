//! Dense pair matrices and the fragment redistribution tensor.

/// Dense symmetric `n × n` matrix over size-bin pairs, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PairMatrix {
    n: usize,
    data: Vec<f64>,
}

impl PairMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Build from a function evaluated on the upper triangle and mirrored.
    pub fn from_upper<F>(n: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut m = Self::zeros(n);
        for i in 0..n {
            for j in i..n {
                m.set_symmetric(i, j, f(i, j));
            }
        }
        m
    }

    /// Wrap a row-major buffer. Returns `None` if the length is not `n²`.
    pub fn from_row_major(n: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == n * n).then_some(Self { n, data })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
        self.data[j * self.n + i] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn is_symmetric(&self, max_relative: f64) -> bool {
        (0..self.n).all(|i| {
            (i + 1..self.n).all(|j| {
                let a = self.get(i, j);
                let b = self.get(j, i);
                (a - b).abs() <= max_relative * a.abs().max(b.abs())
            })
        })
    }

    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

/// Fraction `Y[k, i, j]` of the mass of colliding pair (i, j) landing in bin k.
///
/// Stored k-major so that the gain sum for one output bin reads a
/// contiguous `n × n` slab. Also keeps the largest-remnant bin and mass
/// fraction of every pair. Pairs that were rejected as invalid carry an
/// all-zero column and `f_lr = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentTensor {
    n: usize,
    y: Vec<f64>,
    k_lr: Vec<usize>,
    f_lr: Vec<f64>,
    valid: Vec<bool>,
}

impl FragmentTensor {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            y: vec![0.0; n * n * n],
            k_lr: vec![0; n * n],
            f_lr: vec![0.0; n * n],
            valid: vec![false; n * n],
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, k: usize, i: usize, j: usize) -> f64 {
        self.y[(k * self.n + i) * self.n + j]
    }

    #[inline]
    pub(crate) fn set_symmetric(&mut self, k: usize, i: usize, j: usize, value: f64) {
        let n = self.n;
        self.y[(k * n + i) * n + j] = value;
        self.y[(k * n + j) * n + i] = value;
    }

    /// Record the largest remnant of pair (i, j) on both triangles.
    pub(crate) fn set_remnant(&mut self, i: usize, j: usize, k_lr: usize, f_lr: f64) {
        let n = self.n;
        for idx in [i * n + j, j * n + i] {
            self.k_lr[idx] = k_lr;
            self.f_lr[idx] = f_lr;
            self.valid[idx] = true;
        }
    }

    /// The `n × n` slab of output bin `k`, row-major over (i, j).
    pub fn slab(&self, k: usize) -> &[f64] {
        let stride = self.n * self.n;
        &self.y[k * stride..(k + 1) * stride]
    }

    pub fn k_lr(&self, i: usize, j: usize) -> usize {
        self.k_lr[i * self.n + j]
    }

    pub fn f_lr(&self, i: usize, j: usize) -> f64 {
        self.f_lr[i * self.n + j]
    }

    pub fn is_valid(&self, i: usize, j: usize) -> bool {
        self.valid[i * self.n + j]
    }

    /// Σ_k Y[k, i, j]
    pub fn column_sum(&self, i: usize, j: usize) -> f64 {
        (0..self.n).map(|k| self.get(k, i, j)).sum()
    }

    pub fn all_finite(&self) -> bool {
        self.y.iter().all(|v| v.is_finite()) && self.f_lr.iter().all(|v| v.is_finite())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.y
    }
}
