//! Logarithmic size bins.

use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};

/// One size bin of a [`SizeGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBin {
    pub index: usize,
    /// Representative size (m)
    pub center: f64,
    /// right - left (m)
    pub width: f64,
    pub left: f64,
    pub right: f64,
}

/// Ordered set of size bins.
///
/// Edges are strictly increasing and every centre lies inside its bin.
/// Centres of a geometric grid are the geometric means of their edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeGrid {
    centers: Vec<f64>,
    widths: Vec<f64>,
    edges: Vec<f64>,
}

impl SizeGrid {
    /// Log-spaced grid of `n_bins` bins spanning `[s_min, s_max]` (m).
    ///
    /// # Example
    /// ```
    /// use debris_cascade::grid::SizeGrid;
    ///
    /// let grid = SizeGrid::geometric(1e-6, 1.0, 30).unwrap();
    /// assert_eq!(grid.n_bins(), 30);
    /// assert_eq!(grid.edges().len(), 31);
    /// ```
    pub fn geometric(s_min: f64, s_max: f64, n_bins: usize) -> Result<Self> {
        if !(s_min.is_finite() && s_max.is_finite()) || s_min <= 0.0 {
            return Err(CascadeError::InvalidGrid(format!(
                "s_min must be positive and finite, got {s_min}"
            )));
        }
        if s_max <= s_min {
            return Err(CascadeError::InvalidGrid(format!(
                "s_max ({s_max}) must exceed s_min ({s_min})"
            )));
        }
        if n_bins == 0 {
            return Err(CascadeError::InvalidGrid("need at least 1 bin".into()));
        }

        let log_min = s_min.ln();
        let log_max = s_max.ln();
        let mut edges: Vec<f64> = (0..=n_bins)
            .map(|i| {
                let frac = i as f64 / n_bins as f64;
                (log_min + frac * (log_max - log_min)).exp()
            })
            .collect();
        // Pin the end points exactly; exp(ln(x)) is not always x.
        edges[0] = s_min;
        edges[n_bins] = s_max;

        let centers = edges.windows(2).map(|e| (e[0] * e[1]).sqrt()).collect();
        Self::from_parts(centers, edges)
    }

    /// Grid from explicit centres and edges.
    ///
    /// Requires `edges.len() == centers.len() + 1`, strictly increasing
    /// positive edges, and `left <= center <= right` for every bin.
    pub fn from_parts(centers: Vec<f64>, edges: Vec<f64>) -> Result<Self> {
        if centers.is_empty() {
            return Err(CascadeError::InvalidGrid("need at least 1 bin".into()));
        }
        if edges.len() != centers.len() + 1 {
            return Err(CascadeError::InvalidGrid(format!(
                "{} centres need {} edges, got {}",
                centers.len(),
                centers.len() + 1,
                edges.len()
            )));
        }
        if edges.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(CascadeError::InvalidGrid(
                "edges must be positive and finite".into(),
            ));
        }
        if edges.windows(2).any(|e| e[1] <= e[0]) {
            return Err(CascadeError::InvalidGrid(
                "edges must be strictly increasing".into(),
            ));
        }
        for (i, &c) in centers.iter().enumerate() {
            if !(edges[i] <= c && c <= edges[i + 1]) {
                return Err(CascadeError::InvalidGrid(format!(
                    "centre {c} of bin {i} lies outside [{}, {}]",
                    edges[i],
                    edges[i + 1]
                )));
            }
        }

        let widths = edges.windows(2).map(|e| e[1] - e[0]).collect();
        Ok(Self {
            centers,
            widths,
            edges,
        })
    }

    pub fn n_bins(&self) -> usize {
        self.centers.len()
    }

    /// Bin centres (m).
    pub fn sizes(&self) -> &[f64] {
        &self.centers
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Bin edges (m), length `n_bins + 1`.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn s_min(&self) -> f64 {
        self.edges[0]
    }

    pub fn s_max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    pub fn bin(&self, index: usize) -> SizeBin {
        SizeBin {
            index,
            center: self.centers[index],
            width: self.widths[index],
            left: self.edges[index],
            right: self.edges[index + 1],
        }
    }

    pub fn bins(&self) -> impl Iterator<Item = SizeBin> + '_ {
        (0..self.n_bins()).map(|i| self.bin(i))
    }

    /// Index of the bin covering size `s`, clamped to `[0, n_bins - 1]`.
    ///
    /// Bins are half-open `[left, right)`; sizes below the grid map to bin 0
    /// and sizes at or above the top edge map to the last bin.
    pub fn locate(&self, s: f64) -> usize {
        locate_in_edges(&self.edges, s)
    }
}

/// Covering-bin lookup on a raw edge array, clamped to the valid range.
pub(crate) fn locate_in_edges(edges: &[f64], s: f64) -> usize {
    let n_bins = edges.len() - 1;
    if s.is_nan() || s < edges[0] {
        return 0;
    }
    // Number of edges <= s, minus one, is the covering bin.
    let upper = edges.partition_point(|&e| e <= s);
    upper.saturating_sub(1).min(n_bins - 1)
}
