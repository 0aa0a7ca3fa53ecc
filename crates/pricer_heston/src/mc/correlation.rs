//! Correlation of independent normal draws via Cholesky factorisation.
//!
//! Given independent standard normals `Z = [Z₀, …, Zₙ₋₁]`, correlated normals
//! are obtained as
//!
//! ```text
//! W = L · Z,    C = L · Lᵀ
//! ```
//!
//! where `L` is the lower-triangular factor of the correlation matrix `C`.
//! For the Heston model `C = [[1, ρ], [ρ, 1]]` and
//!
//! ```text
//! L = [[1, 0], [ρ, √(1 − ρ²)]]
//! ```
//!
//! The asset consumes row 0 of `W` and the variance process row 1, which
//! preserves their instantaneous correlation ρ.
//!
//! ```
//! use pricer_heston::mc::CholeskyFactor;
//!
//! let factor = CholeskyFactor::for_pair(0.5).unwrap();
//! assert_eq!(factor.get(0, 0), 1.0);
//! assert_eq!(factor.get(1, 0), 0.5);
//! assert!((factor.get(1, 1) - 0.75_f64.sqrt()).abs() < 1e-15);
//! ```

use super::error::ConfigError;
use super::variates::VariateBlock;

/// Pivots above this (negative) tolerance are treated as zero.
const PSD_TOLERANCE: f64 = 1e-12;

/// Tolerance for the unit-diagonal and symmetry checks.
const STRUCTURE_TOLERANCE: f64 = 1e-10;

/// Square, symmetric, unit-diagonal correlation matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    /// Elements in row-major order.
    data: Vec<f64>,
    dim: usize,
}

impl CorrelationMatrix {
    /// Creates a correlation matrix from row-major data.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCorrelationMatrix` if the data is not
    /// `dim × dim`, the diagonal is not 1, or the matrix is not symmetric,
    /// and `ConfigError::InvalidCorrelation` if an off-diagonal element lies
    /// outside [-1, 1].
    pub fn new(data: &[f64], dim: usize) -> Result<Self, ConfigError> {
        if dim == 0 || data.len() != dim * dim {
            return Err(ConfigError::InvalidCorrelationMatrix(format!(
                "expected {} elements for dimension {}, got {}",
                dim * dim,
                dim,
                data.len()
            )));
        }

        for i in 0..dim {
            let diag = data[i * dim + i];
            if !((diag - 1.0).abs() <= STRUCTURE_TOLERANCE) {
                return Err(ConfigError::InvalidCorrelationMatrix(format!(
                    "diagonal element {} is {}, expected 1",
                    i, diag
                )));
            }
        }

        for i in 0..dim {
            for j in (i + 1)..dim {
                let upper = data[i * dim + j];
                let lower = data[j * dim + i];
                for value in [upper, lower] {
                    if !value.is_finite() || value.abs() > 1.0 {
                        return Err(ConfigError::InvalidCorrelation(value));
                    }
                }
                if !((upper - lower).abs() <= STRUCTURE_TOLERANCE) {
                    return Err(ConfigError::InvalidCorrelationMatrix(format!(
                        "not symmetric at ({}, {})",
                        i, j
                    )));
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// The 2×2 matrix `[[1, ρ], [ρ, 1]]`.
    pub fn pair(rho: f64) -> Result<Self, ConfigError> {
        Self::new(&[1.0, rho, rho, 1.0], 2)
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Cholesky–Banachiewicz factorisation, allowing semi-definite input.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotPositiveSemiDefinite` when a pivot falls below
    /// `-1e-12`. Pivots in `[-1e-12, 0]` are clamped to zero and the
    /// corresponding column below the diagonal is set to zero.
    pub fn cholesky(&self) -> Result<CholeskyFactor, ConfigError> {
        let n = self.dim;
        let mut lower = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                let sum: f64 = (0..j).map(|k| lower[i * n + k] * lower[j * n + k]).sum();

                if i == j {
                    let pivot = self.get(i, i) - sum;
                    if pivot < -PSD_TOLERANCE {
                        return Err(ConfigError::NotPositiveSemiDefinite { row: i, pivot });
                    }
                    lower[i * n + i] = pivot.max(0.0).sqrt();
                } else {
                    let l_jj = lower[j * n + j];
                    lower[i * n + j] = if l_jj > 0.0 {
                        (self.get(i, j) - sum) / l_jj
                    } else {
                        0.0
                    };
                }
            }
        }

        Ok(CholeskyFactor {
            data: lower,
            dim: n,
        })
    }
}

/// Lower-triangular Cholesky factor of a correlation matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor {
    /// Lower-triangular elements in row-major order.
    data: Vec<f64>,
    dim: usize,
}

impl CholeskyFactor {
    /// Factor of `[[1, ρ], [ρ, 1]]`.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidCorrelation` if `|ρ| > 1` or ρ is not finite.
    pub fn for_pair(rho: f64) -> Result<Self, ConfigError> {
        CorrelationMatrix::pair(rho)?.cholesky()
    }

    /// Matrix dimension (number of correlated sources).
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j); zero above the diagonal.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Reconstructs `L · Lᵀ` in row-major order.
    pub fn reconstruct(&self) -> Vec<f64> {
        let n = self.dim;
        let mut out = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                out[i * n + j] = (0..=i.min(j)).map(|k| self.get(i, k) * self.get(j, k)).sum();
            }
        }
        out
    }

    /// Checks that `row` selects one of the correlated sources.
    pub fn check_row(&self, row: usize) -> Result<(), ConfigError> {
        if row < self.dim {
            Ok(())
        } else {
            Err(ConfigError::InvalidShockRow {
                row,
                dimension: self.dim,
            })
        }
    }

    /// Writes row `row` of `L · Z[:, step, :]` into `out`.
    ///
    /// `out[p] = Σ_{k ≤ row} L[row][k] · Z[k][step][p]` for every path `p`.
    /// The caller validates `row` with [`check_row`](Self::check_row) once
    /// per run.
    pub fn correlate_row(&self, block: &VariateBlock, step: usize, row: usize, out: &mut [f64]) {
        debug_assert!(row < self.dim);
        debug_assert!(block.n_sources() >= self.dim);
        debug_assert_eq!(out.len(), block.n_paths());

        out.fill(0.0);
        for k in 0..=row {
            let weight = self.get(row, k);
            if weight == 0.0 {
                continue;
            }
            for (w, &z) in out.iter_mut().zip(block.row(k, step)) {
                *w += weight * z;
            }
        }
    }
}
