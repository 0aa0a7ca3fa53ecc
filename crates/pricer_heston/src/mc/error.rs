//! Error types for the Heston Monte Carlo kernel.
//!
//! Two failure classes exist:
//! - [`ConfigError`]: invalid configuration, always raised before any
//!   simulation work starts.
//! - [`PricingError`]: failure of a run, either a configuration problem or a
//!   numerical degeneracy (NaN/Inf) detected in the simulated values.
//!
//! Variance paths touching zero under the truncation-family schemes are
//! expected behaviour and never produce an error.

use thiserror::Error;

use crate::analytical::AnalyticalError;

/// Configuration error for the Heston pricer.
///
/// These errors occur during construction when invalid parameters are
/// provided. They are never retried; the caller must supply a valid
/// configuration.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Path count outside valid range [1, 10_000_000].
    #[error("Invalid path count {0}: must be in range [1, 10_000_000]")]
    InvalidPathCount(usize),

    /// Step count outside valid range [1, 10_000].
    #[error("Invalid step count {0}: must be in range [1, 10_000]")]
    InvalidStepCount(usize),

    /// Correlation coefficient outside [-1, 1] or not finite.
    #[error("Invalid correlation: rho = {0} (must be in [-1, 1])")]
    InvalidCorrelation(f64),

    /// Correlation matrix has a negative pivot during factorisation.
    #[error("Correlation matrix is not positive semi-definite: pivot {pivot} at row {row}")]
    NotPositiveSemiDefinite {
        /// Row at which the factorisation broke down.
        row: usize,
        /// The offending pivot value.
        pivot: f64,
    },

    /// Correlation matrix is malformed (shape, symmetry or diagonal).
    #[error("Invalid correlation matrix: {0}")]
    InvalidCorrelationMatrix(String),

    /// Unrecognised variance discretisation tag.
    #[error("Unknown variance scheme '{0}'")]
    UnknownVarianceScheme(String),

    /// Unrecognised asset discretisation tag.
    #[error("Unknown asset scheme '{0}' (expected 'log' or 'naive')")]
    UnknownAssetScheme(String),

    /// Antithetic pairing requested with an odd number of paths.
    #[error("Antithetic sampling needs an even path count, got {0}")]
    OddAntitheticPathCount(usize),

    /// Shock row does not exist in the correlated draw.
    #[error("Shock row {row} out of range for {dimension} correlated sources")]
    InvalidShockRow {
        /// Requested row.
        row: usize,
        /// Number of correlated sources.
        dimension: usize,
    },

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

/// Failure of a pricing run.
///
/// A run either completes with a full estimate or fails with one of these;
/// there is no partial-result mode.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PricingError {
    /// Configuration rejected before simulation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// NaN or infinity appeared in a simulated quantity.
    #[error("Numerical degeneracy in {stage}: {count} non-finite value(s)")]
    NumericalDegeneracy {
        /// Pipeline stage that produced the values.
        stage: &'static str,
        /// Number of offending values.
        count: usize,
    },

    /// The benchmark collaborator failed.
    #[error("Benchmark pricing failed: {0}")]
    Benchmark(#[from] AnalyticalError),
}

/// Returns an error if any value in `values` is NaN or infinite.
pub(crate) fn ensure_finite(stage: &'static str, values: &[f64]) -> Result<(), PricingError> {
    let count = values.iter().filter(|v| !v.is_finite()).count();
    if count > 0 {
        return Err(PricingError::NumericalDegeneracy { stage, count });
    }
    Ok(())
}
