//! Index-level paths conditioned on simulated variance.
//!
//! Given the variance row `v[t]` and the correlated shock `z` for step `t`:
//!
//! ```text
//! Log:    S[t] = S[t−1] · exp((r − v[t]/2)·dt + √v[t]·z·√dt − b[t])
//! Naive:  S[t] = S[t−1] · (exp(r·dt) + √v[t]·z·√dt − b[t])
//! ```
//!
//! `b[t]` is the cross-path mean of `√v[t]·z·√dt` when moment matching is on
//! and zero otherwise. It is recomputed at every step with a sequential sum,
//! so the result does not depend on the rayon thread count.

use rayon::prelude::*;

use super::config::{AssetScheme, SimulationConfig};
use super::correlation::CholeskyFactor;
use super::error::{ensure_finite, ConfigError, PricingError};
use super::paths::PathMatrix;
use super::variance::MIN_PATHS_PER_TASK;
use super::variates::VariateBlock;

/// Per-run state of the asset recurrence.
#[derive(Clone, Copy, Debug)]
pub struct AssetStepper {
    scheme: AssetScheme,
    rate: f64,
    dt: f64,
    sdt: f64,
    growth: f64,
    correct_bias: bool,
}

impl AssetStepper {
    /// Creates a stepper for the given discretisation.
    pub fn new(scheme: AssetScheme, rate: f64, dt: f64, correct_bias: bool) -> Self {
        Self {
            scheme,
            rate,
            dt,
            sdt: dt.sqrt(),
            growth: (rate * dt).exp(),
            correct_bias,
        }
    }

    /// Creates a stepper from a run configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.asset_scheme(),
            config.rate(),
            config.dt(),
            config.moment_matching(),
        )
    }

    /// Cross-path mean of the diffusion increment `√v·z·√dt`, or zero when
    /// bias correction is off.
    pub fn drift_bias(&self, variance: &[f64], shock: &[f64]) -> f64 {
        if !self.correct_bias || variance.is_empty() {
            return 0.0;
        }
        let sdt = self.sdt;
        let sum: f64 = variance
            .iter()
            .zip(shock)
            .map(|(v, z)| v.sqrt() * z * sdt)
            .sum();
        sum / variance.len() as f64
    }

    /// Advances all paths by one step; returns the bias that was subtracted.
    pub fn step(&self, prev: &[f64], variance: &[f64], shock: &[f64], next: &mut [f64]) -> f64 {
        debug_assert_eq!(prev.len(), variance.len());
        debug_assert_eq!(prev.len(), shock.len());
        debug_assert_eq!(prev.len(), next.len());

        let bias = self.drift_bias(variance, shock);
        let (rate, dt, sdt, growth) = (self.rate, self.dt, self.sdt, self.growth);
        let inputs = prev.par_iter().zip(variance.par_iter()).zip(shock.par_iter());

        match self.scheme {
            AssetScheme::Log => inputs
                .zip(next.par_iter_mut())
                .with_min_len(MIN_PATHS_PER_TASK)
                .for_each(|(((&s, &v), &z), out)| {
                    *out = s * ((rate - 0.5 * v) * dt + v.sqrt() * z * sdt - bias).exp();
                }),
            AssetScheme::Naive => inputs
                .zip(next.par_iter_mut())
                .with_min_len(MIN_PATHS_PER_TASK)
                .for_each(|(((&s, &v), &z), out)| {
                    *out = s * (growth + v.sqrt() * z * sdt - bias);
                }),
        }

        bias
    }
}

/// Simulates the full index-level history given the variance paths.
///
/// Uses `config` for the scheme, `S₀`, `r`, `dt` and the bias-correction
/// flag. `source_row` selects the asset's row of the correlated draw.
///
/// # Errors
///
/// - `ConfigError::InvalidShockRow` if `source_row` is outside the factor
/// - `ConfigError::InvalidParameter` if `variance` and `block` disagree in shape
/// - `PricingError::NumericalDegeneracy` if any level is NaN or infinite
pub fn simulate_asset(
    config: &SimulationConfig,
    variance: &PathMatrix,
    block: &VariateBlock,
    source_row: usize,
    factor: &CholeskyFactor,
) -> Result<PathMatrix, PricingError> {
    factor.check_row(source_row)?;
    if variance.n_steps() != block.n_steps() || variance.n_paths() != block.n_paths() {
        return Err(ConfigError::InvalidParameter {
            name: "variance",
            value: format!(
                "{}×{} paths do not match {}×{} variates",
                variance.n_rows(),
                variance.n_paths(),
                block.n_steps() + 1,
                block.n_paths()
            ),
        }
        .into());
    }

    let n_steps = block.n_steps();
    let n_paths = block.n_paths();
    let stepper = AssetStepper::new(
        config.asset_scheme(),
        config.rate(),
        config.maturity() / n_steps as f64,
        config.moment_matching(),
    );

    let mut shock = vec![0.0; n_paths];
    let mut paths = PathMatrix::with_initial(config.spot(), n_paths, n_steps);

    for t in 1..=n_steps {
        factor.correlate_row(block, t, source_row, &mut shock);
        let v = variance.row(t);
        paths.push_row_with(|prev, next| {
            stepper.step(prev, v, &shock, next);
        });
    }

    ensure_finite("asset paths", paths.as_slice())?;
    Ok(paths)
}
