//! Euler discretisation of the CIR variance process.
//!
//! ```text
//! dv = κ(θ − v) dt + σ √v dW_v
//! ```
//!
//! The plain Euler step can take the variance below zero, after which `√v`
//! is undefined. Each [`VarianceScheme`] fixes this differently; see the
//! table on the enum. Steps are sequential in time and elementwise across
//! paths, so each step is a parallel map over the path dimension.

use rayon::prelude::*;

use super::config::{HestonParams, VarianceScheme};
use super::correlation::CholeskyFactor;
use super::error::{ensure_finite, PricingError};
use super::paths::PathMatrix;
use super::variates::VariateBlock;

/// Minimum number of paths handed to one rayon task.
pub(crate) const MIN_PATHS_PER_TASK: usize = 4096;

#[inline]
fn positive_part(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Per-run state of the variance recurrence.
///
/// Owns the auxiliary series x̃ for the schemes that keep one; it lives for
/// exactly one run and is never shared.
#[derive(Clone, Debug)]
pub struct VarianceStepper {
    scheme: VarianceScheme,
    kappa: f64,
    theta: f64,
    sigma: f64,
    dt: f64,
    sdt: f64,
    aux: Vec<f64>,
    floor_hits: usize,
}

impl VarianceStepper {
    /// Creates a stepper starting every path at `params.v0`.
    pub fn new(scheme: VarianceScheme, params: &HestonParams, dt: f64, n_paths: usize) -> Self {
        let aux = if scheme.uses_auxiliary() {
            vec![params.v0; n_paths]
        } else {
            Vec::new()
        };

        Self {
            scheme,
            kappa: params.kappa,
            theta: params.theta,
            sigma: params.sigma,
            dt,
            sdt: dt.sqrt(),
            aux,
            floor_hits: 0,
        }
    }

    /// The scheme this stepper applies.
    #[inline]
    pub fn scheme(&self) -> VarianceScheme {
        self.scheme
    }

    /// Number of (step, path) cells where the raw Euler update went negative.
    #[inline]
    pub fn floor_hits(&self) -> usize {
        self.floor_hits
    }

    /// Advances all paths by one step.
    ///
    /// `prev` is the observable variance at the previous step, `shock` the
    /// correlated normal draws for this step; the observable variance for
    /// this step is written to `next`.
    pub fn step(&mut self, prev: &[f64], shock: &[f64], next: &mut [f64]) {
        debug_assert_eq!(prev.len(), shock.len());
        debug_assert_eq!(prev.len(), next.len());

        let (kappa, theta, sigma, dt, sdt) = (self.kappa, self.theta, self.sigma, self.dt, self.sdt);

        let hits: usize = match self.scheme {
            VarianceScheme::FullTruncation => {
                step_auxiliary(&mut self.aux, shock, next, |a, z| {
                    let a_pos = positive_part(a);
                    let raw = a + kappa * (theta - a_pos) * dt + sigma * a_pos.sqrt() * sdt * z;
                    (raw, positive_part(raw))
                })
            }
            VarianceScheme::PartialTruncation => {
                step_auxiliary(&mut self.aux, shock, next, |a, z| {
                    let raw = a + kappa * (theta - a) * dt + sigma * positive_part(a).sqrt() * sdt * z;
                    (raw, positive_part(raw))
                })
            }
            VarianceScheme::Reflection => step_auxiliary(&mut self.aux, shock, next, |a, z| {
                let a_abs = a.abs();
                let raw = a_abs + kappa * (theta - a_abs) * dt + sigma * a_abs.sqrt() * sdt * z;
                (raw, raw.abs())
            }),
            VarianceScheme::HighamMao => step_auxiliary(&mut self.aux, shock, next, |a, z| {
                let raw = a + kappa * (theta - a) * dt + sigma * a.abs().sqrt() * sdt * z;
                (raw, raw.abs())
            }),
            VarianceScheme::Truncation => step_observable(prev, shock, next, |x, z| {
                let raw = x + kappa * (theta - x) * dt + sigma * x.sqrt() * sdt * z;
                (raw, positive_part(raw))
            }),
            VarianceScheme::SimpleReflection => step_observable(prev, shock, next, |x, z| {
                let raw = x + kappa * (theta - x) * dt + sigma * x.sqrt() * sdt * z;
                (raw, raw.abs())
            }),
            VarianceScheme::Absorption => step_observable(prev, shock, next, |x, z| {
                let x_pos = positive_part(x);
                let raw = x_pos + kappa * (theta - x_pos) * dt + sigma * x_pos.sqrt() * sdt * z;
                (raw, positive_part(raw))
            }),
        };

        self.floor_hits += hits;
    }
}

/// Applies `update(aux, z) -> (new_aux, observable)`; returns the number of
/// negative raw updates.
fn step_auxiliary<F>(aux: &mut [f64], shock: &[f64], next: &mut [f64], update: F) -> usize
where
    F: Fn(f64, f64) -> (f64, f64) + Sync,
{
    aux.par_iter_mut()
        .zip(shock.par_iter())
        .zip(next.par_iter_mut())
        .with_min_len(MIN_PATHS_PER_TASK)
        .map(|((a, &z), x)| {
            let (raw, observable) = update(*a, z);
            *a = raw;
            *x = observable;
            usize::from(raw < 0.0)
        })
        .sum()
}

/// Applies `update(prev, z) -> (raw, observable)`; returns the number of
/// negative raw updates.
fn step_observable<F>(prev: &[f64], shock: &[f64], next: &mut [f64], update: F) -> usize
where
    F: Fn(f64, f64) -> (f64, f64) + Sync,
{
    prev.par_iter()
        .zip(shock.par_iter())
        .zip(next.par_iter_mut())
        .with_min_len(MIN_PATHS_PER_TASK)
        .map(|((&p, &z), x)| {
            let (raw, observable) = update(p, z);
            *x = observable;
            usize::from(raw < 0.0)
        })
        .sum()
}

/// Simulates the full variance history.
///
/// The shock at step `t` is row `source_row` of `factor · Z[:, t, :]`.
/// Returns a `(M + 1) × I` [`PathMatrix`] with row 0 equal to `v0`.
///
/// # Errors
///
/// - `ConfigError::InvalidShockRow` if `source_row` is outside the factor
/// - `PricingError::NumericalDegeneracy` if any variance is NaN or infinite
///
/// # Examples
///
/// ```rust
/// use pricer_heston::mc::{simulate_variance, CholeskyFactor, HestonParams, VariateBlock, VarianceScheme};
/// use pricer_heston::rng::PricerRng;
///
/// let params = HestonParams::new(0.04, 2.0, 0.04, 0.3, -0.7);
/// let mut rng = PricerRng::from_seed(1);
/// let block = VariateBlock::standard_normal(&mut rng, 2, 12, 100, false).unwrap();
/// let factor = CholeskyFactor::for_pair(params.rho).unwrap();
///
/// let v = simulate_variance(VarianceScheme::FullTruncation, &params, 1.0, &block, 1, &factor).unwrap();
/// assert_eq!(v.n_steps(), 12);
/// assert!(v.as_slice().iter().all(|&x| x >= 0.0));
/// ```
pub fn simulate_variance(
    scheme: VarianceScheme,
    params: &HestonParams,
    maturity: f64,
    block: &VariateBlock,
    source_row: usize,
    factor: &CholeskyFactor,
) -> Result<PathMatrix, PricingError> {
    factor.check_row(source_row)?;

    let n_steps = block.n_steps();
    let n_paths = block.n_paths();
    let dt = maturity / n_steps as f64;

    let mut stepper = VarianceStepper::new(scheme, params, dt, n_paths);
    let mut shock = vec![0.0; n_paths];
    let mut paths = PathMatrix::with_initial(params.v0, n_paths, n_steps);

    for t in 1..=n_steps {
        factor.correlate_row(block, t, source_row, &mut shock);
        paths.push_row_with(|prev, next| stepper.step(prev, &shock, next));
    }

    ensure_finite("variance paths", paths.as_slice())?;
    tracing::debug!(
        scheme = %scheme,
        floor_hits = stepper.floor_hits(),
        "variance paths simulated"
    );
    Ok(paths)
}
