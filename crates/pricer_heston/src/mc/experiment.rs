//! Comparison of discretisation schemes and variance-reduction flags.
//!
//! Each combination of variance scheme, asset scheme and reduction flags is
//! priced over several seeds. A run counts as an *error* when its estimate
//! misses the benchmark by more than `abs_tol` in absolute terms **and**
//! more than `rel_tol` in relative terms.

use super::config::{AssetScheme, SimulationConfig, VarianceScheme};
use super::error::{ConfigError, PricingError};
use super::pricer::{HestonPricer, ReferencePricer};

/// Default absolute tolerance.
pub const DEFAULT_ABS_TOL: f64 = 0.025;

/// Default relative tolerance.
pub const DEFAULT_REL_TOL: f64 = 0.01;

/// Aggregated results for one combination.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonRow {
    /// Variance discretisation.
    pub variance_scheme: VarianceScheme,
    /// Asset discretisation.
    pub asset_scheme: AssetScheme,
    /// Antithetic pairing flag.
    pub antithetic: bool,
    /// Moment-matching flag.
    pub moment_matching: bool,
    /// Number of seeded runs.
    pub runs: usize,
    /// Mean of the run estimates.
    pub mean_estimate: f64,
    /// Mean of `|relative_error|` over the runs.
    pub mean_abs_relative_error: f64,
    /// Runs breaching both tolerances.
    pub error_count: usize,
}

/// Seeded sweep over discretisation choices.
///
/// # Examples
///
/// ```rust
/// use pricer_heston::mc::{HestonParams, SchemeComparison, SimulationConfig, VarianceScheme};
///
/// let base = SimulationConfig::builder()
///     .spot(10.0)
///     .strike(10.0)
///     .rate(0.05)
///     .maturity(1.0)
///     .heston(HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1))
///     .n_steps(10)
///     .n_paths(500)
///     .build()
///     .unwrap();
///
/// let rows = SchemeComparison::new(base, 2)
///     .variance_schemes(vec![VarianceScheme::FullTruncation])
///     .reductions(vec![(true, true)])
///     .run(1.4913)
///     .unwrap();
/// assert_eq!(rows.len(), 2); // log and naive
/// ```
#[derive(Clone, Debug)]
pub struct SchemeComparison {
    base: SimulationConfig,
    runs: usize,
    variance_schemes: Vec<VarianceScheme>,
    asset_schemes: Vec<AssetScheme>,
    reductions: Vec<(bool, bool)>,
    abs_tol: f64,
    rel_tol: f64,
}

impl SchemeComparison {
    /// Compares all schemes and all four reduction combinations, `runs`
    /// seeds each. Run `k` uses seed `base_seed + k`.
    pub fn new(base: SimulationConfig, runs: usize) -> Self {
        Self {
            base,
            runs,
            variance_schemes: VarianceScheme::ALL.to_vec(),
            asset_schemes: AssetScheme::ALL.to_vec(),
            reductions: vec![(false, false), (true, false), (false, true), (true, true)],
            abs_tol: DEFAULT_ABS_TOL,
            rel_tol: DEFAULT_REL_TOL,
        }
    }

    /// Restricts the variance schemes.
    pub fn variance_schemes(mut self, schemes: Vec<VarianceScheme>) -> Self {
        self.variance_schemes = schemes;
        self
    }

    /// Restricts the asset schemes.
    pub fn asset_schemes(mut self, schemes: Vec<AssetScheme>) -> Self {
        self.asset_schemes = schemes;
        self
    }

    /// Sets the `(antithetic, moment_matching)` combinations.
    pub fn reductions(mut self, reductions: Vec<(bool, bool)>) -> Self {
        self.reductions = reductions;
        self
    }

    /// Sets the error tolerances.
    pub fn tolerances(mut self, abs_tol: f64, rel_tol: f64) -> Self {
        self.abs_tol = abs_tol;
        self.rel_tol = rel_tol;
        self
    }

    /// Runs the sweep against a fixed benchmark.
    ///
    /// # Errors
    ///
    /// Returns the first `PricingError` encountered, including
    /// `ConfigError::InvalidParameter` for a zero run count and
    /// `ConfigError::OddAntitheticPathCount` for an odd base path count
    /// combined with antithetic pairing.
    pub fn run(&self, benchmark: f64) -> Result<Vec<ComparisonRow>, PricingError> {
        if self.runs == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "runs",
                value: "must be at least 1".to_string(),
            }
            .into());
        }

        let base_seed = self.base.seed().unwrap_or(0);
        let mut rows = Vec::new();

        for &variance_scheme in &self.variance_schemes {
            for &asset_scheme in &self.asset_schemes {
                for &(antithetic, moment_matching) in &self.reductions {
                    let mut sum_estimate = 0.0;
                    let mut sum_rel = 0.0;
                    let mut error_count = 0;

                    for run in 0..self.runs {
                        let config = self
                            .base
                            .to_builder()
                            .variance_scheme(variance_scheme)
                            .asset_scheme(asset_scheme)
                            .antithetic(antithetic)
                            .moment_matching(moment_matching)
                            .seed(base_seed.wrapping_add(run as u64))
                            .build()?;
                        let estimate = HestonPricer::new(config)?.price(benchmark)?;

                        sum_estimate += estimate.mean_value;
                        sum_rel += estimate.relative_error.abs();
                        if estimate.absolute_error().abs() > self.abs_tol
                            && estimate.relative_error.abs() > self.rel_tol
                        {
                            error_count += 1;
                        }
                    }

                    let row = ComparisonRow {
                        variance_scheme,
                        asset_scheme,
                        antithetic,
                        moment_matching,
                        runs: self.runs,
                        mean_estimate: sum_estimate / self.runs as f64,
                        mean_abs_relative_error: sum_rel / self.runs as f64,
                        error_count,
                    };
                    tracing::debug!(
                        variance_scheme = %row.variance_scheme,
                        asset_scheme = %row.asset_scheme,
                        antithetic,
                        moment_matching,
                        errors = row.error_count,
                        "combination finished"
                    );
                    rows.push(row);
                }
            }
        }

        Ok(rows)
    }

    /// Runs the sweep against the price returned by `reference` for the
    /// base configuration.
    pub fn run_against<R>(&self, reference: &R) -> Result<Vec<ComparisonRow>, PricingError>
    where
        R: ReferencePricer + ?Sized,
    {
        let benchmark = reference.reference_price(&self.base)?;
        self.run(benchmark)
    }
}
