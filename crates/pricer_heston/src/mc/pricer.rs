//! Heston Monte Carlo pricing engine.
//!
//! The [`HestonPricer`] coordinates:
//! 1. Variate generation (via [`VariateBlock`]), with optional antithetic
//!    pairing and moment matching
//! 2. Correlation of the two Brownian drivers (via [`CholeskyFactor`])
//! 3. Variance paths (via [`VarianceStepper`])
//! 4. Index-level paths (via [`AssetStepper`])
//! 5. Discounting and aggregation (via [`estimate_call`])
//!
//! [`HestonPricer::price`] streams through time keeping only the current and
//! previous rows of each path matrix. [`HestonPricer::simulate`] keeps the
//! full history; both run the same per-step arithmetic, so their terminal
//! rows agree exactly.

use super::asset::{simulate_asset, AssetStepper};
use super::config::SimulationConfig;
use super::correlation::CholeskyFactor;
use super::error::{ensure_finite, ConfigError, PricingError};
use super::estimator::{estimate_call, PriceEstimate};
use super::paths::PathMatrix;
use super::variance::{simulate_variance, VarianceStepper};
use super::variates::VariateBlock;
use crate::analytical::AnalyticalError;
use crate::rng::PricerRng;

/// Number of Brownian sources in the Heston model.
pub const N_SOURCES: usize = 2;

/// Row of the correlated draw driving the index level.
pub const ASSET_ROW: usize = 0;

/// Row of the correlated draw driving the variance process.
pub const VARIANCE_ROW: usize = 1;

/// Source of the reference price an estimate is compared against.
///
/// Implemented by [`LewisHeston`](crate::analytical::LewisHeston) and by any
/// closure `Fn(&SimulationConfig) -> Result<f64, AnalyticalError>`.
pub trait ReferencePricer {
    /// Reference price of the call described by `config`.
    fn reference_price(&self, config: &SimulationConfig) -> Result<f64, AnalyticalError>;
}

impl<F> ReferencePricer for F
where
    F: Fn(&SimulationConfig) -> Result<f64, AnalyticalError>,
{
    fn reference_price(&self, config: &SimulationConfig) -> Result<f64, AnalyticalError> {
        self(config)
    }
}

/// Full variance and index-level histories of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulatedPaths {
    /// Observable variance, `(M + 1) × I`.
    pub variance: PathMatrix,
    /// Index level, `(M + 1) × I`.
    pub asset: PathMatrix,
}

/// Heston Monte Carlo pricer for a European call.
///
/// Every operation re-seeds from the configured seed (0 when unset), so
/// repeated calls on the same pricer return identical results.
///
/// # Examples
///
/// ```rust
/// use pricer_heston::mc::{HestonParams, HestonPricer, SimulationConfig};
///
/// let config = SimulationConfig::builder()
///     .spot(10.0)
///     .strike(10.0)
///     .rate(0.05)
///     .maturity(1.0)
///     .heston(HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1))
///     .n_steps(20)
///     .n_paths(2_000)
///     .antithetic(true)
///     .moment_matching(true)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let pricer = HestonPricer::new(config).unwrap();
/// let estimate = pricer.price(1.4913).unwrap();
/// assert!(estimate.mean_value > 0.0);
/// assert_eq!(estimate, pricer.price(1.4913).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct HestonPricer {
    config: SimulationConfig,
    factor: CholeskyFactor,
}

impl HestonPricer {
    /// Creates a pricer, validating the configuration and factorising the
    /// asset/variance correlation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let factor = CholeskyFactor::for_pair(config.heston().rho)?;
        Ok(Self { config, factor })
    }

    /// Returns a reference to the configuration.
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the Cholesky factor of the asset/variance correlation.
    #[inline]
    pub fn factor(&self) -> &CholeskyFactor {
        &self.factor
    }

    fn rng(&self) -> PricerRng {
        PricerRng::from_seed(self.config.seed().unwrap_or(0))
    }

    /// Draws the run's variate block, applying antithetic pairing and moment
    /// matching as configured.
    pub fn draw_variates(&self) -> Result<VariateBlock, PricingError> {
        let mut rng = self.rng();
        let block = VariateBlock::standard_normal(
            &mut rng,
            N_SOURCES,
            self.config.n_steps(),
            self.config.n_paths(),
            self.config.antithetic(),
        )?;

        if self.config.moment_matching() {
            block.moment_matched()
        } else {
            Ok(block)
        }
    }

    /// Simulates and returns the full variance and index-level histories.
    pub fn simulate(&self) -> Result<SimulatedPaths, PricingError> {
        let block = self.draw_variates()?;
        self.log_run("simulate");

        let variance = simulate_variance(
            self.config.variance_scheme(),
            self.config.heston(),
            self.config.maturity(),
            &block,
            VARIANCE_ROW,
            &self.factor,
        )?;
        let asset = simulate_asset(&self.config, &variance, &block, ASSET_ROW, &self.factor)?;

        Ok(SimulatedPaths { variance, asset })
    }

    /// Prices the call against `benchmark`.
    ///
    /// Streams through time: beyond the variate block only O(I) path state
    /// is held.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidParameter` if `benchmark` is zero or not finite
    /// - `PricingError::NumericalDegeneracy` on NaN or infinite values
    pub fn price(&self, benchmark: f64) -> Result<PriceEstimate, PricingError> {
        let terminal = self.terminal_levels()?;
        let estimate = estimate_call(
            &terminal,
            self.config.strike(),
            self.config.discount_factor(),
            benchmark,
        )?;

        tracing::debug!(
            mean = estimate.mean_value,
            std_error = estimate.standard_error,
            relative_error = estimate.relative_error,
            "priced"
        );
        Ok(estimate)
    }

    /// Prices the call against the value returned by `reference`.
    pub fn price_against<R>(&self, reference: &R) -> Result<PriceEstimate, PricingError>
    where
        R: ReferencePricer + ?Sized,
    {
        let benchmark = reference.reference_price(&self.config)?;
        self.price(benchmark)
    }

    /// Runs the streaming simulation and returns the terminal index levels.
    pub fn terminal_levels(&self) -> Result<Vec<f64>, PricingError> {
        let block = self.draw_variates()?;
        self.log_run("price");

        let n_paths = self.config.n_paths();
        let heston = self.config.heston();
        let mut variance = VarianceStepper::new(
            self.config.variance_scheme(),
            heston,
            self.config.dt(),
            n_paths,
        );
        let asset = AssetStepper::from_config(&self.config);

        let mut v_prev = vec![heston.v0; n_paths];
        let mut v_next = vec![0.0; n_paths];
        let mut s_prev = vec![self.config.spot(); n_paths];
        let mut s_next = vec![0.0; n_paths];
        let mut shock = vec![0.0; n_paths];

        for t in 1..=self.config.n_steps() {
            self.factor.correlate_row(&block, t, VARIANCE_ROW, &mut shock);
            variance.step(&v_prev, &shock, &mut v_next);
            ensure_finite("variance paths", &v_next)?;

            self.factor.correlate_row(&block, t, ASSET_ROW, &mut shock);
            asset.step(&s_prev, &v_next, &shock, &mut s_next);
            ensure_finite("asset paths", &s_next)?;

            std::mem::swap(&mut v_prev, &mut v_next);
            std::mem::swap(&mut s_prev, &mut s_next);
        }

        tracing::debug!(
            scheme = %variance.scheme(),
            floor_hits = variance.floor_hits(),
            "variance paths simulated"
        );
        Ok(s_prev)
    }

    fn log_run(&self, operation: &'static str) {
        tracing::debug!(
            operation,
            n_paths = self.config.n_paths(),
            n_steps = self.config.n_steps(),
            variance_scheme = %self.config.variance_scheme(),
            asset_scheme = %self.config.asset_scheme(),
            antithetic = self.config.antithetic(),
            moment_matching = self.config.moment_matching(),
            seed = self.config.seed().unwrap_or(0),
            "starting Heston Monte Carlo run"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::config::{AssetScheme, HestonParams, VarianceScheme};

    fn reference_config() -> SimulationConfig {
        SimulationConfig::builder()
            .spot(10.0)
            .strike(10.0)
            .rate(0.05)
            .maturity(1.0)
            .heston(HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1))
            .n_steps(20)
            .n_paths(1_000)
            .seed(42)
            .build()
            .unwrap()
    }

    #[test]
    fn test_pricer_new_builds_factor() {
        let pricer = HestonPricer::new(reference_config()).unwrap();
        assert_eq!(pricer.factor().get(1, 0), 0.1);
        assert_eq!(pricer.config().n_paths(), 1_000);
    }

    #[test]
    fn test_price_is_deterministic() {
        let pricer = HestonPricer::new(reference_config()).unwrap();
        let first = pricer.price(1.4913).unwrap();
        let second = pricer.price(1.4913).unwrap();
        assert_eq!(first, second);

        let other = HestonPricer::new(reference_config()).unwrap();
        assert_eq!(first, other.price(1.4913).unwrap());
    }

    #[test]
    fn test_simulate_is_deterministic() {
        let pricer = HestonPricer::new(reference_config()).unwrap();
        assert_eq!(pricer.simulate().unwrap(), pricer.simulate().unwrap());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = HestonPricer::new(reference_config()).unwrap();
        let b = HestonPricer::new(reference_config().to_builder().seed(43).build().unwrap()).unwrap();
        assert_ne!(a.price(1.4913).unwrap().mean_value, b.price(1.4913).unwrap().mean_value);
    }

    #[test]
    fn test_unseeded_uses_zero() {
        let unseeded = SimulationConfig::builder()
            .spot(10.0)
            .strike(10.0)
            .rate(0.05)
            .maturity(1.0)
            .heston(HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1))
            .n_steps(5)
            .n_paths(100)
            .build()
            .unwrap();
        let seeded = unseeded.to_builder().seed(0).build().unwrap();

        let a = HestonPricer::new(unseeded).unwrap().price(1.0).unwrap();
        let b = HestonPricer::new(seeded).unwrap().price(1.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_streaming_matches_full_history() {
        for scheme in VarianceScheme::ALL {
            for asset_scheme in AssetScheme::ALL {
                for (antithetic, moment_matching) in [(false, false), (true, true)] {
                    let config = reference_config()
                        .to_builder()
                        .heston(HestonParams::new(0.02, 0.8, 0.02, 0.6, -0.6))
                        .variance_scheme(scheme)
                        .asset_scheme(asset_scheme)
                        .antithetic(antithetic)
                        .moment_matching(moment_matching)
                        .build()
                        .unwrap();
                    let pricer = HestonPricer::new(config).unwrap();

                    let paths = pricer.simulate().unwrap();
                    let terminal = pricer.terminal_levels().unwrap();
                    assert_eq!(paths.asset.terminal(), terminal.as_slice());

                    let full = estimate_call(paths.asset.terminal(), 10.0, pricer.config().discount_factor(), 1.0)
                        .unwrap();
                    assert_eq!(full, pricer.price(1.0).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_draw_variates_applies_reductions() {
        let config = reference_config()
            .to_builder()
            .antithetic(true)
            .moment_matching(true)
            .build()
            .unwrap();
        let block = HestonPricer::new(config).unwrap().draw_variates().unwrap();

        assert_eq!(block.n_sources(), N_SOURCES);
        assert_eq!(block.n_steps(), 20);
        assert!(block.mean().abs() < 1e-9);
        assert!((block.std_dev() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_against_closure() {
        let pricer = HestonPricer::new(reference_config()).unwrap();
        let reference = |_: &SimulationConfig| -> Result<f64, AnalyticalError> { Ok(1.5) };

        let estimate = pricer.price_against(&reference).unwrap();
        assert_eq!(estimate.benchmark_value, 1.5);
        assert_eq!(estimate, pricer.price(1.5).unwrap());
    }

    #[test]
    fn test_price_against_failing_reference() {
        let pricer = HestonPricer::new(reference_config()).unwrap();
        let reference = |_: &SimulationConfig| -> Result<f64, AnalyticalError> {
            Err(AnalyticalError::NonFiniteResult { value: f64::NAN })
        };

        assert!(matches!(
            pricer.price_against(&reference),
            Err(PricingError::Benchmark(_))
        ));
    }

    #[test]
    fn test_price_rejects_zero_benchmark() {
        let pricer = HestonPricer::new(reference_config()).unwrap();
        assert!(matches!(
            pricer.price(0.0),
            Err(PricingError::Config(ConfigError::InvalidParameter {
                name: "benchmark",
                ..
            }))
        ));
    }

    #[test]
    fn test_paths_shapes() {
        let pricer = HestonPricer::new(reference_config()).unwrap();
        let paths = pricer.simulate().unwrap();

        assert_eq!(paths.variance.n_steps(), 20);
        assert_eq!(paths.variance.n_paths(), 1_000);
        assert_eq!(paths.asset.row(0), vec![10.0; 1_000].as_slice());
        assert_eq!(paths.variance.row(0), vec![0.01; 1_000].as_slice());
    }
}
