//! Heston Monte Carlo simulation configuration.
//!
//! This module provides the immutable [`SimulationConfig`] value, its
//! validating builder, the Heston parameter set and the two discretisation
//! tags ([`VarianceScheme`], [`AssetScheme`]).

use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of time steps allowed per path.
pub const MAX_STEPS: usize = 10_000;

/// Discretisation scheme for the square-root variance process.
///
/// Each variant prevents the Euler-discretised CIR process from going (or
/// compounding) negative in a different way. Schemes marked *auxiliary*
/// evolve an unconstrained series x̃ and only clamp or reflect it when
/// exposing the observable value.
///
/// | Scheme | Auxiliary | Observable |
/// |--------|-----------|------------|
/// | `FullTruncation` | yes | x̃⁺ |
/// | `PartialTruncation` | yes | x̃⁺ |
/// | `Truncation` | no | max(0, ·) |
/// | `Reflection` | yes | \|x̃\| |
/// | `HighamMao` | yes | \|x̃\| |
/// | `SimpleReflection` | no | \|·\| |
/// | `Absorption` | no | max(0, ·) of the step from x⁺ |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VarianceScheme {
    /// Lord, Koekkoek & van Dijk full truncation.
    #[default]
    FullTruncation,
    /// Deelstra & Delbaen partial truncation.
    PartialTruncation,
    /// Truncation applied directly to the observable series.
    Truncation,
    /// Reflection of the auxiliary series.
    Reflection,
    /// Higham & Mao: diffusion on |x̃|, observable |x̃|.
    HighamMao,
    /// Reflection applied directly to the observable series.
    SimpleReflection,
    /// Absorption at zero.
    Absorption,
}

impl VarianceScheme {
    /// All seven schemes, in canonical order.
    pub const ALL: [VarianceScheme; 7] = [
        VarianceScheme::FullTruncation,
        VarianceScheme::PartialTruncation,
        VarianceScheme::Truncation,
        VarianceScheme::Reflection,
        VarianceScheme::HighamMao,
        VarianceScheme::SimpleReflection,
        VarianceScheme::Absorption,
    ];

    /// Canonical snake_case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            VarianceScheme::FullTruncation => "full_truncation",
            VarianceScheme::PartialTruncation => "partial_truncation",
            VarianceScheme::Truncation => "truncation",
            VarianceScheme::Reflection => "reflection",
            VarianceScheme::HighamMao => "higham_mao",
            VarianceScheme::SimpleReflection => "simple_reflection",
            VarianceScheme::Absorption => "absorption",
        }
    }

    /// Whether the scheme keeps a separate unconstrained series between steps.
    pub fn uses_auxiliary(&self) -> bool {
        matches!(
            self,
            VarianceScheme::FullTruncation
                | VarianceScheme::PartialTruncation
                | VarianceScheme::Reflection
                | VarianceScheme::HighamMao
        )
    }
}

impl fmt::Display for VarianceScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VarianceScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase().replace('-', "_");
        VarianceScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == tag)
            .ok_or_else(|| ConfigError::UnknownVarianceScheme(s.to_string()))
    }
}

/// Discretisation of the index level given the variance paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AssetScheme {
    /// Exact-log Euler step: `S·exp((r − v/2)dt + √v·z·√dt)`.
    #[default]
    Log,
    /// Simple multiplicative Euler step: `S·(exp(r·dt) + √v·z·√dt)`.
    ///
    /// Kept as a labelled alternative for comparison only: it omits the
    /// variance correction of the log scheme.
    Naive,
}

impl AssetScheme {
    /// Both schemes, in canonical order.
    pub const ALL: [AssetScheme; 2] = [AssetScheme::Log, AssetScheme::Naive];

    /// Canonical tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetScheme::Log => "log",
            AssetScheme::Naive => "naive",
        }
    }
}

impl fmt::Display for AssetScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "log" | "exact" => Ok(AssetScheme::Log),
            "naive" => Ok(AssetScheme::Naive),
            _ => Err(ConfigError::UnknownAssetScheme(s.to_string())),
        }
    }
}

/// Heston variance-process parameters.
///
/// ```text
/// dS = r S dt + √v S dW_S
/// dv = κ(θ − v) dt + σ √v dW_v,   E[dW_S dW_v] = ρ dt
/// ```
///
/// # Examples
///
/// ```rust
/// use pricer_heston::mc::HestonParams;
///
/// let params = HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1);
/// assert!(params.validate().is_ok());
/// assert!(params.satisfies_feller());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonParams {
    /// Initial variance (v₀).
    pub v0: f64,
    /// Mean-reversion speed (κ).
    pub kappa: f64,
    /// Long-run variance (θ).
    pub theta: f64,
    /// Volatility of variance (σ).
    pub sigma: f64,
    /// Asset/variance correlation (ρ).
    pub rho: f64,
}

impl HestonParams {
    /// Creates a new parameter set (unvalidated).
    #[inline]
    pub fn new(v0: f64, kappa: f64, theta: f64, sigma: f64, rho: f64) -> Self {
        Self {
            v0,
            kappa,
            theta,
            sigma,
            rho,
        }
    }

    /// Checks the Feller condition `2κθ > σ²`.
    #[inline]
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma * self.sigma
    }

    /// Validates the parameters.
    ///
    /// `v0`, `kappa`, `theta` and `sigma` must be finite and non-negative
    /// (`sigma = 0` is the deterministic-variance limit); `rho` must lie in
    /// [-1, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("v0", self.v0)?;
        non_negative("kappa", self.kappa)?;
        non_negative("theta", self.theta)?;
        non_negative("sigma", self.sigma)?;
        if !self.rho.is_finite() || self.rho.abs() > 1.0 {
            return Err(ConfigError::InvalidCorrelation(self.rho));
        }
        Ok(())
    }
}

/// Heston Monte Carlo configuration.
///
/// Immutable; construct through [`SimulationConfig::builder`].
///
/// # Examples
///
/// ```rust
/// use pricer_heston::mc::{AssetScheme, HestonParams, SimulationConfig, VarianceScheme};
///
/// let config = SimulationConfig::builder()
///     .spot(10.0)
///     .strike(10.0)
///     .rate(0.05)
///     .maturity(1.0)
///     .heston(HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1))
///     .n_steps(50)
///     .n_paths(10_000)
///     .variance_scheme(VarianceScheme::FullTruncation)
///     .asset_scheme(AssetScheme::Log)
///     .moment_matching(true)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_paths(), 10_000);
/// assert!((config.dt() - 0.02).abs() < 1e-15);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimulationConfig {
    spot: f64,
    strike: f64,
    rate: f64,
    maturity: f64,
    n_steps: usize,
    n_paths: usize,
    heston: HestonParams,
    variance_scheme: VarianceScheme,
    asset_scheme: AssetScheme,
    antithetic: bool,
    moment_matching: bool,
    seed: Option<u64>,
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Returns a builder pre-filled with this configuration.
    pub fn to_builder(&self) -> SimulationConfigBuilder {
        SimulationConfigBuilder {
            spot: Some(self.spot),
            strike: Some(self.strike),
            rate: self.rate,
            maturity: Some(self.maturity),
            n_steps: Some(self.n_steps),
            n_paths: Some(self.n_paths),
            heston: Some(self.heston),
            variance_scheme: self.variance_scheme,
            asset_scheme: self.asset_scheme,
            antithetic: self.antithetic,
            moment_matching: self.moment_matching,
            seed: self.seed,
        }
    }

    /// Initial index level S₀.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Strike K.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Constant short rate r.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Horizon T in years.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Number of time steps M.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of paths I.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Heston variance-process parameters.
    #[inline]
    pub fn heston(&self) -> &HestonParams {
        &self.heston
    }

    /// Variance discretisation.
    #[inline]
    pub fn variance_scheme(&self) -> VarianceScheme {
        self.variance_scheme
    }

    /// Asset discretisation.
    #[inline]
    pub fn asset_scheme(&self) -> AssetScheme {
        self.asset_scheme
    }

    /// Whether antithetic pairing is enabled.
    #[inline]
    pub fn antithetic(&self) -> bool {
        self.antithetic
    }

    /// Whether moment matching (and the per-step drift-bias correction) is enabled.
    #[inline]
    pub fn moment_matching(&self) -> bool {
        self.moment_matching
    }

    /// Optional seed for reproducibility.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Time step `T / M`.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.maturity / self.n_steps as f64
    }

    /// Discount factor `exp(−rT)`.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `n_paths` is 0 or greater than 10,000,000
    /// - `n_steps` is 0 or greater than 10,000
    /// - `antithetic` is set and `n_paths` is odd
    /// - spot, strike or maturity is not positive, or the rate is not finite
    /// - any Heston parameter is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(ConfigError::InvalidPathCount(self.n_paths));
        }
        if self.n_steps == 0 || self.n_steps > MAX_STEPS {
            return Err(ConfigError::InvalidStepCount(self.n_steps));
        }
        if self.antithetic && self.n_paths % 2 != 0 {
            return Err(ConfigError::OddAntitheticPathCount(self.n_paths));
        }
        positive("spot", self.spot)?;
        positive("strike", self.strike)?;
        positive("maturity", self.maturity)?;
        if !self.rate.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "rate",
                value: format!("{} is not finite", self.rate),
            });
        }
        self.heston.validate()
    }
}

/// Builder for [`SimulationConfig`].
///
/// `spot`, `strike`, `maturity`, `heston`, `n_steps` and `n_paths` are
/// required. Defaults: rate 0, full truncation, log scheme, no variance
/// reduction, no seed.
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    spot: Option<f64>,
    strike: Option<f64>,
    rate: f64,
    maturity: Option<f64>,
    n_steps: Option<usize>,
    n_paths: Option<usize>,
    heston: Option<HestonParams>,
    variance_scheme: VarianceScheme,
    asset_scheme: AssetScheme,
    antithetic: bool,
    moment_matching: bool,
    seed: Option<u64>,
}

impl SimulationConfigBuilder {
    /// Sets the initial index level S₀.
    #[inline]
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    /// Sets the strike K.
    #[inline]
    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    /// Sets the constant short rate r.
    #[inline]
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the horizon T (years).
    #[inline]
    pub fn maturity(mut self, maturity: f64) -> Self {
        self.maturity = Some(maturity);
        self
    }

    /// Sets the Heston parameters.
    #[inline]
    pub fn heston(mut self, heston: HestonParams) -> Self {
        self.heston = Some(heston);
        self
    }

    /// Sets the number of time steps M in [1, 10_000].
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = Some(n_steps);
        self
    }

    /// Sets the number of paths I in [1, 10_000_000].
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the variance discretisation.
    #[inline]
    pub fn variance_scheme(mut self, scheme: VarianceScheme) -> Self {
        self.variance_scheme = scheme;
        self
    }

    /// Sets the asset discretisation.
    #[inline]
    pub fn asset_scheme(mut self, scheme: AssetScheme) -> Self {
        self.asset_scheme = scheme;
        self
    }

    /// Enables or disables antithetic pairing.
    #[inline]
    pub fn antithetic(mut self, enabled: bool) -> Self {
        self.antithetic = enabled;
        self
    }

    /// Enables or disables moment matching.
    #[inline]
    pub fn moment_matching(mut self, enabled: bool) -> Self {
        self.moment_matching = enabled;
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required field is missing or
    /// [`SimulationConfig::validate`] fails.
    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let config = SimulationConfig {
            spot: required("spot", self.spot)?,
            strike: required("strike", self.strike)?,
            rate: self.rate,
            maturity: required("maturity", self.maturity)?,
            n_steps: required("n_steps", self.n_steps)?,
            n_paths: required("n_paths", self.n_paths)?,
            heston: required("heston", self.heston)?,
            variance_scheme: self.variance_scheme,
            asset_scheme: self.asset_scheme,
            antithetic: self.antithetic,
            moment_matching: self.moment_matching,
            seed: self.seed,
        };

        config.validate()?;
        Ok(config)
    }
}

fn required<T>(name: &'static str, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::InvalidParameter {
        name,
        value: "must be specified".to_string(),
    })
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            value: format!("{} (must be positive and finite)", value),
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            value: format!("{} (must be non-negative and finite)", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_builder() -> SimulationConfigBuilder {
        SimulationConfig::builder()
            .spot(10.0)
            .strike(10.0)
            .rate(0.05)
            .maturity(1.0)
            .heston(HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1))
            .n_steps(50)
            .n_paths(1000)
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = reference_builder().build().unwrap();

        assert_eq!(config.n_paths(), 1000);
        assert_eq!(config.n_steps(), 50);
        assert_eq!(config.variance_scheme(), VarianceScheme::FullTruncation);
        assert_eq!(config.asset_scheme(), AssetScheme::Log);
        assert!(!config.antithetic());
        assert!(!config.moment_matching());
        assert_eq!(config.seed(), None);
        assert!((config.dt() - 0.02).abs() < 1e-15);
        assert!((config.discount_factor() - (-0.05_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_config_round_trips_through_builder() {
        let config = reference_builder()
            .antithetic(true)
            .moment_matching(true)
            .seed(7)
            .variance_scheme(VarianceScheme::HighamMao)
            .build()
            .unwrap();
        let rebuilt = config.to_builder().build().unwrap();
        assert_eq!(config, rebuilt);
    }

    #[test]
    fn test_config_invalid_zero_paths() {
        let result = reference_builder().n_paths(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidPathCount(0))));
    }

    #[test]
    fn test_config_invalid_too_many_steps() {
        let result = reference_builder().n_steps(MAX_STEPS + 1).build();
        assert!(matches!(result, Err(ConfigError::InvalidStepCount(_))));
    }

    #[test]
    fn test_config_zero_steps() {
        let result = reference_builder().n_steps(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidStepCount(0))));
    }

    #[test]
    fn test_config_rejects_odd_antithetic_paths() {
        let result = reference_builder().n_paths(1001).antithetic(true).build();
        assert_eq!(result, Err(ConfigError::OddAntitheticPathCount(1001)));

        // Odd counts are fine without pairing.
        assert!(reference_builder().n_paths(1001).build().is_ok());
    }

    #[test]
    fn test_config_rejects_invalid_rho() {
        let result = reference_builder()
            .heston(HestonParams::new(0.01, 1.5, 0.2, 0.15, 1.2))
            .build();
        assert_eq!(result, Err(ConfigError::InvalidCorrelation(1.2)));
    }

    #[test]
    fn test_config_missing_heston() {
        let result = SimulationConfig::builder()
            .spot(10.0)
            .strike(10.0)
            .maturity(1.0)
            .n_steps(10)
            .n_paths(10)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "heston", .. })
        ));
    }

    #[test]
    fn test_config_rejects_non_positive_spot() {
        let result = reference_builder().spot(0.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "spot", .. })
        ));
    }

    #[test]
    fn test_heston_params_allow_zero_vol_of_vol() {
        assert!(HestonParams::new(0.04, 1.0, 0.04, 0.0, -0.5)
            .validate()
            .is_ok());
        assert!(HestonParams::new(-0.01, 1.0, 0.04, 0.1, 0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_feller_condition() {
        // 2 * 1.5 * 0.2 = 0.6 > 0.0225
        assert!(HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1).satisfies_feller());
        // 2 * 0.5 * 0.01 = 0.01 < 0.25
        assert!(!HestonParams::new(0.01, 0.5, 0.01, 0.5, 0.1).satisfies_feller());
    }

    #[test]
    fn test_variance_scheme_parsing() {
        for scheme in VarianceScheme::ALL {
            assert_eq!(scheme.as_str().parse::<VarianceScheme>(), Ok(scheme));
        }
        assert_eq!(
            "Higham-Mao".parse::<VarianceScheme>(),
            Ok(VarianceScheme::HighamMao)
        );
        assert_eq!(
            "euler".parse::<VarianceScheme>(),
            Err(ConfigError::UnknownVarianceScheme("euler".to_string()))
        );
    }

    #[test]
    fn test_asset_scheme_parsing() {
        assert_eq!("log".parse::<AssetScheme>(), Ok(AssetScheme::Log));
        assert_eq!("EXACT".parse::<AssetScheme>(), Ok(AssetScheme::Log));
        assert_eq!("naive".parse::<AssetScheme>(), Ok(AssetScheme::Naive));
        assert!(matches!(
            "milstein".parse::<AssetScheme>(),
            Err(ConfigError::UnknownAssetScheme(_))
        ));
    }

    #[test]
    fn test_auxiliary_schemes() {
        let auxiliary: Vec<_> = VarianceScheme::ALL
            .into_iter()
            .filter(VarianceScheme::uses_auxiliary)
            .collect();
        assert_eq!(
            auxiliary,
            vec![
                VarianceScheme::FullTruncation,
                VarianceScheme::PartialTruncation,
                VarianceScheme::Reflection,
                VarianceScheme::HighamMao,
            ]
        );
    }
}
