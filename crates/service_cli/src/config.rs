//! Run configuration.
//!
//! Loaded from a TOML file, with command-line flags taking precedence. Every
//! field has a default; the defaults reproduce the reference run
//! (S₀ = K = 10, r = 5%, T = 1, v₀ = 0.01, κ = 1.5, θ = 0.2, σ = 0.15,
//! ρ = 0.1, 100,000 paths, 50 steps, full truncation, log scheme).
//!
//! ```toml
//! log_level = "info"
//!
//! [option]
//! spot = 10.0
//! strike = 10.0
//!
//! [simulation]
//! paths = 200000
//! variance_scheme = "higham_mao"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pricer_heston::mc::{AssetScheme, HestonParams, SimulationConfig, VarianceScheme};
use serde::Deserialize;

use crate::error::{CliError, Result};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "heston-mcs.toml";

/// Log levels accepted in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::InvalidConfig(format!(
                "invalid log level '{}': must be one of trace, debug, info, warn, error",
                s
            ))),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Contract terms of the European call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptionSection {
    /// Initial index level
    pub spot: f64,
    /// Strike
    pub strike: f64,
    /// Constant short rate
    pub rate: f64,
    /// Maturity in years
    pub maturity: f64,
}

impl Default for OptionSection {
    fn default() -> Self {
        Self {
            spot: 10.0,
            strike: 10.0,
            rate: 0.05,
            maturity: 1.0,
        }
    }
}

/// Heston model parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Initial variance
    pub v0: f64,
    /// Mean-reversion speed
    pub kappa: f64,
    /// Long-run variance
    pub theta: f64,
    /// Volatility of variance
    pub sigma: f64,
    /// Asset/variance correlation
    pub rho: f64,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            v0: 0.01,
            kappa: 1.5,
            theta: 0.2,
            sigma: 0.15,
            rho: 0.1,
        }
    }
}

impl ModelSection {
    /// Model parameters as the library type.
    pub fn params(&self) -> HestonParams {
        HestonParams::new(self.v0, self.kappa, self.theta, self.sigma, self.rho)
    }
}

/// Discretisation and variance-reduction settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Number of paths
    pub paths: usize,
    /// Number of time steps
    pub steps: usize,
    /// Seed (0 when absent)
    pub seed: Option<u64>,
    /// Variance discretisation
    #[serde(deserialize_with = "deserialize_from_str")]
    pub variance_scheme: VarianceScheme,
    /// Asset discretisation
    #[serde(deserialize_with = "deserialize_from_str")]
    pub asset_scheme: AssetScheme,
    /// Antithetic pairing
    pub antithetic: bool,
    /// Moment matching and drift-bias correction
    pub moment_matching: bool,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            paths: 100_000,
            steps: 50,
            seed: None,
            variance_scheme: VarianceScheme::FullTruncation,
            asset_scheme: AssetScheme::Log,
            antithetic: true,
            moment_matching: true,
        }
    }
}

/// Settings of the `compare` command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompareSection {
    /// Seeded runs per combination
    pub runs: usize,
    /// Absolute error tolerance
    pub abs_tol: f64,
    /// Relative error tolerance
    pub rel_tol: f64,
}

impl Default for CompareSection {
    fn default() -> Self {
        Self {
            runs: 5,
            abs_tol: pricer_heston::mc::experiment::DEFAULT_ABS_TOL,
            rel_tol: pricer_heston::mc::experiment::DEFAULT_REL_TOL,
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Log level
    #[serde(deserialize_with = "deserialize_from_str")]
    pub log_level: LogLevel,
    /// Contract terms
    pub option: OptionSection,
    /// Model parameters
    pub model: ModelSection,
    /// Simulation settings
    pub simulation: SimulationSection,
    /// Comparison settings
    pub compare: CompareSection,
}

/// Deserialises a tag through its `FromStr` impl, so the file accepts the
/// same spellings as the command line.
fn deserialize_from_str<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

/// Overrides taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct SimulationOverrides {
    /// Path count override
    pub paths: Option<usize>,
    /// Step count override
    pub steps: Option<usize>,
    /// Seed override
    pub seed: Option<u64>,
    /// Variance scheme override
    pub variance_scheme: Option<VarianceScheme>,
    /// Asset scheme override
    pub asset_scheme: Option<AssetScheme>,
    /// Antithetic override
    pub antithetic: Option<bool>,
    /// Moment-matching override
    pub moment_matching: Option<bool>,
}

impl RunConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::ConfigFile(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(content)
            .map_err(|e| CliError::ConfigFile(format!("failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for this invocation.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read if present and the built-in defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(CliError::FileNotFound(path.display().to_string())),
            Some(path) => Self::from_file(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.simulation_config()?;
        if self.compare.runs == 0 {
            return Err(CliError::InvalidConfig("compare.runs must be at least 1".to_string()));
        }
        for (name, value) in [("compare.abs_tol", self.compare.abs_tol), ("compare.rel_tol", self.compare.rel_tol)] {
            if !(value >= 0.0) {
                return Err(CliError::InvalidConfig(format!("{} must be non-negative, got {}", name, value)));
            }
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &SimulationOverrides) {
        let sim = &mut self.simulation;
        if let Some(paths) = cli.paths {
            sim.paths = paths;
        }
        if let Some(steps) = cli.steps {
            sim.steps = steps;
        }
        if let Some(seed) = cli.seed {
            sim.seed = Some(seed);
        }
        if let Some(scheme) = cli.variance_scheme {
            sim.variance_scheme = scheme;
        }
        if let Some(scheme) = cli.asset_scheme {
            sim.asset_scheme = scheme;
        }
        if let Some(antithetic) = cli.antithetic {
            sim.antithetic = antithetic;
        }
        if let Some(moment_matching) = cli.moment_matching {
            sim.moment_matching = moment_matching;
        }
    }

    /// Builds the validated library configuration.
    pub fn simulation_config(&self) -> Result<SimulationConfig> {
        let sim = &self.simulation;
        let mut builder = SimulationConfig::builder()
            .spot(self.option.spot)
            .strike(self.option.strike)
            .rate(self.option.rate)
            .maturity(self.option.maturity)
            .heston(self.model.params())
            .n_steps(sim.steps)
            .n_paths(sim.paths)
            .variance_scheme(sim.variance_scheme)
            .asset_scheme(sim.asset_scheme)
            .antithetic(sim.antithetic)
            .moment_matching(sim.moment_matching);
        if let Some(seed) = sim.seed {
            builder = builder.seed(seed);
        }
        Ok(builder.build()?)
    }
}
