//! CLI error types.

use pricer_heston::analytical::AnalyticalError;
use pricer_heston::mc::{ConfigError, PricingError};
use thiserror::Error;

/// Errors surfaced by `heston-mcs`.
#[derive(Debug, Error)]
pub enum CliError {
    /// Explicitly requested configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    ConfigFile(String),

    /// Invalid value in the run configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Simulation configuration rejected by the pricer.
    #[error(transparent)]
    Simulation(#[from] ConfigError),

    /// Pricing run failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Benchmark formula failed.
    #[error("Benchmark pricing failed: {0}")]
    Analytical(#[from] AnalyticalError),

    /// Output serialisation failed.
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
