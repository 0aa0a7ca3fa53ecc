//! Error types for the analytical benchmark formulas.

use thiserror::Error;

/// Analytical pricing errors.
///
/// # Examples
/// ```
/// use pricer_heston::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
/// assert!(format!("{}", err).contains("volatility"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Non-positive or non-finite spot.
    #[error("Invalid spot price: S = {spot}")]
    InvalidSpot {
        /// The invalid spot price value
        spot: f64,
    },

    /// Non-positive or non-finite strike.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The invalid strike value
        strike: f64,
    },

    /// Non-positive or non-finite maturity.
    #[error("Invalid maturity: T = {maturity}")]
    InvalidMaturity {
        /// The invalid maturity value
        maturity: f64,
    },

    /// Non-positive or non-finite volatility (or vol-of-vol).
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// The invalid volatility value
        volatility: f64,
    },

    /// Correlation outside [-1, 1].
    #[error("Invalid correlation: ρ = {rho}")]
    InvalidCorrelation {
        /// The invalid correlation value
        rho: f64,
    },

    /// Other model parameter out of range.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// The invalid value
        value: f64,
    },

    /// The formula produced NaN or infinity.
    #[error("Non-finite analytical result: {value}")]
    NonFiniteResult {
        /// The offending value
        value: f64,
    },
}
