//! Reference prices for the Monte Carlo estimates.
//!
//! - Heston (1993) semi-analytical call price via the Lewis (2001) single
//!   integral ([`heston_call_value`], [`LewisHeston`])
//! - Black-Scholes-Merton closed form ([`bsm_call_value`]), the
//!   constant-variance limit of the Heston model

mod black_scholes;
mod distributions;
mod error;
mod heston;

pub use black_scholes::{bsm_call_value, BlackScholes};
pub use distributions::norm_cdf;
pub use error::AnalyticalError;
pub use heston::{heston_call_value, LewisHeston};
