//! # Pricer Heston: Monte Carlo pricing under the Heston model
//!
//! Prices a European call on an index whose variance follows a CIR
//! square-root diffusion correlated with the index noise, and reports the
//! estimate with its standard error against a semi-analytical benchmark.
//!
//! ## Modules
//!
//! - [`rng`]: seeded standard-normal generation
//! - [`mc`]: configuration, correlated variates, the seven variance
//!   discretisation schemes, index paths, estimator and scheme comparison
//! - [`analytical`]: Lewis (2001) Heston integral and Black-Scholes reference
//!
//! ## Determinism
//!
//! Given a seed, every run is bit-reproducible. Path updates are
//! parallelised across paths with `rayon`; all cross-path reductions are
//! sequential.
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for schemes, parameters and results
//!
//! ## Usage
//!
//! ```rust
//! use pricer_heston::analytical::heston_call_value;
//! use pricer_heston::mc::{AssetScheme, HestonParams, HestonPricer, SimulationConfig};
//!
//! let params = HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1);
//! let benchmark = heston_call_value(10.0, 10.0, 1.0, 0.05, &params).unwrap();
//!
//! let config = SimulationConfig::builder()
//!     .spot(10.0)
//!     .strike(10.0)
//!     .rate(0.05)
//!     .maturity(1.0)
//!     .heston(params)
//!     .n_steps(20)
//!     .n_paths(2_000)
//!     .asset_scheme(AssetScheme::Log)
//!     .moment_matching(true)
//!     .build()
//!     .unwrap();
//!
//! let estimate = HestonPricer::new(config).unwrap().price(benchmark).unwrap();
//! assert!(estimate.standard_error > 0.0);
//! ```

#![deny(missing_docs)]

pub mod analytical;
pub mod mc;
pub mod rng;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
