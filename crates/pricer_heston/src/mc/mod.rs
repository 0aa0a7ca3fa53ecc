//! Monte Carlo kernel for the Heston model.
//!
//! # Architecture
//!
//! ```text
//! HestonPricer
//! ├── SimulationConfig   (immutable run parameters)
//! ├── CholeskyFactor     (asset/variance correlation)
//! └── Orchestration
//!     ├── VariateBlock::standard_normal()   antithetic pairing
//!     ├── VariateBlock::moment_matched()
//!     ├── VarianceStepper                   seven CIR schemes
//!     ├── AssetStepper                      log / naive, drift-bias correction
//!     └── estimate_call()
//! ```
//!
//! # Examples
//!
//! ```rust
//! use pricer_heston::analytical::LewisHeston;
//! use pricer_heston::mc::{HestonParams, HestonPricer, SimulationConfig, VarianceScheme};
//!
//! let config = SimulationConfig::builder()
//!     .spot(10.0)
//!     .strike(10.0)
//!     .rate(0.05)
//!     .maturity(1.0)
//!     .heston(HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1))
//!     .n_steps(25)
//!     .n_paths(4_000)
//!     .variance_scheme(VarianceScheme::FullTruncation)
//!     .antithetic(true)
//!     .moment_matching(true)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let pricer = HestonPricer::new(config).unwrap();
//! let estimate = pricer.price_against(&LewisHeston).unwrap();
//! println!(
//!     "{:.4} +/- {:.4} (benchmark {:.4})",
//!     estimate.mean_value,
//!     estimate.confidence_95(),
//!     estimate.benchmark_value
//! );
//! ```

mod asset;
mod config;
mod correlation;
mod error;
mod estimator;
pub mod experiment;
mod paths;
mod pricer;
mod variance;
mod variates;

pub use asset::{simulate_asset, AssetStepper};
pub use config::{
    AssetScheme, HestonParams, SimulationConfig, SimulationConfigBuilder, VarianceScheme, MAX_PATHS,
    MAX_STEPS,
};
pub use correlation::{CholeskyFactor, CorrelationMatrix};
pub use error::{ConfigError, PricingError};
pub use estimator::{estimate_call, PriceEstimate};
pub use experiment::{ComparisonRow, SchemeComparison};
pub use paths::PathMatrix;
pub use pricer::{HestonPricer, ReferencePricer, SimulatedPaths, ASSET_ROW, N_SOURCES, VARIANCE_ROW};
pub use variance::{simulate_variance, VarianceStepper};
pub use variates::VariateBlock;
