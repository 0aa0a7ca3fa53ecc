//! Price command implementation
//!
//! Prices the configured European call by Monte Carlo and compares the
//! estimate with the Lewis-integral benchmark.

use std::time::Instant;

use pricer_heston::analytical::LewisHeston;
use pricer_heston::mc::{HestonPricer, PriceEstimate, ReferencePricer, SimulationConfig};
use serde::Serialize;
use tracing::info;

use crate::config::RunConfig;
use crate::{OutputFormat, Result};

/// JSON document printed by `price --format json`.
#[derive(Debug, Serialize)]
struct PriceReport<'a> {
    config: &'a SimulationConfig,
    estimate: &'a PriceEstimate,
}

/// Run the price command
pub fn run(run_config: &RunConfig, format: OutputFormat) -> Result<String> {
    let config = run_config.simulation_config()?;
    info!(
        paths = config.n_paths(),
        steps = config.n_steps(),
        variance_scheme = %config.variance_scheme(),
        asset_scheme = %config.asset_scheme(),
        "Starting pricing"
    );

    let benchmark = LewisHeston.reference_price(&config)?;
    let started = Instant::now();
    let estimate = HestonPricer::new(config.clone())?.price(benchmark)?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Pricing complete");

    render(&config, &estimate, format)
}

/// Formats a price estimate.
pub fn render(config: &SimulationConfig, estimate: &PriceEstimate, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&PriceReport { config, estimate })?),
        OutputFormat::Table => Ok(render_table(config, estimate)),
    }
}

fn render_table(config: &SimulationConfig, estimate: &PriceEstimate) -> String {
    let mut lines = vec![
        format!(
            "Variance scheme: {}  Asset scheme: {}",
            config.variance_scheme(),
            config.asset_scheme()
        ),
        format!(
            "Paths: {}  Steps: {}  Antithetic: {}  Moment matching: {}",
            config.n_paths(),
            config.n_steps(),
            config.antithetic(),
            config.moment_matching()
        ),
        String::new(),
        format!("Call Price with Monte Carlo Simulation = {:.6}", estimate.mean_value),
        format!("Standard Error                        = {:.6}", estimate.standard_error),
        format!("Call Price with Semi-Analytical Formula = {:.6}", estimate.benchmark_value),
        format!(
            "Relative Error                        = {:.4}%",
            estimate.relative_error * 100.0
        ),
    ];
    if !estimate.within_standard_errors(3.0) {
        lines.push("Benchmark lies outside 3 standard errors".to_string());
    }
    lines.join("\n")
}
