//! Monte Carlo estimates against the semi-analytical Heston benchmark.
//!
//! # Test Categories
//!
//! 1. **Reference run**: I = 100,000, M = 50, log scheme, full truncation,
//!    moment matching; within 3 standard errors of the benchmark
//! 2. **Scheme coverage**: every variance scheme lands near the benchmark
//! 3. **Convergence**: standard error shrinks with the path count

use pricer_heston::analytical::{heston_call_value, LewisHeston};
use pricer_heston::mc::{
    AssetScheme, HestonParams, HestonPricer, ReferencePricer, SimulationConfig, VarianceScheme,
};

/// Reference parameters: S0 = K = 10, r = 5%, T = 1.
fn reference_params() -> HestonParams {
    HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1)
}

fn reference_config(n_paths: usize, n_steps: usize) -> SimulationConfig {
    SimulationConfig::builder()
        .spot(10.0)
        .strike(10.0)
        .rate(0.05)
        .maturity(1.0)
        .heston(reference_params())
        .n_steps(n_steps)
        .n_paths(n_paths)
        .variance_scheme(VarianceScheme::FullTruncation)
        .asset_scheme(AssetScheme::Log)
        .moment_matching(true)
        .seed(42)
        .build()
        .unwrap()
}

// ============================================================================
// Reference Run
// ============================================================================

#[test]
fn test_reference_run_matches_benchmark() {
    let benchmark = heston_call_value(10.0, 10.0, 1.0, 0.05, &reference_params()).unwrap();
    assert!((benchmark - 1.4913).abs() < 1e-3);

    let pricer = HestonPricer::new(reference_config(100_000, 50)).unwrap();
    let estimate = pricer.price(benchmark).unwrap();

    assert!(
        estimate.within_standard_errors(3.0),
        "MC={:.5}, benchmark={:.5}, error={:.5}, se={:.5}",
        estimate.mean_value,
        benchmark,
        estimate.absolute_error(),
        estimate.standard_error
    );
    assert!(estimate.relative_error.abs() < 0.03);
}

#[test]
fn test_reference_run_with_antithetic_pairing() {
    // M = 200 keeps the Euler bias well inside the sampling error.
    let config = reference_config(100_000, 200).to_builder().antithetic(true).build().unwrap();
    let estimate = HestonPricer::new(config).unwrap().price_against(&LewisHeston).unwrap();

    assert!(
        estimate.within_standard_errors(3.0),
        "MC={:.5}, benchmark={:.5}, error={:.5}, se={:.5}",
        estimate.mean_value,
        estimate.benchmark_value,
        estimate.absolute_error(),
        estimate.standard_error
    );
}

// ============================================================================
// Scheme Coverage
// ============================================================================

#[test]
fn test_all_variance_schemes_near_benchmark() {
    let benchmark = LewisHeston.reference_price(&reference_config(1, 1)).unwrap();

    for scheme in VarianceScheme::ALL {
        let config = reference_config(40_000, 50)
            .to_builder()
            .variance_scheme(scheme)
            .antithetic(true)
            .build()
            .unwrap();
        let estimate = HestonPricer::new(config).unwrap().price(benchmark).unwrap();

        // Feller holds comfortably here, so the schemes barely differ.
        assert!(
            estimate.relative_error.abs() < 0.05,
            "{}: MC={:.5}, benchmark={:.5}",
            scheme,
            estimate.mean_value,
            benchmark
        );
    }
}

#[test]
fn test_feller_violated_truncation_family_beats_reflection() {
    // 2κθ = 0.04 < σ² = 1: the discretised variance hits zero constantly.
    let params = HestonParams::new(0.04, 0.5, 0.04, 1.0, 0.0);
    let benchmark = heston_call_value(100.0, 100.0, 1.0, 0.02, &params).unwrap();

    let estimate = |scheme: VarianceScheme| {
        let config = SimulationConfig::builder()
            .spot(100.0)
            .strike(100.0)
            .rate(0.02)
            .maturity(1.0)
            .heston(params)
            .n_steps(100)
            .n_paths(40_000)
            .variance_scheme(scheme)
            .antithetic(true)
            .moment_matching(true)
            .seed(7)
            .build()
            .unwrap();
        HestonPricer::new(config).unwrap().price(benchmark).unwrap()
    };

    let full = estimate(VarianceScheme::FullTruncation);
    let partial = estimate(VarianceScheme::PartialTruncation);
    assert!(full.relative_error.abs() < 0.07, "full truncation: {:?}", full);
    assert!(partial.relative_error.abs() < 0.07, "partial truncation: {:?}", partial);

    // Reflection-type fixes push mass away from zero and overprice markedly.
    for scheme in [
        VarianceScheme::Reflection,
        VarianceScheme::HighamMao,
        VarianceScheme::SimpleReflection,
    ] {
        let reflected = estimate(scheme);
        assert!(reflected.relative_error > 0.2, "{}: {:?}", scheme, reflected);
    }

    // Truncating the observable series itself also biases upwards.
    let truncated = estimate(VarianceScheme::Truncation);
    assert!(truncated.mean_value > full.mean_value);
    assert_eq!(truncated, estimate(VarianceScheme::Absorption));
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn test_standard_error_shrinks_with_paths() {
    let small = HestonPricer::new(reference_config(5_000, 20)).unwrap().price(1.4913).unwrap();
    let large = HestonPricer::new(reference_config(80_000, 20)).unwrap().price(1.4913).unwrap();

    // 16x paths should cut the standard error by roughly 4x.
    let ratio = small.standard_error / large.standard_error;
    assert!(ratio > 3.0 && ratio < 5.0, "ratio = {}", ratio);
}
