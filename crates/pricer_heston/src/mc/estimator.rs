//! Discounted-payoff estimator for the European call.

use super::error::{ensure_finite, ConfigError, PricingError};

/// Monte Carlo price estimate compared against a reference value.
///
/// # Examples
///
/// ```rust
/// use pricer_heston::mc::estimate_call;
///
/// let estimate = estimate_call(&[9.0, 11.0, 13.0], 10.0, 1.0, 1.5).unwrap();
/// assert!((estimate.mean_value - 4.0 / 3.0).abs() < 1e-12);
/// assert!((estimate.relative_error - (4.0 / 3.0 - 1.5) / 1.5).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceEstimate {
    /// Mean of the discounted payoffs.
    pub mean_value: f64,
    /// Population standard deviation of the discounted payoffs over √I.
    pub standard_error: f64,
    /// Reference price the estimate is compared against.
    pub benchmark_value: f64,
    /// `(mean_value − benchmark_value) / benchmark_value`.
    pub relative_error: f64,
}

impl PriceEstimate {
    /// Signed difference `mean_value − benchmark_value`.
    #[inline]
    pub fn absolute_error(&self) -> f64 {
        self.mean_value - self.benchmark_value
    }

    /// Returns the 95% confidence interval half-width.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.standard_error
    }

    /// Whether the benchmark lies within `k` standard errors of the mean.
    #[inline]
    pub fn within_standard_errors(&self, k: f64) -> bool {
        self.absolute_error().abs() <= k * self.standard_error
    }
}

/// Estimates a European call from terminal index levels.
///
/// `pv = discount · max(S_T − K, 0)`; the mean and population standard
/// deviation are taken over all paths with sequential sums.
///
/// # Errors
///
/// - `ConfigError::InvalidPathCount` if `terminal` is empty
/// - `ConfigError::InvalidParameter` if the benchmark is zero or not finite
/// - `PricingError::NumericalDegeneracy` if any discounted payoff is not finite
pub fn estimate_call(
    terminal: &[f64],
    strike: f64,
    discount_factor: f64,
    benchmark: f64,
) -> Result<PriceEstimate, PricingError> {
    if terminal.is_empty() {
        return Err(ConfigError::InvalidPathCount(0).into());
    }
    if !benchmark.is_finite() || benchmark == 0.0 {
        return Err(ConfigError::InvalidParameter {
            name: "benchmark",
            value: format!("{} (must be finite and non-zero)", benchmark),
        }
        .into());
    }

    let present_values: Vec<f64> = terminal
        .iter()
        .map(|&s| discount_factor * (s - strike).max(0.0))
        .collect();
    ensure_finite("payoffs", &present_values)?;

    let n = present_values.len() as f64;
    let mean = present_values.iter().sum::<f64>() / n;
    let variance = present_values.iter().map(|&pv| (pv - mean).powi(2)).sum::<f64>() / n;
    let standard_error = variance.sqrt() / n.sqrt();

    Ok(PriceEstimate {
        mean_value: mean,
        standard_error,
        benchmark_value: benchmark,
        relative_error: (mean - benchmark) / benchmark,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_estimate_values() {
        // Payoffs 0, 1, 3 discounted by 0.5: 0, 0.5, 1.5.
        let estimate = estimate_call(&[9.0, 11.0, 13.0], 10.0, 0.5, 1.0).unwrap();

        let mean: f64 = 2.0 / 3.0;
        let pop_var = ((0.0 - mean).powi(2) + (0.5 - mean).powi(2) + (1.5 - mean).powi(2)) / 3.0;

        assert_relative_eq!(estimate.mean_value, mean, epsilon = 1e-15);
        assert_relative_eq!(estimate.standard_error, pop_var.sqrt() / 3.0_f64.sqrt(), epsilon = 1e-15);
        assert_relative_eq!(estimate.relative_error, mean - 1.0, epsilon = 1e-15);
        assert_relative_eq!(estimate.absolute_error(), mean - 1.0, epsilon = 1e-15);
        assert_relative_eq!(estimate.confidence_95(), 1.96 * estimate.standard_error);
    }

    #[test]
    fn test_all_out_of_the_money() {
        let estimate = estimate_call(&[5.0, 6.0, 7.0], 10.0, 0.9, 0.1).unwrap();
        assert_eq!(estimate.mean_value, 0.0);
        assert_eq!(estimate.standard_error, 0.0);
        assert_relative_eq!(estimate.relative_error, -1.0);
    }

    #[test]
    fn test_within_standard_errors() {
        let estimate = PriceEstimate {
            mean_value: 1.02,
            standard_error: 0.01,
            benchmark_value: 1.0,
            relative_error: 0.02,
        };
        assert!(estimate.within_standard_errors(3.0));
        assert!(!estimate.within_standard_errors(1.0));
    }

    #[test]
    fn test_invalid_benchmark() {
        for benchmark in [0.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                estimate_call(&[11.0], 10.0, 1.0, benchmark),
                Err(PricingError::Config(ConfigError::InvalidParameter {
                    name: "benchmark",
                    ..
                }))
            ));
        }
    }

    #[test]
    fn test_non_finite_payoff() {
        let result = estimate_call(&[11.0, f64::INFINITY], 10.0, 1.0, 1.0);
        assert_eq!(
            result,
            Err(PricingError::NumericalDegeneracy {
                stage: "payoffs",
                count: 1
            })
        );
    }

    #[test]
    fn test_empty_terminal_row() {
        assert_eq!(
            estimate_call(&[], 10.0, 1.0, 1.0),
            Err(PricingError::Config(ConfigError::InvalidPathCount(0)))
        );
    }
}
