//! Semi-analytical Heston (1993) call price via the Lewis (2001) integral.
//!
//! ```text
//! C = max(0, S₀ − e^{−rT} √(S₀K) / π · ∫₀^∞ Re[e^{iu·ln(S₀/K)} φ(u − i/2)] / (u² + ¼) du)
//! ```
//!
//! with the Heston characteristic function of the log-return
//!
//! ```text
//! c₁ = κθ
//! c₂ = −√((ρσui − κ)² − σ²(−ui − u²))
//! c₃ = (κ − ρσui + c₂) / (κ − ρσui − c₂)
//! H₁ = r·ui·T + (c₁/σ²)·((κ − ρσui + c₂)T − 2 ln((1 − c₃e^{c₂T}) / (1 − c₃)))
//! H₂ = (κ − ρσui + c₂)/σ² · (1 − e^{c₂T}) / (1 − c₃e^{c₂T})
//! φ(u) = exp(H₁ + H₂·v₀)
//! ```
//!
//! The integrand decays like `e^{−c·u}`; it is below 1e-15 well before
//! `u = 100`, which is used as the upper limit.

use num_complex::Complex64;
use quadrature::double_exponential;

use super::error::AnalyticalError;
use crate::mc::{HestonParams, ReferencePricer, SimulationConfig};

/// Upper limit of the truncated Lewis integral.
const UPPER_LIMIT: f64 = 100.0;

/// Target error of the double-exponential quadrature.
const QUADRATURE_TOLERANCE: f64 = 1e-10;

/// Heston (1993) characteristic function of `ln(S_T / S₀)` at complex `u`.
fn characteristic_function(u: Complex64, maturity: f64, rate: f64, params: &HestonParams) -> Complex64 {
    let HestonParams {
        v0,
        kappa,
        theta,
        sigma,
        rho,
    } = *params;
    let i = Complex64::i();
    let sigma_sq = sigma * sigma;

    let c1 = kappa * theta;
    let rsui = rho * sigma * u * i;
    let c2 = -((rsui - kappa).powi(2) - sigma_sq * (-u * i - u * u)).sqrt();
    let c3 = (kappa - rsui + c2) / (kappa - rsui - c2);
    let growth = (c2 * maturity).exp();

    let h1 = rate * u * i * maturity
        + (c1 / sigma_sq) * ((kappa - rsui + c2) * maturity - 2.0 * ((1.0 - c3 * growth) / (1.0 - c3)).ln());
    let h2 = (kappa - rsui + c2) / sigma_sq * ((1.0 - growth) / (1.0 - c3 * growth));

    (h1 + h2 * v0).exp()
}

/// Lewis (2001) integrand.
fn lewis_integrand(u: f64, spot: f64, strike: f64, maturity: f64, rate: f64, params: &HestonParams) -> f64 {
    let shifted = Complex64::new(u, -0.5);
    let phase = Complex64::new(0.0, u * (spot / strike).ln()).exp();
    let value = phase * characteristic_function(shifted, maturity, rate, params);
    value.re / (u * u + 0.25)
}

/// Semi-analytical Heston European call value.
///
/// # Errors
///
/// - `AnalyticalError::InvalidSpot`, `InvalidStrike`, `InvalidMaturity` for
///   non-positive inputs
/// - `AnalyticalError::InvalidVolatility` if `sigma` is not positive (the
///   formula divides by σ²)
/// - `AnalyticalError::InvalidParameter` for negative `v0`, `kappa` or `theta`
/// - `AnalyticalError::InvalidCorrelation` if `|rho| > 1`
/// - `AnalyticalError::NonFiniteResult` if the integral is not finite
///
/// # Examples
///
/// ```
/// use pricer_heston::analytical::heston_call_value;
/// use pricer_heston::mc::HestonParams;
///
/// let params = HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1);
/// let value = heston_call_value(10.0, 10.0, 1.0, 0.05, &params).unwrap();
/// assert!((value - 1.49125).abs() < 1e-4);
/// ```
pub fn heston_call_value(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    params: &HestonParams,
) -> Result<f64, AnalyticalError> {
    validate(spot, strike, maturity, rate, params)?;

    let integral = double_exponential::integrate(
        |u| lewis_integrand(u, spot, strike, maturity, rate, params),
        0.0,
        UPPER_LIMIT,
        QUADRATURE_TOLERANCE,
    )
    .integral;

    let value = spot - (-rate * maturity).exp() * (spot * strike).sqrt() / std::f64::consts::PI * integral;
    if !value.is_finite() {
        return Err(AnalyticalError::NonFiniteResult { value });
    }
    Ok(value.max(0.0))
}

fn validate(spot: f64, strike: f64, maturity: f64, rate: f64, params: &HestonParams) -> Result<(), AnalyticalError> {
    if !(spot > 0.0 && spot.is_finite()) {
        return Err(AnalyticalError::InvalidSpot { spot });
    }
    if !(strike > 0.0 && strike.is_finite()) {
        return Err(AnalyticalError::InvalidStrike { strike });
    }
    if !(maturity > 0.0 && maturity.is_finite()) {
        return Err(AnalyticalError::InvalidMaturity { maturity });
    }
    if !rate.is_finite() {
        return Err(AnalyticalError::InvalidParameter { name: "rate", value: rate });
    }
    if !(params.sigma > 0.0 && params.sigma.is_finite()) {
        return Err(AnalyticalError::InvalidVolatility {
            volatility: params.sigma,
        });
    }
    for (name, value) in [("v0", params.v0), ("kappa", params.kappa), ("theta", params.theta)] {
        if !(value >= 0.0 && value.is_finite()) {
            return Err(AnalyticalError::InvalidParameter { name, value });
        }
    }
    if !(params.rho.abs() <= 1.0) {
        return Err(AnalyticalError::InvalidCorrelation { rho: params.rho });
    }
    Ok(())
}

/// Lewis-integral Heston price as a [`ReferencePricer`].
///
/// # Examples
///
/// ```
/// use pricer_heston::analytical::LewisHeston;
/// use pricer_heston::mc::{HestonParams, ReferencePricer, SimulationConfig};
///
/// let config = SimulationConfig::builder()
///     .spot(10.0)
///     .strike(10.0)
///     .rate(0.05)
///     .maturity(1.0)
///     .heston(HestonParams::new(0.01, 1.5, 0.2, 0.15, 0.1))
///     .n_steps(50)
///     .n_paths(1_000)
///     .build()
///     .unwrap();
///
/// let benchmark = LewisHeston.reference_price(&config).unwrap();
/// assert!((benchmark - 1.49125).abs() < 1e-4);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LewisHeston;

impl ReferencePricer for LewisHeston {
    fn reference_price(&self, config: &SimulationConfig) -> Result<f64, AnalyticalError> {
        heston_call_value(
            config.spot(),
            config.strike(),
            config.maturity(),
            config.rate(),
            config.heston(),
        )
    }
}
