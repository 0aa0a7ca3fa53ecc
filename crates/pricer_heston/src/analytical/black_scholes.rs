//! Black-Scholes-Merton reference price for European options.
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! Used as the constant-variance limit of the Heston model: with σ_v → 0
//! and v₀ = θ the Heston call converges to the Black-Scholes call at
//! volatility √v₀.

use super::distributions::norm_cdf;
use super::error::AnalyticalError;

/// Black-Scholes model for European option pricing.
///
/// # Examples
/// ```
/// use pricer_heston::analytical::BlackScholes;
///
/// let bs = BlackScholes::new(100.0, 0.05, 0.2).unwrap();
/// let call_price = bs.price_call(100.0, 1.0);
///
/// // Bounded below by the discounted intrinsic value
/// assert!(call_price > 100.0 - 100.0 * (-0.05_f64).exp());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes {
    spot: f64,
    rate: f64,
    volatility: f64,
}

impl BlackScholes {
    /// Creates a new Black-Scholes model.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidSpot` if spot <= 0
    /// - `AnalyticalError::InvalidVolatility` if volatility <= 0
    pub fn new(spot: f64, rate: f64, volatility: f64) -> Result<Self, AnalyticalError> {
        if !(spot > 0.0 && spot.is_finite()) {
            return Err(AnalyticalError::InvalidSpot { spot });
        }
        if !(volatility > 0.0 && volatility.is_finite()) {
            return Err(AnalyticalError::InvalidVolatility { volatility });
        }
        Ok(Self {
            spot,
            rate,
            volatility,
        })
    }

    /// d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
    #[inline]
    fn d1(&self, strike: f64, expiry: f64) -> f64 {
        let vol_sqrt_t = self.volatility * expiry.sqrt();
        ((self.spot / strike).ln() + (self.rate + 0.5 * self.volatility * self.volatility) * expiry)
            / vol_sqrt_t
    }

    /// d₂ = d₁ − σ√T
    #[inline]
    fn d2(&self, strike: f64, expiry: f64) -> f64 {
        self.d1(strike, expiry) - self.volatility * expiry.sqrt()
    }

    /// European call price.
    pub fn price_call(&self, strike: f64, expiry: f64) -> f64 {
        let df = (-self.rate * expiry).exp();
        self.spot * norm_cdf(self.d1(strike, expiry)) - strike * df * norm_cdf(self.d2(strike, expiry))
    }
}

/// Black-Scholes-Merton call value.
///
/// # Errors
/// Invalid spot, strike, maturity or volatility.
///
/// # Examples
/// ```
/// use pricer_heston::analytical::bsm_call_value;
///
/// let value = bsm_call_value(10.0, 10.0, 1.0, 0.05, 0.2).unwrap();
/// assert!((value - 1.0450584).abs() < 1e-5);
/// ```
pub fn bsm_call_value(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
) -> Result<f64, AnalyticalError> {
    if !(strike > 0.0 && strike.is_finite()) {
        return Err(AnalyticalError::InvalidStrike { strike });
    }
    if !(maturity > 0.0 && maturity.is_finite()) {
        return Err(AnalyticalError::InvalidMaturity { maturity });
    }
    Ok(BlackScholes::new(spot, rate, volatility)?.price_call(strike, maturity))
}
