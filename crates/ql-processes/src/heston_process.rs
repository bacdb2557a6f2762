//! Heston stochastic volatility process
//! (translates `ql/processes/hestonprocess.hpp`).
//!
//! The Heston model describes two coupled SDEs:
//!
//! ```text
//! dS = (r − q) S dt + √v S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁ dW₂ = ρ dt
//! ```
//!
//! Only the coefficients are exposed; the finite-difference operators read
//! them directly.

use ql_core::{ensure, errors::Result, Real, Versioned};
use ql_quotes::Quote;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// The Heston stochastic volatility process.
///
/// * `v0`   : initial variance
/// * `kappa`: mean-reversion speed of variance
/// * `theta`: long-run variance level
/// * `sigma`: vol-of-vol
/// * `rho`  : correlation between the two Brownian motions
///
/// Corresponds to `QuantLib::HestonProcess`.
#[derive(Debug, Clone)]
pub struct HestonProcess {
    s0: Arc<dyn Quote>,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
}

impl HestonProcess {
    /// Create a new Heston process.
    ///
    /// # Errors
    /// Negative variance parameters or a correlation outside `[-1, 1]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        s0: Arc<dyn Quote>,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        ensure!(
            (-1.0..=1.0).contains(&rho),
            "correlation ρ must be in [-1, 1], got {rho}"
        );
        ensure!(v0 >= 0.0, "initial variance must be non-negative, got {v0}");
        ensure!(kappa >= 0.0, "mean reversion speed must be non-negative, got {kappa}");
        ensure!(theta >= 0.0, "long-run variance must be non-negative, got {theta}");
        ensure!(sigma >= 0.0, "vol-of-vol must be non-negative, got {sigma}");

        Ok(Self {
            s0,
            v0,
            kappa,
            theta,
            sigma,
            rho,
            risk_free_rate,
            dividend_yield,
        })
    }

    /// Spot quote.
    pub fn s0(&self) -> &Arc<dyn Quote> {
        &self.s0
    }

    /// Current spot value.
    pub fn spot(&self) -> Result<Real> {
        self.s0.try_value()
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// Mean-reversion speed.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Vol-of-vol.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Correlation.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// Risk-free rate.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free_rate
    }

    /// Dividend yield.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend_yield
    }

    /// `2κθ ≥ σ²`: the variance stays strictly positive.
    pub fn feller_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.sigma * self.sigma
    }
}

impl Versioned for HestonProcess {
    fn version(&self) -> u64 {
        self.s0.version() + self.risk_free_rate.version() + self.dividend_yield.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_quotes::SimpleQuote;
    use ql_termstructures::FlatForward;

    fn make_heston(rho: Real) -> Result<HestonProcess> {
        HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.02)),
            Arc::new(SimpleQuote::new(100.0)),
            0.04,
            1.5,
            0.04,
            0.3,
            rho,
        )
    }

    #[test]
    fn heston_accessors() {
        let h = make_heston(-0.7).unwrap();
        assert_eq!(h.spot().unwrap(), 100.0);
        assert_eq!(h.v0(), 0.04);
        assert_eq!(h.kappa(), 1.5);
        assert_eq!(h.rho(), -0.7);
        assert!(h.feller_satisfied());
    }

    #[test]
    fn heston_rejects_bad_correlation() {
        assert!(make_heston(1.2).is_err());
    }

    #[test]
    fn heston_version_follows_spot() {
        let spot = Arc::new(SimpleQuote::new(100.0));
        let h = HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            spot.clone(),
            0.04,
            1.0,
            0.04,
            0.2,
            0.0,
        )
        .unwrap();
        let v = h.version();
        spot.set_value(99.0);
        assert_eq!(h.version(), v + 1);
    }
}
