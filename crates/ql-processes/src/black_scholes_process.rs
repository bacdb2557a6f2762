//! Generalized Black-Scholes process
//! (translates `ql/processes/blackscholesprocess.hpp`).
//!
//! `dS/S = (r − q) dt + σ(t, S) dW`
//!
//! where `r` is the risk-free rate, `q` is the dividend yield (continuous),
//! and `σ` is either read off a Black-vol surface or a local-vol surface.
//!
//! Concrete variants:
//! * `GeneralizedBlackScholesProcess`: the most general form
//! * [`black_scholes_process`]: no dividends
//! * [`black_scholes_merton_process`]: continuous dividend yield

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{errors::Result, Real, Time, Versioned};
use ql_quotes::Quote;
use ql_termstructures::{
    BlackVolTermStructure, FlatForward, LocalConstantVol, LocalVolSurface,
    LocalVolTermStructure, YieldTermStructure,
};
use std::sync::Arc;

/// A generalized Black-Scholes stochastic process.
///
/// `dS = (r(t) − q(t)) · S · dt + σ(t, S) · S · dW`
///
/// As a [`StochasticProcess1D`] the state variable is `ln S`, which is the
/// coordinate the finite-difference meshers work in.
///
/// Corresponds to `QuantLib::GeneralizedBlackScholesProcess`.
#[derive(Debug, Clone)]
pub struct GeneralizedBlackScholesProcess {
    x0: Arc<dyn Quote>,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
    local_vol: Option<Arc<dyn LocalVolTermStructure>>,
}

impl GeneralizedBlackScholesProcess {
    /// Create a new process from a spot quote, the two curves and a Black
    /// volatility surface.
    pub fn new(
        x0: Arc<dyn Quote>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        black_vol: Arc<dyn BlackVolTermStructure>,
    ) -> Self {
        Self {
            x0,
            risk_free_rate,
            dividend_yield,
            black_vol,
            local_vol: None,
        }
    }

    /// Use `local_vol` instead of the surface derived from the Black vols.
    pub fn with_local_vol(mut self, local_vol: Arc<dyn LocalVolTermStructure>) -> Self {
        self.local_vol = Some(local_vol);
        self
    }

    /// The spot quote.
    pub fn state_variable(&self) -> &Arc<dyn Quote> {
        &self.x0
    }

    /// Current spot value.
    ///
    /// # Errors
    /// [`ql_core::Error::NullValue`] when the spot quote is not set.
    pub fn s0(&self) -> Result<Real> {
        self.x0.try_value()
    }

    /// Risk-free rate curve.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free_rate
    }

    /// Dividend yield curve.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend_yield
    }

    /// Black volatility surface.
    pub fn black_volatility(&self) -> &Arc<dyn BlackVolTermStructure> {
        &self.black_vol
    }

    /// Local volatility surface.
    ///
    /// An explicitly supplied surface wins. A flat Black surface maps to a
    /// flat local vol; anything else goes through Dupire's formula.
    pub fn local_volatility(&self) -> Arc<dyn LocalVolTermStructure> {
        if let Some(lv) = &self.local_vol {
            return Arc::clone(lv);
        }
        match self.black_vol.constant_vol() {
            Some(vol) => Arc::new(LocalConstantVol::new(vol)),
            None => Arc::new(LocalVolSurface::new(
                Arc::clone(&self.black_vol),
                Arc::clone(&self.risk_free_rate),
                Arc::clone(&self.dividend_yield),
                Arc::clone(&self.x0),
            )),
        }
    }

    /// `true` if a local volatility surface was attached explicitly.
    pub fn has_local_vol(&self) -> bool {
        self.local_vol.is_some()
    }

    /// Forward price `S·e^{-qT}/e^{-rT}` for maturity `t`.
    pub fn forward(&self, t: Time) -> Result<Real> {
        Ok(self.s0()? * self.dividend_yield.discount(t) / self.risk_free_rate.discount(t))
    }
}

impl Versioned for GeneralizedBlackScholesProcess {
    fn version(&self) -> u64 {
        self.x0.version()
            + self.risk_free_rate.version()
            + self.dividend_yield.version()
            + self.black_vol.version()
            + self.local_vol.as_ref().map_or(0, |lv| lv.version())
    }
}

impl StochasticProcess1D for GeneralizedBlackScholesProcess {
    fn x0(&self) -> Real {
        self.x0.value().map_or(Real::NAN, Real::ln)
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        let t1 = t + 0.0001;
        let sigma = self.diffusion(t, x);
        self.risk_free_rate.forward_rate(t, t1) - self.dividend_yield.forward_rate(t, t1)
            - 0.5 * sigma * sigma
    }

    fn diffusion(&self, t: Time, x: Real) -> Real {
        self.local_volatility().local_vol(t, x.exp())
    }

    fn expectation(&self, t0: Time, x0: Real, dt: Time) -> Real {
        let vol = self.black_vol.black_forward_vol(t0, t0 + dt, x0.exp());
        x0 + (self.risk_free_rate.forward_rate(t0, t0 + dt)
            - self.dividend_yield.forward_rate(t0, t0 + dt))
            * dt
            - 0.5 * vol * vol * dt
    }

    fn std_deviation(&self, t0: Time, x0: Real, dt: Time) -> Real {
        self.black_vol
            .black_forward_variance(t0, t0 + dt, x0.exp())
            .max(0.0)
            .sqrt()
    }
}

/// Black-Scholes process with zero dividend yield and flat inputs.
pub fn black_scholes_process(
    spot: Arc<dyn Quote>,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
) -> GeneralizedBlackScholesProcess {
    GeneralizedBlackScholesProcess::new(spot, Arc::new(FlatForward::new(0.0)), risk_free_rate, black_vol)
}

/// Black-Scholes-Merton process with a continuous dividend yield.
pub fn black_scholes_merton_process(
    spot: Arc<dyn Quote>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
) -> GeneralizedBlackScholesProcess {
    GeneralizedBlackScholesProcess::new(spot, dividend_yield, risk_free_rate, black_vol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_quotes::SimpleQuote;
    use ql_termstructures::{BlackConstantVol, BlackVarianceCurve};

    fn process(spot: Arc<SimpleQuote>) -> GeneralizedBlackScholesProcess {
        black_scholes_merton_process(
            spot,
            Arc::new(FlatForward::new(0.02)),
            Arc::new(FlatForward::new(0.05)),
            Arc::new(BlackConstantVol::new(0.2)),
        )
    }

    #[test]
    fn log_space_coefficients() {
        let p = process(Arc::new(SimpleQuote::new(100.0)));
        assert_abs_diff_eq!(StochasticProcess1D::x0(&p), 100.0_f64.ln(), epsilon = 1e-14);
        assert_abs_diff_eq!(p.drift(0.5, 4.6), 0.05 - 0.02 - 0.02, epsilon = 1e-10);
        assert_abs_diff_eq!(p.diffusion(0.5, 4.6), 0.2, epsilon = 1e-14);
        assert_abs_diff_eq!(p.std_deviation(0.0, 4.6, 0.25), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(p.forward(1.0).unwrap(), 100.0 * (0.03_f64).exp(), epsilon = 1e-10);
    }

    #[test]
    fn flat_black_vol_gives_flat_local_vol() {
        let p = process(Arc::new(SimpleQuote::new(100.0)));
        let lv = p.local_volatility();
        assert_abs_diff_eq!(lv.local_vol(0.3, 80.0), 0.2, epsilon = 1e-14);
        assert!(!p.has_local_vol());
    }

    #[test]
    fn explicit_local_vol_wins() {
        let p = process(Arc::new(SimpleQuote::new(100.0)))
            .with_local_vol(Arc::new(LocalConstantVol::new(0.35)));
        assert_abs_diff_eq!(p.local_volatility().local_vol(1.0, 50.0), 0.35, epsilon = 1e-15);
    }

    #[test]
    fn term_vol_goes_through_dupire() {
        let curve = BlackVarianceCurve::new(&[0.5, 1.0, 2.0], &[0.2, 0.2, 0.2]).unwrap();
        let p = black_scholes_process(
            Arc::new(SimpleQuote::new(100.0)),
            Arc::new(FlatForward::new(0.03)),
            Arc::new(curve),
        );
        assert_abs_diff_eq!(p.local_volatility().local_vol(1.0, 100.0), 0.2, epsilon = 1e-3);
    }

    #[test]
    fn version_follows_spot() {
        let spot = Arc::new(SimpleQuote::new(100.0));
        let p = process(Arc::clone(&spot));
        let v0 = p.version();
        spot.set_value(101.0);
        assert!(p.version() > v0);
        assert_eq!(p.s0().unwrap(), 101.0);
    }

    #[test]
    fn unset_spot_is_an_error() {
        let p = process(Arc::new(SimpleQuote::empty()));
        assert!(p.s0().is_err());
    }
}
