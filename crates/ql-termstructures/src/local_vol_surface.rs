//! `LocalVolSurface`: Dupire local volatility surface.
//!
//! Computes local volatilities from an implied (Black) volatility surface
//! using Dupire's formula.
//!
//! Corresponds to `QuantLib::LocalVolSurface`.

use crate::black_vol_term_structure::BlackVolTermStructure;
use crate::local_vol_term_structure::LocalVolTermStructure;
use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{Real, Time, Versioned, Volatility};
use ql_quotes::Quote;
use std::sync::Arc;

/// A local volatility surface derived from a Black volatility surface via
/// Dupire's formula.
///
/// Given a Black volatility surface `σ_B(T, K)`, the local variance is:
///
/// $$\sigma^2_\text{loc}(T, K) = \frac{\frac{\partial w}{\partial T}}
///     {1 - \frac{y}{w}\frac{\partial w}{\partial y}
///       + \frac14\left(-\frac14 - \frac{1}{w} + \frac{y^2}{w^2}\right)
///              \left(\frac{\partial w}{\partial y}\right)^2
///       + \frac12 \frac{\partial^2 w}{\partial y^2}}$$
///
/// where `w = σ²·T` is the total implied variance and `y = ln(K/F)` is
/// the log-moneyness, with `K` the underlying level being queried.
#[derive(Debug, Clone)]
pub struct LocalVolSurface {
    black_vol: Arc<dyn BlackVolTermStructure>,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    underlying: Arc<dyn Quote>,
}

impl LocalVolSurface {
    /// Create a new LocalVolSurface from a Black vol surface.
    pub fn new(
        black_vol: Arc<dyn BlackVolTermStructure>,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        underlying: Arc<dyn Quote>,
    ) -> Self {
        Self {
            black_vol,
            risk_free_rate,
            dividend_yield,
            underlying,
        }
    }
}

impl Versioned for LocalVolSurface {
    fn version(&self) -> u64 {
        self.black_vol.version()
            + self.risk_free_rate.version()
            + self.dividend_yield.version()
            + self.underlying.version()
    }
}

impl TermStructure for LocalVolSurface {
    fn max_time(&self) -> Time {
        self.black_vol.max_time()
    }
}

impl LocalVolTermStructure for LocalVolSurface {
    fn local_vol(&self, t: Time, underlying: Real) -> Volatility {
        let spot = self.underlying.value().unwrap_or(Real::NAN);
        dupire_local_vol(
            t,
            underlying,
            &*self.black_vol,
            &*self.risk_free_rate,
            &*self.dividend_yield,
            spot,
        )
    }
}

/// Dupire's formula with finite differences on the total variance.
fn dupire_local_vol(
    t: Time,
    strike: Real,
    black_vol: &dyn BlackVolTermStructure,
    risk_free_rate: &dyn YieldTermStructure,
    dividend_yield: &dyn YieldTermStructure,
    spot: Real,
) -> Volatility {
    let eps_t = 1e-4_f64;
    let t = t.max(eps_t);

    let forward = spot * dividend_yield.discount(t) / risk_free_rate.discount(t);
    let k = strike.max(1e-8);

    let w_fn = |tt: Time, kk: Real| -> Real { black_vol.black_variance(tt.max(0.0), kk) };

    let w = w_fn(t, k);
    if w <= 0.0 {
        return 0.0;
    }

    let dwdt = {
        let t_minus = (t - eps_t).max(0.0);
        (w_fn(t + eps_t, k) - w_fn(t_minus, k)) / (t + eps_t - t_minus)
    }
    .max(0.0);

    let y = (k / forward).ln();
    let dy: Real = 1.0e-4;
    let w_up = w_fn(t, k * dy.exp());
    let w_down = w_fn(t, k * (-dy).exp());
    let dwdy = (w_up - w_down) / (2.0 * dy);
    let d2wdy2 = (w_up - 2.0 * w + w_down) / (dy * dy);

    let denominator = 1.0 - y / w * dwdy
        + 0.25 * (-0.25 - 1.0 / w + y * y / (w * w)) * dwdy * dwdy
        + 0.5 * d2wdy2;

    if denominator <= 1e-15 {
        return black_vol.black_vol(t, k);
    }
    (dwdt / denominator).max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black_vol_term_structure::{BlackConstantVol, BlackVarianceCurve};
    use crate::flat_forward::FlatForward;
    use approx::assert_abs_diff_eq;
    use ql_quotes::SimpleQuote;

    fn surface(black_vol: Arc<dyn BlackVolTermStructure>) -> LocalVolSurface {
        LocalVolSurface::new(
            black_vol,
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.02)),
            Arc::new(SimpleQuote::new(100.0)),
        )
    }

    #[test]
    fn constant_black_vol_gives_constant_local_vol() {
        let s = surface(Arc::new(BlackConstantVol::new(0.2)));
        assert_abs_diff_eq!(s.local_vol(1.0, 100.0), 0.20, epsilon = 1e-6);
        assert_abs_diff_eq!(s.local_vol(2.0, 80.0), 0.20, epsilon = 1e-6);
        assert_abs_diff_eq!(s.local_vol(0.5, 120.0), 0.20, epsilon = 1e-6);
    }

    #[test]
    fn term_structure_of_vol_gives_forward_vol() {
        let s = surface(Arc::new(BlackVarianceCurve::new(&[1.0, 2.0], &[0.2, 0.25]).unwrap()));
        // forward variance rate between 1y and 2y is 0.085
        assert_abs_diff_eq!(s.local_vol(1.5, 100.0), 0.085_f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn version_tracks_spot() {
        let spot = Arc::new(SimpleQuote::new(100.0));
        let s = LocalVolSurface::new(
            Arc::new(BlackConstantVol::new(0.2)),
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.02)),
            spot.clone(),
        );
        let v0 = s.version();
        spot.set_value(101.0);
        assert_eq!(s.version(), v0 + 1);
    }
}
