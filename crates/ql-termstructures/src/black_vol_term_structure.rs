//! `BlackVolTermStructure`: Black-volatility term structures
//! (translates `ql/termstructures/volatility/equityfx/blackvoltermstructure.hpp`).
//!
//! Provides the `BlackVolTermStructure` trait and concrete implementations:
//! * `BlackConstantVol`: a flat Black volatility surface.
//! * `BlackVarianceCurve`: strike-independent variance interpolated in time.

use crate::term_structure::TermStructure;
use ql_core::{errors::Result, Real, Time, Versioned, Volatility};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};
use ql_quotes::Quote;
use std::sync::Arc;

/// A Black-volatility term structure.
///
/// Implementors must provide **exactly one** of:
/// * [`black_vol_impl`](BlackVolTermStructure::black_vol_impl): σ(t, k)
/// * [`black_variance_impl`](BlackVolTermStructure::black_variance_impl): σ²·t
///
/// The other is derived automatically.
///
/// Corresponds to `QuantLib::BlackVolTermStructure`.
pub trait BlackVolTermStructure: TermStructure {
    /// Return the Black volatility for time `t` and strike `strike`.
    fn black_vol_impl(&self, t: Time, strike: Real) -> Volatility {
        if t <= 0.0 {
            return self.black_vol_impl(1.0e-5, strike);
        }
        (self.black_variance_impl(t, strike) / t).sqrt()
    }

    /// Return the Black variance `σ²·t` for time `t` and strike `strike`.
    fn black_variance_impl(&self, t: Time, strike: Real) -> Real {
        let vol = self.black_vol_impl(t, strike);
        vol * vol * t
    }

    /// Black volatility for a time and strike.
    fn black_vol(&self, t: Time, strike: Real) -> Volatility {
        self.black_vol_impl(t, strike)
    }

    /// Black variance for a time and strike.
    fn black_variance(&self, t: Time, strike: Real) -> Real {
        self.black_variance_impl(t, strike)
    }

    /// Forward variance `σ²(t₂)t₂ - σ²(t₁)t₁` between `t1` and `t2`.
    fn black_forward_variance(&self, t1: Time, t2: Time, strike: Real) -> Real {
        if t2 <= t1 {
            return 0.0;
        }
        self.black_variance_impl(t2, strike) - self.black_variance_impl(t1, strike)
    }

    /// Forward volatility between `t1` and `t2`.
    fn black_forward_vol(&self, t1: Time, t2: Time, strike: Real) -> Volatility {
        if t2 <= t1 {
            return self.black_vol_impl(t1, strike);
        }
        (self.black_forward_variance(t1, t2, strike) / (t2 - t1)).max(0.0).sqrt()
    }

    /// Lowest strike for which the surface is defined.
    fn min_strike(&self) -> Real {
        Real::NEG_INFINITY
    }

    /// Highest strike for which the surface is defined.
    fn max_strike(&self) -> Real {
        Real::INFINITY
    }

    /// The volatility if the surface is flat in time and strike.
    fn constant_vol(&self) -> Option<Volatility> {
        None
    }
}

// ── BlackConstantVol ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum FlatVol {
    Fixed(Volatility),
    Quoted(Arc<dyn Quote>),
}

/// A flat (constant) Black volatility surface.
///
/// `σ(t, K) = constant` for all `t > 0` and all strikes `K`.
///
/// Corresponds to `QuantLib::BlackConstantVol`.
#[derive(Debug, Clone)]
pub struct BlackConstantVol {
    volatility: FlatVol,
}

impl BlackConstantVol {
    /// Create a constant Black vol surface.
    pub fn new(volatility: Volatility) -> Self {
        Self {
            volatility: FlatVol::Fixed(volatility),
        }
    }

    /// Create a surface following the volatility quote `vol`.
    pub fn with_quote(vol: Arc<dyn Quote>) -> Self {
        Self {
            volatility: FlatVol::Quoted(vol),
        }
    }

    /// The constant volatility value.
    pub fn volatility(&self) -> Volatility {
        match &self.volatility {
            FlatVol::Fixed(v) => *v,
            FlatVol::Quoted(q) => q.value().unwrap_or(Real::NAN),
        }
    }
}

impl Versioned for BlackConstantVol {
    fn version(&self) -> u64 {
        match &self.volatility {
            FlatVol::Fixed(_) => 0,
            FlatVol::Quoted(q) => q.version(),
        }
    }
}

impl TermStructure for BlackConstantVol {}

impl BlackVolTermStructure for BlackConstantVol {
    fn black_vol_impl(&self, _t: Time, _strike: Real) -> Volatility {
        self.volatility()
    }

    fn black_variance_impl(&self, t: Time, _strike: Real) -> Real {
        let v = self.volatility();
        v * v * t
    }

    fn constant_vol(&self) -> Option<Volatility> {
        Some(self.volatility())
    }
}

// ── BlackVarianceCurve ────────────────────────────────────────────────────────

/// Strike-independent Black variance, linearly interpolated in total
/// variance between pillar times and extrapolated with the last volatility.
///
/// Corresponds to `QuantLib::BlackVarianceCurve`.
#[derive(Debug, Clone)]
pub struct BlackVarianceCurve {
    times: Vec<Time>,
    variances: LinearInterpolation,
    last_vol: Volatility,
}

impl BlackVarianceCurve {
    /// Build from pillar times (all positive) and Black volatilities.
    ///
    /// # Errors
    /// Non-increasing times, non-positive first time, or decreasing total
    /// variance.
    pub fn new(times: &[Time], vols: &[Volatility]) -> Result<Self> {
        ql_core::ensure!(!times.is_empty(), "at least one pillar required");
        ql_core::ensure!(times.len() == vols.len(), "times and vols must have the same length");
        ql_core::ensure!(times[0] > 0.0, "first pillar time must be positive");
        let mut ts = vec![0.0];
        let mut vs = vec![0.0];
        for (t, v) in times.iter().zip(vols) {
            let var = v * v * t;
            ql_core::ensure!(
                var >= vs[vs.len() - 1],
                "total variance must be non-decreasing (at t = {t})"
            );
            ts.push(*t);
            vs.push(var);
        }
        Ok(Self {
            times: ts.clone(),
            variances: LinearInterpolation::new(&ts, &vs)?,
            last_vol: vols[vols.len() - 1],
        })
    }
}

impl Versioned for BlackVarianceCurve {}

impl TermStructure for BlackVarianceCurve {}

impl BlackVolTermStructure for BlackVarianceCurve {
    fn black_variance_impl(&self, t: Time, _strike: Real) -> Real {
        let last = self.times[self.times.len() - 1];
        if t <= last {
            self.variances.operator(t.max(0.0))
        } else {
            self.variances.operator(last) + self.last_vol * self.last_vol * (t - last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_vol_forward_variance() {
        let v = BlackConstantVol::new(0.2);
        assert_abs_diff_eq!(v.black_variance(2.0, 100.0), 0.08, epsilon = 1e-15);
        assert_abs_diff_eq!(v.black_forward_variance(0.5, 1.5, 90.0), 0.04, epsilon = 1e-15);
        assert_abs_diff_eq!(v.black_forward_vol(0.5, 1.5, 90.0), 0.2, epsilon = 1e-15);
    }

    #[test]
    fn variance_curve_interpolates_total_variance() {
        let curve = BlackVarianceCurve::new(&[1.0, 2.0], &[0.2, 0.25]).unwrap();
        // total variance 0.04 at 1y and 0.125 at 2y
        assert_abs_diff_eq!(curve.black_variance(1.5, 0.0), 0.0825, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.black_vol(1.0, 0.0), 0.2, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.black_forward_variance(1.0, 2.0, 0.0), 0.085, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.black_variance(3.0, 0.0), 0.125 + 0.0625, epsilon = 1e-15);
    }

    #[test]
    fn variance_curve_rejects_calendar_arbitrage() {
        assert!(BlackVarianceCurve::new(&[1.0, 2.0], &[0.3, 0.2]).is_err());
    }
}
