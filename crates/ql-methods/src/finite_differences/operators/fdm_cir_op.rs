use super::{
    direction_error, FdmLinearOpComposite, FirstDerivativeOp, NinePointLinearOp, SecondDerivativeOp,
    SecondOrderMixedDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::Array;
use ql_processes::{GeneralizedBlackScholesProcess, SquareRootProcess};
use ql_termstructures::{BlackVolTermStructure, YieldTermStructure};
use std::sync::Arc;

/// Equity under a CIR short rate on the `(ln S, r)` grid:
///
/// `L = (r − q − ½σ²) ∂x + ½σ² ∂xx + κ(θ − r) ∂r + ½σ_r² r ∂rr
///      + ρ σ σ_r √r ∂x∂r − r`
///
/// The equity volatility `σ` is the Black forward volatility at `strike`.
///
/// Corresponds to `QuantLib::FdmCIROp`.
#[derive(Debug, Clone)]
pub struct FdmCirOp {
    q_ts: Arc<dyn YieldTermStructure>,
    vol_ts: Arc<dyn BlackVolTermStructure>,
    strike: Real,
    rates: Array,
    dx_map: TripleBandLinearOp,
    dxx_map: TripleBandLinearOp,
    rate_t: TripleBandLinearOp,
    equity_t: TripleBandLinearOp,
    correlation_unit: NinePointLinearOp,
    correlation: NinePointLinearOp,
}

impl FdmCirOp {
    /// Generator on a two-axis mesher whose second axis is the short rate.
    pub fn new(
        mesher: Arc<dyn FdmMesher>,
        cir: &SquareRootProcess,
        bs: &GeneralizedBlackScholesProcess,
        rho: Real,
        strike: Real,
    ) -> Result<Self> {
        ensure!((-1.0..=1.0).contains(&rho), "correlation must lie in [-1, 1], got {rho}");
        let rates = mesher.locations(1);
        let (kappa, theta, sigma_r) = (cir.speed(), cir.mean(), cir.volatility());

        let rate_t = SecondDerivativeOp::new(1, Arc::clone(&mesher))?
            .mult(&(&rates * (0.5 * sigma_r * sigma_r)))?
            .add_triple(&FirstDerivativeOp::new(1, Arc::clone(&mesher))?.mult(&rates.map(|r| kappa * (theta - r)))?)?
            .add(&(&rates * -0.5))?;

        let correlation_unit = SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(&mesher))?
            .mult(&rates.map(|r| rho * sigma_r * r.max(0.0).sqrt()));

        Ok(Self {
            q_ts: Arc::clone(bs.dividend_yield()),
            vol_ts: Arc::clone(bs.black_volatility()),
            strike,
            dx_map: FirstDerivativeOp::new(0, Arc::clone(&mesher))?.into_inner(),
            dxx_map: SecondDerivativeOp::new(0, Arc::clone(&mesher))?.into_inner(),
            equity_t: TripleBandLinearOp::new(0, Arc::clone(&mesher))?,
            correlation: correlation_unit.clone(),
            correlation_unit,
            rate_t,
            rates,
        })
    }
}

impl FdmLinearOpComposite for FdmCirOp {
    fn size(&self) -> usize {
        2
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let q = self.q_ts.forward_rate(t1, t2);
        let variance = if t2 > t1 {
            self.vol_ts.black_forward_variance(t1, t2, self.strike) / (t2 - t1)
        } else {
            let s = self.vol_ts.black_vol(t1, self.strike);
            s * s
        };
        let n = self.rates.size();
        let drift = self.rates.map(|r| r - q - 0.5 * variance);
        let discount = &self.rates * -0.5;
        let diffusion = self.dxx_map.mult(&Array::from_element(n, 0.5 * variance))?;
        self.equity_t
            .axpyb(Some(&drift), &self.dx_map, &diffusion, Some(&discount))?;
        self.correlation = self
            .correlation_unit
            .mult(&Array::from_element(n, variance.sqrt()));
        Ok(())
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        Ok(self.equity_t.apply(r)? + self.rate_t.apply(r)? + self.correlation.apply(r)?)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        self.correlation.apply(r)
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array> {
        match direction {
            0 => self.equity_t.apply(r),
            1 => self.rate_t.apply(r),
            _ => Err(direction_error(2, direction)),
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array> {
        match direction {
            0 => self.equity_t.solve_splitting(r, -a, 1.0),
            1 => self.rate_t.solve_splitting(r, -a, 1.0),
            _ => Err(direction_error(2, direction)),
        }
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        self.solve_splitting(1, &self.solve_splitting(0, r, a)?, a)
    }
}

#[cfg(test)]
mod tests {
    use super::super::checks::{assert_additive, assert_splitting_round_trip};
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite, Uniform1dMesher};
    use crate::finite_differences::test_support::bsm_process;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn op() -> FdmCirOp {
        let x: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(3.6, 5.6, 17).unwrap());
        let r: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 0.2, 11).unwrap());
        let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::new(vec![x, r]).unwrap());
        let cir = SquareRootProcess::new(0.8, 0.05, 0.1, 0.04).unwrap();
        let mut op = FdmCirOp::new(mesher, &cir, &bsm_process(100.0, 0.01, 0.04, 0.25), 0.3, 100.0).unwrap();
        op.set_time(0.5, 0.6).unwrap();
        op
    }

    #[test]
    fn constant_is_discounted_at_the_local_rate() {
        let op = op();
        let lu = op.apply(&Array::from_element(17 * 11, 1.0)).unwrap();
        for j in 0..11 {
            let rate = 0.02 * j as f64;
            for i in 0..17 {
                assert_abs_diff_eq!(lu[j * 17 + i], -rate, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn correlation_must_be_valid() {
        let x: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(3.6, 5.6, 5).unwrap());
        let r: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 0.2, 5).unwrap());
        let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::new(vec![x, r]).unwrap());
        let cir = SquareRootProcess::new(0.8, 0.05, 0.1, 0.04).unwrap();
        assert!(FdmCirOp::new(mesher, &cir, &bsm_process(100.0, 0.0, 0.04, 0.25), 1.5, 100.0).is_err());
    }

    proptest! {
        #[test]
        fn additive_and_invertible(seed in prop::collection::vec(-1.0f64..1.0, 17 * 11), a in 0.001f64..0.05) {
            let op = op();
            let u = Array::from_vec(seed);
            assert_additive(&op, &u, 1e-12);
            assert_splitting_round_trip(&op, &u, a, 1e-8);
        }
    }
}
