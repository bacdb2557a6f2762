use super::{
    direction_error, FdmHullWhiteOp, FdmLinearOpComposite, FirstDerivativeOp, NinePointLinearOp,
    SecondDerivativeOp, SecondOrderMixedDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::Array;
use ql_processes::{HestonProcess, HullWhiteProcess};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Heston equity with a Hull-White short rate on the `(ln S, v, x)` grid,
/// where the short rate is `x + α(t)`:
///
/// `L = (x + φ − q − ½v) ∂x + ½v ∂xx + κ(θ − v) ∂v + ½σ²v ∂vv
///      + L_HW + ρσv ∂x∂v + ρ_xr σ_r √v ∂x∂r`
///
/// Discounting lives entirely in the Hull-White part `L_HW`.
///
/// Corresponds to `QuantLib::FdmHestonHullWhiteOp`.
#[derive(Debug, Clone)]
pub struct FdmHestonHullWhiteOp {
    q_ts: Arc<dyn YieldTermStructure>,
    hw_process: Arc<HullWhiteProcess>,
    x: Array,
    half_variance: Array,
    dx_map: TripleBandLinearOp,
    dxx_map: TripleBandLinearOp,
    map_x: TripleBandLinearOp,
    map_y: TripleBandLinearOp,
    hull_white_op: FdmHullWhiteOp,
    heston_corr: NinePointLinearOp,
    equity_ir_corr: NinePointLinearOp,
}

impl FdmHestonHullWhiteOp {
    /// Generator on a three-axis mesher.
    ///
    /// # Errors
    /// A precondition error when `ρ² + ρ_xr² > 1`.
    pub fn new(
        mesher: Arc<dyn FdmMesher>,
        heston: &HestonProcess,
        hw_process: Arc<HullWhiteProcess>,
        equity_short_rate_correlation: Real,
    ) -> Result<Self> {
        let rho_xr = equity_short_rate_correlation;
        ensure!(
            rho_xr * rho_xr + heston.rho() * heston.rho() <= 1.0,
            "correlation matrix has negative eigenvalues"
        );
        let v = mesher.locations(1);
        let layout = Arc::clone(mesher.layout());
        let last = layout.dim()[0] - 1;
        let mut half_variance = &v * 0.5;
        for iter in layout.iter() {
            let c = iter.coordinates()[0];
            if c == 0 || c == last {
                half_variance[iter.index()] = 0.0;
            }
        }

        let (kappa, theta, sigma) = (heston.kappa(), heston.theta(), heston.sigma());
        let map_y = SecondDerivativeOp::new(1, Arc::clone(&mesher))?
            .mult(&(&v * (0.5 * sigma * sigma)))?
            .add_triple(&FirstDerivativeOp::new(1, Arc::clone(&mesher))?.mult(&v.map(|v| kappa * (theta - v)))?)?;
        let heston_corr = SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(&mesher))?
            .mult(&(&v * (heston.rho() * sigma)));
        let equity_ir_corr = SecondOrderMixedDerivativeOp::new(0, 2, Arc::clone(&mesher))?
            .mult(&v.map(|v| v.max(0.0).sqrt() * hw_process.sigma() * rho_xr));

        Ok(Self {
            q_ts: Arc::clone(heston.dividend_yield()),
            x: mesher.locations(2),
            half_variance,
            dx_map: FirstDerivativeOp::new(0, Arc::clone(&mesher))?.into_inner(),
            dxx_map: SecondDerivativeOp::new(0, Arc::clone(&mesher))?.mult(&(&v * 0.5))?,
            map_x: TripleBandLinearOp::new(0, Arc::clone(&mesher))?,
            map_y,
            hull_white_op: FdmHullWhiteOp::new(Arc::clone(&mesher), Arc::clone(&hw_process), 2)?,
            hw_process,
            heston_corr,
            equity_ir_corr,
        })
    }
}

impl FdmLinearOpComposite for FdmHestonHullWhiteOp {
    fn size(&self) -> usize {
        3
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let q = self.q_ts.forward_rate(t1, t2);
        let phi = 0.5 * (self.hw_process.alpha(t1) + self.hw_process.alpha(t2));
        let drift = self.x.zip_map(&self.half_variance, |x, hv| x + phi - q - hv);
        self.map_x.axpyb(Some(&drift), &self.dx_map, &self.dxx_map, None)?;
        self.hull_white_op.set_time(t1, t2)
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        Ok(self.map_x.apply(r)?
            + self.map_y.apply(r)?
            + self.hull_white_op.apply(r)?
            + self.apply_mixed(r)?)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        Ok(self.heston_corr.apply(r)? + self.equity_ir_corr.apply(r)?)
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array> {
        match direction {
            0 => self.map_x.apply(r),
            1 => self.map_y.apply(r),
            2 => self.hull_white_op.apply(r),
            _ => Err(direction_error(3, direction)),
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array> {
        match direction {
            0 => self.map_x.solve_splitting(r, -a, 1.0),
            1 => self.map_y.solve_splitting(r, -a, 1.0),
            2 => self.hull_white_op.solve_splitting(2, r, a),
            _ => Err(direction_error(3, direction)),
        }
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        self.solve_splitting(0, r, a)
    }
}

#[cfg(test)]
mod tests {
    use super::super::checks::{assert_additive, assert_splitting_round_trip};
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite, Uniform1dMesher};
    use crate::finite_differences::test_support::heston_process;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use ql_termstructures::FlatForward;

    fn mesher() -> Arc<dyn FdmMesher> {
        let x: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(3.6, 5.6, 9).unwrap());
        let v: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 0.4, 5).unwrap());
        let r: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(-0.06, 0.06, 7).unwrap());
        Arc::new(FdmMesherComposite::new(vec![x, v, r]).unwrap())
    }

    fn hw() -> Arc<HullWhiteProcess> {
        Arc::new(HullWhiteProcess::new(Arc::new(FlatForward::new(0.05)), 0.07, 0.01).unwrap())
    }

    fn op() -> FdmHestonHullWhiteOp {
        let heston = heston_process(100.0, 0.04, 1.5, 0.04, 0.3, -0.6);
        let mut op = FdmHestonHullWhiteOp::new(mesher(), &heston, hw(), 0.3).unwrap();
        op.set_time(0.25, 0.5).unwrap();
        op
    }

    #[test]
    fn rejects_inconsistent_correlations() {
        let heston = heston_process(100.0, 0.04, 1.5, 0.04, 0.3, -0.9);
        assert!(FdmHestonHullWhiteOp::new(mesher(), &heston, hw(), 0.5).is_err());
    }

    #[test]
    fn constant_is_discounted_at_the_short_rate() {
        let op = op();
        let lu = op.apply(&Array::from_element(9 * 5 * 7, 1.0)).unwrap();
        let hw = hw();
        let phi = 0.5 * (hw.alpha(0.25) + hw.alpha(0.5));
        for k in 0..7 {
            let x = -0.06 + 0.02 * k as f64;
            for i in 0..45 {
                assert_abs_diff_eq!(lu[k * 45 + i], -(x + phi), epsilon = 1e-12);
            }
        }
    }

    proptest! {
        #[test]
        fn additive_and_invertible(seed in prop::collection::vec(-1.0f64..1.0, 9 * 5 * 7), a in 0.001f64..0.05) {
            let op = op();
            let u = Array::from_vec(seed);
            assert_additive(&op, &u, 1e-12);
            assert_splitting_round_trip(&op, &u, a, 1e-8);
        }
    }
}
