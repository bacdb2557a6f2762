use super::{
    direction_error, FdmLinearOpComposite, FirstDerivativeOp, NinePointLinearOp, SecondDerivativeOp,
    SecondOrderMixedDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use ql_processes::HestonProcess;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Heston generator on the `(ln S, v)` grid, axes 0 and 1:
///
/// `L = (r − q − ½v) ∂x + ½v ∂xx + κ(θ − v) ∂v + ½σ²v ∂vv + ρσv ∂x∂v − r`
///
/// The discount term is shared half and half between the two axes. On the
/// first and last spot rows `∂xx` vanishes and with it the `−½v` drift.
///
/// Corresponds to `QuantLib::FdmHestonOp`.
#[derive(Debug, Clone)]
pub struct FdmHestonOp {
    r_ts: Arc<dyn YieldTermStructure>,
    q_ts: Arc<dyn YieldTermStructure>,
    dividend_spread: Real,
    half_variance: Array,
    dx_map: TripleBandLinearOp,
    dxx_map: TripleBandLinearOp,
    dy_map: TripleBandLinearOp,
    equity_t: TripleBandLinearOp,
    variance_t: TripleBandLinearOp,
    correlation: NinePointLinearOp,
}

impl FdmHestonOp {
    /// Generator of `process` on a two-axis mesher.
    pub fn new(mesher: Arc<dyn FdmMesher>, process: &HestonProcess) -> Result<Self> {
        Self::with_dividend_spread(mesher, process, 0.0)
    }

    /// Generator whose dividend yield is shifted by `spread`.
    pub fn with_dividend_spread(
        mesher: Arc<dyn FdmMesher>,
        process: &HestonProcess,
        spread: Real,
    ) -> Result<Self> {
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

        let (kappa, theta, sigma, rho) = (process.kappa(), process.theta(), process.sigma(), process.rho());
        let dy_map = SecondDerivativeOp::new(1, Arc::clone(&mesher))?
            .mult(&(&v * (0.5 * sigma * sigma)))?
            .add_triple(&FirstDerivativeOp::new(1, Arc::clone(&mesher))?.mult(&v.map(|v| kappa * (theta - v)))?)?;

        Ok(Self {
            r_ts: Arc::clone(process.risk_free_rate()),
            q_ts: Arc::clone(process.dividend_yield()),
            dividend_spread: spread,
            half_variance,
            dx_map: FirstDerivativeOp::new(0, Arc::clone(&mesher))?.into_inner(),
            dxx_map: SecondDerivativeOp::new(0, Arc::clone(&mesher))?.mult(&(&v * 0.5))?,
            dy_map,
            equity_t: TripleBandLinearOp::new(0, Arc::clone(&mesher))?,
            variance_t: TripleBandLinearOp::new(1, Arc::clone(&mesher))?,
            correlation: SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(&mesher))?
                .mult(&(&v * (rho * sigma))),
        })
    }
}

impl FdmLinearOpComposite for FdmHestonOp {
    fn size(&self) -> usize {
        2
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let r = self.r_ts.forward_rate(t1, t2);
        let q = self.q_ts.forward_rate(t1, t2) + self.dividend_spread;
        let drift = self.half_variance.map(|hv| r - q - hv);
        let discount = Array::from_element(1, -0.5 * r);
        self.equity_t
            .axpyb(Some(&drift), &self.dx_map, &self.dxx_map, Some(&discount))?;
        self.variance_t
            .axpyb(None, &self.dy_map, &self.dy_map, Some(&discount))
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        Ok(self.equity_t.apply(r)? + self.variance_t.apply(r)? + self.correlation.apply(r)?)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        self.correlation.apply(r)
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array> {
        match direction {
            0 => self.equity_t.apply(r),
            1 => self.variance_t.apply(r),
            _ => Err(direction_error(2, direction)),
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array> {
        match direction {
            0 => self.equity_t.solve_splitting(r, -a, 1.0),
            1 => self.variance_t.solve_splitting(r, -a, 1.0),
            _ => Err(direction_error(2, direction)),
        }
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        self.solve_splitting(1, &self.solve_splitting(0, r, a)?, a)
    }
}
