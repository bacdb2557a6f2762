use super::{direction_error, FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use ql_processes::{ExtendedOrnsteinUhlenbeckProcess, StochasticProcess1D};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// `L = a(b(t) − x) ∂x + ½σ² ∂xx − r` along one axis.
///
/// The drift is taken from the process at the middle of the time step.
///
/// Corresponds to `QuantLib::FdmExtendedOrnsteinUhlenbeckOp`.
#[derive(Debug, Clone)]
pub struct FdmExtendedOrnsteinUhlenbeckOp {
    mesher: Arc<dyn FdmMesher>,
    process: Arc<ExtendedOrnsteinUhlenbeckProcess>,
    r_ts: Arc<dyn YieldTermStructure>,
    direction: usize,
    x: Array,
    dx_map: TripleBandLinearOp,
    dxx_map: TripleBandLinearOp,
    map_x: TripleBandLinearOp,
}

impl FdmExtendedOrnsteinUhlenbeckOp {
    /// Generator of `process` along `direction`, discounted on `r_ts`.
    pub fn new(
        mesher: Arc<dyn FdmMesher>,
        process: Arc<ExtendedOrnsteinUhlenbeckProcess>,
        r_ts: Arc<dyn YieldTermStructure>,
        direction: usize,
    ) -> Result<Self> {
        let n = mesher.layout().size();
        let sigma = process.volatility();
        let dxx_map = SecondDerivativeOp::new(direction, Arc::clone(&mesher))?
            .mult(&Array::from_element(n, 0.5 * sigma * sigma))?;
        Ok(Self {
            x: mesher.locations(direction),
            dx_map: FirstDerivativeOp::new(direction, Arc::clone(&mesher))?.into_inner(),
            map_x: TripleBandLinearOp::new(direction, Arc::clone(&mesher))?,
            dxx_map,
            mesher,
            process,
            r_ts,
            direction,
        })
    }
}

impl FdmLinearOpComposite for FdmExtendedOrnsteinUhlenbeckOp {
    fn size(&self) -> usize {
        self.mesher.layout().dim().len()
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let r = self.r_ts.forward_rate(t1, t2);
        let t = 0.5 * (t1 + t2);
        let drift = self.x.map(|x| self.process.drift(t, x));
        self.map_x
            .axpyb(Some(&drift), &self.dx_map, &self.dxx_map, Some(&Array::from_element(1, -r)))
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        self.map_x.apply(r)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        Ok(Array::zeros(r.size()))
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array> {
        if direction == self.direction {
            self.map_x.apply(r)
        } else if direction < self.size() {
            Ok(Array::zeros(r.size()))
        } else {
            Err(direction_error(self.size(), direction))
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array> {
        if direction == self.direction {
            self.map_x.solve_splitting(r, -a, 1.0)
        } else if direction < self.size() {
            Ok(r.clone())
        } else {
            Err(direction_error(self.size(), direction))
        }
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        self.solve_splitting(self.direction, r, a)
    }
}

#[cfg(test)]
mod tests {
    use super::super::checks::assert_splitting_round_trip;
    use super::*;
    use crate::finite_differences::meshers::{FdmMesherComposite, Uniform1dMesher};
    use approx::assert_abs_diff_eq;
    use ql_termstructures::FlatForward;

    #[test]
    fn linear_function_picks_up_the_drift() {
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::from_1d(Arc::new(Uniform1dMesher::new(-2.0, 2.0, 41).unwrap())).unwrap());
        let level = Arc::new(|t: Time| 0.5 + 0.1 * t);
        let process = Arc::new(ExtendedOrnsteinUhlenbeckProcess::new(2.0, 0.3, 0.0, level).unwrap());
        let mut op = FdmExtendedOrnsteinUhlenbeckOp::new(
            Arc::clone(&mesher),
            Arc::clone(&process),
            Arc::new(FlatForward::new(0.03)),
            0,
        )
        .unwrap();
        op.set_time(1.0, 2.0).unwrap();

        let x = mesher.locations(0);
        let lu = op.apply(&x).unwrap();
        for i in 0..41 {
            let expected = process.drift(1.5, x[i]) - 0.03 * x[i];
            assert_abs_diff_eq!(lu[i], expected, epsilon = 1e-10);
        }
        assert_splitting_round_trip(&op, &x.map(|v| (v * 3.0).sin()), 0.05, 1e-9);
    }
}
