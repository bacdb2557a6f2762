use super::{direction_error, FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use ql_processes::HullWhiteProcess;
use std::sync::Arc;

/// Hull-White generator on the deviation `x = r − α(t)`:
///
/// `L = −a x ∂x + ½σ² ∂xx − (x + φ)`, `φ = ½(α(t₁) + α(t₂))`
///
/// Corresponds to `QuantLib::FdmHullWhiteOp`.
#[derive(Debug, Clone)]
pub struct FdmHullWhiteOp {
    process: Arc<HullWhiteProcess>,
    direction: usize,
    ndim: usize,
    x: Array,
    dz_map: TripleBandLinearOp,
    map_t: TripleBandLinearOp,
}

impl FdmHullWhiteOp {
    /// Generator of `process` along `direction`.
    pub fn new(mesher: Arc<dyn FdmMesher>, process: Arc<HullWhiteProcess>, direction: usize) -> Result<Self> {
        let x = mesher.locations(direction);
        let (a, sigma) = (process.a(), process.sigma());
        let dz_map = FirstDerivativeOp::new(direction, Arc::clone(&mesher))?
            .mult(&(&x * -a))?
            .add_triple(
                &SecondDerivativeOp::new(direction, Arc::clone(&mesher))?
                    .mult(&Array::from_element(x.size(), 0.5 * sigma * sigma))?,
            )?;
        Ok(Self {
            map_t: TripleBandLinearOp::new(direction, Arc::clone(&mesher))?,
            ndim: mesher.layout().dim().len(),
            process,
            direction,
            x,
            dz_map,
        })
    }
}

impl FdmLinearOpComposite for FdmHullWhiteOp {
    fn size(&self) -> usize {
        self.ndim
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let phi = 0.5 * (self.process.alpha(t1) + self.process.alpha(t2));
        let discount = self.x.map(|x| -(x + phi));
        self.map_t
            .axpyb(None, &self.dz_map, &self.dz_map, Some(&discount))
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        self.map_t.apply(r)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        Ok(Array::zeros(r.size()))
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array> {
        if direction == self.direction {
            self.map_t.apply(r)
        } else if direction < self.ndim {
            Ok(Array::zeros(r.size()))
        } else {
            Err(direction_error(self.ndim, direction))
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array> {
        if direction == self.direction {
            self.map_t.solve_splitting(r, -a, 1.0)
        } else if direction < self.ndim {
            Ok(r.clone())
        } else {
            Err(direction_error(self.ndim, direction))
        }
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        self.solve_splitting(self.direction, r, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{FdmMesherComposite, Uniform1dMesher};
    use approx::assert_abs_diff_eq;
    use ql_termstructures::FlatForward;

    #[test]
    fn constant_is_discounted_at_the_short_rate() {
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::from_1d(Arc::new(Uniform1dMesher::new(-0.1, 0.1, 21).unwrap())).unwrap());
        let process = Arc::new(HullWhiteProcess::new(Arc::new(FlatForward::new(0.04)), 0.1, 0.01).unwrap());
        let mut op = FdmHullWhiteOp::new(Arc::clone(&mesher), Arc::clone(&process), 0).unwrap();
        op.set_time(1.0, 1.5).unwrap();
        let phi = 0.5 * (process.alpha(1.0) + process.alpha(1.5));
        let x = mesher.locations(0);
        let lu = op.apply(&Array::from_element(21, 1.0)).unwrap();
        for i in 0..21 {
            assert_abs_diff_eq!(lu[i], -(x[i] + phi), epsilon = 1e-12);
        }
    }
}
