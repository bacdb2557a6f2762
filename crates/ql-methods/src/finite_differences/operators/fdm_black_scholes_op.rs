use super::{direction_error, FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use ql_processes::GeneralizedBlackScholesProcess;
use ql_termstructures::{BlackVolTermStructure, LocalVolTermStructure, YieldTermStructure};
use std::sync::Arc;

/// Black-Scholes generator in log-spot `x = ln S`:
///
/// `L = (r − q − ½σ²) ∂x + ½σ² ∂xx − r`
///
/// With `local_vol` the variance is `σ_loc(t, eˣ)²` per grid point,
/// otherwise the Black forward variance at `strike` over the time step.
///
/// Corresponds to `QuantLib::FdmBlackScholesOp`.
#[derive(Debug, Clone)]
pub struct FdmBlackScholesOp {
    mesher: Arc<dyn FdmMesher>,
    r_ts: Arc<dyn YieldTermStructure>,
    q_ts: Arc<dyn YieldTermStructure>,
    vol_ts: Arc<dyn BlackVolTermStructure>,
    local_vol: Option<Arc<dyn LocalVolTermStructure>>,
    x: Array,
    dx_map: TripleBandLinearOp,
    dxx_map: TripleBandLinearOp,
    map_t: TripleBandLinearOp,
    strike: Real,
    direction: usize,
}

impl FdmBlackScholesOp {
    /// Generator acting on the log-spot axis `direction` of `mesher`.
    pub fn new(
        mesher: Arc<dyn FdmMesher>,
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        local_vol: bool,
        direction: usize,
    ) -> Result<Self> {
        let dx_map = FirstDerivativeOp::new(direction, Arc::clone(&mesher))?.into_inner();
        let dxx_map = SecondDerivativeOp::new(direction, Arc::clone(&mesher))?.into_inner();
        let map_t = TripleBandLinearOp::new(direction, Arc::clone(&mesher))?;
        Ok(Self {
            x: mesher.locations(direction),
            r_ts: Arc::clone(process.risk_free_rate()),
            q_ts: Arc::clone(process.dividend_yield()),
            vol_ts: Arc::clone(process.black_volatility()),
            local_vol: local_vol.then(|| process.local_volatility()),
            mesher,
            dx_map,
            dxx_map,
            map_t,
            strike,
            direction,
        })
    }

    /// The assembled banded generator of the current time step.
    pub fn generator(&self) -> &TripleBandLinearOp {
        &self.map_t
    }
}

impl FdmLinearOpComposite for FdmBlackScholesOp {
    fn size(&self) -> usize {
        self.mesher.layout().dim().len()
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let r = self.r_ts.forward_rate(t1, t2);
        let q = self.q_ts.forward_rate(t1, t2);

        let v = match &self.local_vol {
            Some(lv) => {
                let t = 0.5 * (t1 + t2);
                self.x.map(|x| {
                    let sigma = lv.local_vol(t, x.exp());
                    sigma * sigma
                })
            }
            None => {
                let v = if t2 > t1 {
                    self.vol_ts.black_forward_variance(t1, t2, self.strike) / (t2 - t1)
                } else {
                    let sigma = self.vol_ts.black_vol(t1, self.strike);
                    sigma * sigma
                };
                Array::from_element(1, v)
            }
        };

        let drift = v.map(|v| r - q - 0.5 * v);
        let diffusion = if v.size() == 1 {
            self.dxx_map.mult(&Array::from_element(self.x.size(), 0.5 * v[0]))?
        } else {
            self.dxx_map.mult(&(&v * 0.5))?
        };
        self.map_t
            .axpyb(Some(&drift), &self.dx_map, &diffusion, Some(&Array::from_element(1, -r)))
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
        } else if direction < self.size() {
            Ok(Array::zeros(r.size()))
        } else {
            Err(direction_error(self.size(), direction))
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array> {
        if direction == self.direction {
            self.map_t.solve_splitting(r, -a, 1.0)
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
    use super::super::checks::{assert_additive, assert_splitting_round_trip};
    use super::*;
    use crate::finite_differences::meshers::{FdmBlackScholesMesher, FdmMesherComposite};
    use crate::finite_differences::test_support::bsm_process;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn op(local_vol: bool) -> FdmBlackScholesOp {
        let process = bsm_process(100.0, 0.02, 0.05, 0.2);
        let x = FdmBlackScholesMesher::new(60, &process, 1.0, 100.0).unwrap();
        let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::from_1d(Arc::new(x)).unwrap());
        let mut op = FdmBlackScholesOp::new(mesher, &process, 100.0, local_vol, 0).unwrap();
        op.set_time(0.4, 0.5).unwrap();
        op
    }

    #[test]
    fn rows_conserve_up_to_discounting() {
        let op = op(false);
        let m = op.generator();
        for i in 0..m.size() {
            assert_abs_diff_eq!(m.lower()[i] + m.diag()[i] + m.upper()[i], -0.05, epsilon = 1e-9);
        }
    }

    #[test]
    fn local_vol_matches_constant_vol_for_flat_surface() {
        let (a, b) = (op(false), op(true));
        let u: Array = (0..60).map(|i| (i as f64 * 0.1).sin()).collect();
        let (ra, rb) = (a.apply(&u).unwrap(), b.apply(&u).unwrap());
        for i in 0..60 {
            assert_abs_diff_eq!(ra[i], rb[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let op = op(false);
        assert!(op.apply_direction(1, &Array::zeros(60)).is_err());
    }

    proptest! {
        #[test]
        fn additive_and_invertible(seed in prop::collection::vec(-1.0f64..1.0, 60), a in 0.001f64..0.1) {
            let op = op(false);
            let u = Array::from_vec(seed);
            assert_additive(&op, &u, 1e-12);
            assert_splitting_round_trip(&op, &u, a, 1e-8);
        }
    }
}
