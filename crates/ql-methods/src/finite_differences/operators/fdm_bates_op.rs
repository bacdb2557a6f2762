use super::{FdmHestonOp, FdmLinearOpComposite};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Error, errors::Result, Real, Time};
use ql_math::integrals::{GaussHermiteIntegration, GaussianQuadrature};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};
use ql_math::Array;
use ql_processes::BatesProcess;
use std::f64::consts::{PI, SQRT_2};
use std::sync::Arc;

/// Bates generator: the Heston operator with a jump-compensated dividend
/// yield `q + λm` plus the log-normal jump integral
///
/// `λ (E[u(x + J)] − u(x))`, `J ~ N(ν, δ²)`
///
/// evaluated by Gauss-Hermite quadrature on a linear interpolation of `u`
/// along the spot axis. Jump destinations outside the grid extrapolate
/// linearly.
///
/// Corresponds to `QuantLib::FdmBatesOp`.
#[derive(Debug, Clone)]
pub struct FdmBatesOp {
    lambda: Real,
    delta: Real,
    nu: Real,
    mesher: Arc<dyn FdmMesher>,
    bc_set: FdmBoundaryConditionSet,
    quadrature: GaussianQuadrature,
    heston_op: FdmHestonOp,
}

impl FdmBatesOp {
    /// Quadrature order of the jump integral.
    pub const HERMITE_ORDER: usize = 12;

    /// Generator of `process` on a two-axis `(ln S, v)` mesher.
    ///
    /// Dirichlet conditions in `bc_set` override the interpolated value of
    /// jump destinations beyond their boundary.
    ///
    /// # Errors
    /// [`Error::UnsupportedCondition`] for any other boundary condition.
    pub fn new(
        mesher: Arc<dyn FdmMesher>,
        process: &BatesProcess,
        bc_set: FdmBoundaryConditionSet,
    ) -> Result<Self> {
        if bc_set.iter().any(|bc| bc.as_dirichlet().is_none()) {
            return Err(Error::UnsupportedCondition(
                "only Dirichlet boundary conditions are supported by the jump integral".into(),
            ));
        }
        let heston_op = FdmHestonOp::with_dividend_spread(
            Arc::clone(&mesher),
            process.heston(),
            process.lambda() * process.jump_compensator(),
        )?;
        Ok(Self {
            lambda: process.lambda(),
            delta: process.delta(),
            nu: process.nu(),
            mesher,
            bc_set,
            quadrature: GaussHermiteIntegration::new(Self::HERMITE_ORDER),
            heston_op,
        })
    }
}

impl FdmLinearOpComposite for FdmBatesOp {
    fn size(&self) -> usize {
        self.heston_op.size()
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        self.heston_op.set_time(t1, t2)
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        Ok(self.heston_op.apply(r)? + self.integro(r)?)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        self.heston_op.apply_mixed(r)
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array> {
        self.heston_op.apply_direction(direction, r)
    }

    fn integro(&self, r: &Array) -> Result<Array> {
        let layout = self.mesher.layout();
        let dim = layout.dim();
        if dim.len() != 2 {
            return Err(Error::DimensionMismatch {
                expected: 2,
                found: dim.len(),
            });
        }
        if r.size() != layout.size() {
            return Err(Error::DimensionMismatch {
                expected: layout.size(),
                found: r.size(),
            });
        }
        let (nx, nv) = (dim[0], dim[1]);

        let mut x = vec![0.0; nx];
        let mut f = vec![vec![0.0; nx]; nv];
        for iter in layout.iter() {
            let c = iter.coordinates();
            x[c[0]] = self.mesher.location(&iter, 0);
            f[c[1]][c[0]] = r[iter.index()];
        }
        let lines = f
            .iter()
            .map(|row| LinearInterpolation::new(&x, row))
            .collect::<Result<Vec<_>>>()?;

        let dirichlet: Vec<_> = self.bc_set.iter().filter_map(|bc| bc.as_dirichlet()).collect();
        let scale = SQRT_2 * self.delta;
        let norm = 1.0 / PI.sqrt();

        let mut integral = Array::zeros(r.size());
        for iter in layout.iter() {
            let c = iter.coordinates();
            let line = &lines[c[1]];
            let x0 = x[c[0]];
            let expectation = self.quadrature.integrate(|y| {
                let xj = x0 + scale * y + self.nu;
                dirichlet
                    .iter()
                    .fold(line.operator(xj), |value, bc| bc.value_beyond(xj, value))
            });
            integral[iter.index()] = norm * expectation;
        }
        Ok((integral - r) * self.lambda)
    }

    fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array> {
        self.heston_op.solve_splitting(direction, r, a)
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        self.heston_op.preconditioner(r, a)
    }
}

#[cfg(test)]
mod tests {
    use super::super::checks::assert_additive;
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite, Uniform1dMesher};
    use crate::finite_differences::test_support::heston_process;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn op(lambda: Real) -> FdmBatesOp {
        let x: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(3.0, 6.2, 33).unwrap());
        let v: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 0.4, 9).unwrap());
        let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::new(vec![x, v]).unwrap());
        let process = BatesProcess::new(heston_process(100.0, 0.04, 1.5, 0.04, 0.3, -0.7), lambda, -0.1, 0.15)
            .unwrap();
        let mut op = FdmBatesOp::new(mesher, &process, Vec::new()).unwrap();
        op.set_time(0.2, 0.3).unwrap();
        op
    }

    #[test]
    fn integro_of_zero_is_zero() {
        let op = op(0.5);
        let r = op.integro(&Array::zeros(33 * 9)).unwrap();
        assert!(r.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn integro_of_linear_function_is_mean_jump() {
        // E[x + J] - x = ν for a function linear in x, extrapolation included.
        let op = op(0.5);
        let u: Array = op.mesher.locations(0);
        let r = op.integro(&u).unwrap();
        for i in 0..r.size() {
            assert_abs_diff_eq!(r[i], 0.5 * -0.1, epsilon = 1e-10);
        }
    }

    #[test]
    fn no_jumps_reduces_to_heston() {
        let op = op(0.0);
        let u: Array = (0..33 * 9).map(|i| (i as f64 * 0.01).exp()).collect();
        let heston = op.heston_op.apply(&u).unwrap();
        let bates = op.apply(&u).unwrap();
        for i in 0..u.size() {
            assert_abs_diff_eq!(heston[i], bates[i], epsilon = 1e-12);
        }
    }

    proptest! {
        #[test]
        fn additive(seed in prop::collection::vec(-1.0f64..1.0, 33 * 9)) {
            assert_additive(&op(0.3), &Array::from_vec(seed), 1e-12);
        }
    }
}
