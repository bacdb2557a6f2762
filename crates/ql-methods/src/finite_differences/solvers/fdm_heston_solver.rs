use super::{Fdm2DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmHestonOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, LazyCache, Real, Versioned};
use ql_processes::HestonProcess;
use std::sync::Arc;

/// Heston rollback on the `(ln S, v)` grid, queried in spot terms.
///
/// Corresponds to `QuantLib::FdmHestonSolver`.
#[derive(Debug)]
pub struct FdmHestonSolver {
    process: Arc<HestonProcess>,
    solver_desc: FdmSolverDesc,
    scheme_desc: FdmSchemeDesc,
    solver: LazyCache<Arc<Fdm2DimSolver>>,
}

impl FdmHestonSolver {
    /// Solver for `process`.
    pub fn new(process: Arc<HestonProcess>, solver_desc: FdmSolverDesc, scheme_desc: FdmSchemeDesc) -> Self {
        Self {
            process,
            solver_desc,
            scheme_desc,
            solver: LazyCache::new(),
        }
    }

    fn solver(&self) -> Result<Arc<Fdm2DimSolver>> {
        self.solver.get_or_try_compute(self.process.version(), || {
            let op = FdmHestonOp::new(Arc::clone(&self.solver_desc.mesher), &self.process)?;
            Ok(Arc::new(Fdm2DimSolver::new(
                self.solver_desc.clone(),
                self.scheme_desc,
                Box::new(op),
            )?))
        })
    }

    /// Option value at spot `s` and variance `v`.
    pub fn value_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver()?.interpolate_at(s.ln(), v)
    }

    /// `∂V/∂S`.
    pub fn delta_at(&self, s: Real, v: Real) -> Result<Real> {
        Ok(self.solver()?.derivative_x(s.ln(), v)? / s)
    }

    /// `∂²V/∂S²`.
    pub fn gamma_at(&self, s: Real, v: Real) -> Result<Real> {
        let solver = self.solver()?;
        let x = s.ln();
        Ok((solver.derivative_xx(x, v)? - solver.derivative_x(x, v)?) / (s * s))
    }

    /// `∂V/∂t`.
    pub fn theta_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver()?.theta_at(s.ln(), v)
    }

    /// Minimum-variance delta `∂V/∂S + ρσ/S·∂V/∂v`.
    pub fn mean_variance_delta_at(&self, s: Real, v: Real) -> Result<Real> {
        let alpha = self.process.rho() * self.process.sigma() / s;
        Ok(self.delta_at(s, v)? + alpha * self.solver()?.derivative_y(s.ln(), v)?)
    }

    /// Derivative of the minimum-variance delta with respect to the spot.
    pub fn mean_variance_gamma_at(&self, s: Real, v: Real) -> Result<Real> {
        let solver = self.solver()?;
        let x = s.ln();
        let alpha = self.process.rho() * self.process.sigma() / s;
        Ok(self.gamma_at(s, v)?
            + solver.derivative_yy(x, v)? * alpha * alpha
            + 2.0 * solver.derivative_xy(x, v)? * alpha / s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{
        Fdm1dMesher, FdmHestonVarianceMesher, FdmMesher, FdmMesherComposite, Uniform1dMesher,
    };
    use crate::finite_differences::step_conditions::FdmStepConditionComposite;
    use crate::finite_differences::test_support::heston_process;
    use crate::finite_differences::utilities::FdmLogInnerValue;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{OptionType, PlainVanillaPayoff};

    fn solver(process: Arc<HestonProcess>, option_type: OptionType) -> FdmHestonSolver {
        let x: Arc<dyn Fdm1dMesher> =
            Arc::new(Uniform1dMesher::new(100f64.ln() - 1.5, 100f64.ln() + 1.5, 101).unwrap());
        let v: Arc<dyn Fdm1dMesher> = Arc::new(FdmHestonVarianceMesher::new(41, &process, 1.0, 10).unwrap());
        let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::new(vec![x, v]).unwrap());
        let calculator = Arc::new(FdmLogInnerValue::new(
            Arc::new(PlainVanillaPayoff::new(option_type, 100.0)),
            Arc::clone(&mesher),
            0,
        ));
        let desc = FdmSolverDesc {
            mesher,
            bc_set: Vec::new(),
            condition: Arc::new(FdmStepConditionComposite::default()),
            calculator,
            maturity: 1.0,
            time_steps: 50,
            damping_steps: 0,
        };
        FdmHestonSolver::new(process, desc, FdmSchemeDesc::hundsdorfer())
    }

    #[test]
    fn european_prices_satisfy_put_call_parity() {
        let process = Arc::new(heston_process(100.0, 0.04, 1.5, 0.04, 0.3, -0.7));
        let call = solver(Arc::clone(&process), OptionType::Call).value_at(100.0, 0.04).unwrap();
        let put = solver(process, OptionType::Put).value_at(100.0, 0.04).unwrap();
        assert_abs_diff_eq!(call - put, 100.0 - 100.0 * (-0.05f64).exp(), epsilon = 5e-2);
    }

    #[test]
    fn low_vol_of_vol_is_close_to_black_scholes() {
        let s = solver(Arc::new(heston_process(100.0, 0.04, 1.5, 0.04, 0.1, 0.0)), OptionType::Call);
        assert_abs_diff_eq!(s.value_at(100.0, 0.04).unwrap(), 10.4506, epsilon = 0.15);
        let delta = s.delta_at(100.0, 0.04).unwrap();
        assert!(delta > 0.55 && delta < 0.7);
        assert!(s.gamma_at(100.0, 0.04).unwrap() > 0.0);
        assert!(s.theta_at(100.0, 0.04).unwrap() < 0.0);
        assert_abs_diff_eq!(s.mean_variance_delta_at(100.0, 0.04).unwrap(), delta, epsilon = 1e-12);
    }
}
