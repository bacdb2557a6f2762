use super::{Fdm2DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmCirOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, LazyCache, Real, Versioned};
use ql_processes::{GeneralizedBlackScholesProcess, SquareRootProcess};
use std::sync::Arc;

/// Equity option under a CIR short rate on the `(ln S, r)` grid.
///
/// Corresponds to `QuantLib::FdmCIRSolver`.
#[derive(Debug)]
pub struct FdmCirSolver {
    bs_process: Arc<GeneralizedBlackScholesProcess>,
    cir_process: Arc<SquareRootProcess>,
    rho: Real,
    strike: Real,
    solver_desc: FdmSolverDesc,
    scheme_desc: FdmSchemeDesc,
    solver: LazyCache<Arc<Fdm2DimSolver>>,
}

impl FdmCirSolver {
    /// Solver for the equity `bs_process` correlated by `rho` with the
    /// short rate `cir_process`.
    pub fn new(
        bs_process: Arc<GeneralizedBlackScholesProcess>,
        cir_process: Arc<SquareRootProcess>,
        rho: Real,
        strike: Real,
        solver_desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
    ) -> Self {
        Self {
            bs_process,
            cir_process,
            rho,
            strike,
            solver_desc,
            scheme_desc,
            solver: LazyCache::new(),
        }
    }

    fn solver(&self) -> Result<Arc<Fdm2DimSolver>> {
        let stamp = self.bs_process.version() + self.cir_process.version();
        self.solver.get_or_try_compute(stamp, || {
            let op = FdmCirOp::new(
                Arc::clone(&self.solver_desc.mesher),
                &self.cir_process,
                &self.bs_process,
                self.rho,
                self.strike,
            )?;
            Ok(Arc::new(Fdm2DimSolver::new(
                self.solver_desc.clone(),
                self.scheme_desc,
                Box::new(op),
            )?))
        })
    }

    /// Option value at spot `s` and short rate `r`.
    pub fn value_at(&self, s: Real, r: Real) -> Result<Real> {
        self.solver()?.interpolate_at(s.ln(), r)
    }

    /// `∂V/∂S`.
    pub fn delta_at(&self, s: Real, r: Real) -> Result<Real> {
        Ok(self.solver()?.derivative_x(s.ln(), r)? / s)
    }

    /// `∂²V/∂S²`.
    pub fn gamma_at(&self, s: Real, r: Real) -> Result<Real> {
        let solver = self.solver()?;
        let x = s.ln();
        Ok((solver.derivative_xx(x, r)? - solver.derivative_x(x, r)?) / (s * s))
    }

    /// `∂V/∂t`.
    pub fn theta_at(&self, s: Real, r: Real) -> Result<Real> {
        self.solver()?.theta_at(s.ln(), r)
    }
}
