use super::{Fdm2DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmBatesOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, LazyCache, Real, Versioned};
use ql_processes::BatesProcess;
use std::sync::Arc;

/// Bates rollback on the `(ln S, v)` grid.
///
/// Corresponds to `QuantLib::FdmBatesSolver`.
#[derive(Debug)]
pub struct FdmBatesSolver {
    process: Arc<BatesProcess>,
    solver_desc: FdmSolverDesc,
    scheme_desc: FdmSchemeDesc,
    solver: LazyCache<Arc<Fdm2DimSolver>>,
}

impl FdmBatesSolver {
    /// Solver for `process`. The boundary conditions of `solver_desc` must
    /// all be Dirichlet conditions.
    pub fn new(process: Arc<BatesProcess>, solver_desc: FdmSolverDesc, scheme_desc: FdmSchemeDesc) -> Self {
        Self {
            process,
            solver_desc,
            scheme_desc,
            solver: LazyCache::new(),
        }
    }

    fn solver(&self) -> Result<Arc<Fdm2DimSolver>> {
        self.solver.get_or_try_compute(self.process.version(), || {
            let op = FdmBatesOp::new(
                Arc::clone(&self.solver_desc.mesher),
                &self.process,
                self.solver_desc.bc_set.clone(),
            )?;
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
}
