use super::{Fdm2DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmExtOUJumpOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, LazyCache, Real, Versioned};
use ql_processes::ExtOUWithJumpsProcess;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Kluge model rollback on the `(x, y)` grid of the diffusive and jump
/// factors.
///
/// Corresponds to `QuantLib::FdmExtOUJumpSolver`.
#[derive(Debug)]
pub struct FdmExtOUJumpSolver {
    process: Arc<ExtOUWithJumpsProcess>,
    r_ts: Arc<dyn YieldTermStructure>,
    solver_desc: FdmSolverDesc,
    scheme_desc: FdmSchemeDesc,
    integration_order: usize,
    solver: LazyCache<Arc<Fdm2DimSolver>>,
}

impl FdmExtOUJumpSolver {
    /// Solver for `process`, discounting on `r_ts`.
    pub fn new(
        process: Arc<ExtOUWithJumpsProcess>,
        r_ts: Arc<dyn YieldTermStructure>,
        solver_desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        integration_order: usize,
    ) -> Self {
        Self {
            process,
            r_ts,
            solver_desc,
            scheme_desc,
            integration_order,
            solver: LazyCache::new(),
        }
    }

    fn solver(&self) -> Result<Arc<Fdm2DimSolver>> {
        self.solver.get_or_try_compute(self.process.version(), || {
            let op = FdmExtOUJumpOp::new(
                Arc::clone(&self.solver_desc.mesher),
                &self.process,
                Arc::clone(&self.r_ts),
                self.integration_order,
            )?;
            Ok(Arc::new(Fdm2DimSolver::new(
                self.solver_desc.clone(),
                self.scheme_desc,
                Box::new(op),
            )?))
        })
    }

    /// Value at the factor levels `(x, y)`.
    pub fn value_at(&self, x: Real, y: Real) -> Result<Real> {
        self.solver()?.interpolate_at(x, y)
    }

    /// `∂V/∂t` at `(x, y)`.
    pub fn theta_at(&self, x: Real, y: Real) -> Result<Real> {
        self.solver()?.theta_at(x, y)
    }
}
