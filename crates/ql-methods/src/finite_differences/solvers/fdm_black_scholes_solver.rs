use super::{Fdm1DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmBlackScholesOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, LazyCache, Real, Versioned};
use ql_math::Array;
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

/// Black-Scholes rollback on a log-spot grid, queried in spot terms.
///
/// The operator and the rollback are rebuilt whenever the process version
/// changes.
///
/// Corresponds to `QuantLib::FdmBlackScholesSolver`.
#[derive(Debug)]
pub struct FdmBlackScholesSolver {
    process: Arc<GeneralizedBlackScholesProcess>,
    strike: Real,
    solver_desc: FdmSolverDesc,
    scheme_desc: FdmSchemeDesc,
    local_vol: bool,
    solver: LazyCache<Arc<Fdm1DimSolver>>,
}

impl FdmBlackScholesSolver {
    /// Solver for `process` with the volatility read at `strike`, or the
    /// local volatility surface if `local_vol` is set.
    pub fn new(
        process: Arc<GeneralizedBlackScholesProcess>,
        strike: Real,
        solver_desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        local_vol: bool,
    ) -> Self {
        Self {
            process,
            strike,
            solver_desc,
            scheme_desc,
            local_vol,
            solver: LazyCache::new(),
        }
    }

    fn solver(&self) -> Result<Arc<Fdm1DimSolver>> {
        self.solver.get_or_try_compute(self.process.version(), || {
            let op = FdmBlackScholesOp::new(
                Arc::clone(&self.solver_desc.mesher),
                &self.process,
                self.strike,
                self.local_vol,
                0,
            )?;
            Ok(Arc::new(Fdm1DimSolver::new(
                self.solver_desc.clone(),
                self.scheme_desc,
                Box::new(op),
            )?))
        })
    }

    /// The grid values at `t = 0`, one per log-spot node.
    pub fn result_values(&self) -> Result<Array> {
        self.solver()?.result_values()
    }

    /// Option value at spot `s`.
    pub fn value_at(&self, s: Real) -> Result<Real> {
        self.solver()?.interpolate_at(s.ln())
    }

    /// `∂V/∂S` at spot `s`.
    pub fn delta_at(&self, s: Real) -> Result<Real> {
        Ok(self.solver()?.derivative_x(s.ln())? / s)
    }

    /// `∂²V/∂S²` at spot `s`.
    pub fn gamma_at(&self, s: Real) -> Result<Real> {
        let solver = self.solver()?;
        let x = s.ln();
        Ok((solver.derivative_xx(x)? - solver.derivative_x(x)?) / (s * s))
    }

    /// `∂V/∂t` at spot `s`.
    pub fn theta_at(&self, s: Real) -> Result<Real> {
        self.solver()?.theta_at(s.ln())
    }
}
