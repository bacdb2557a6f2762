use super::{Fdm3DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmHestonHullWhiteOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, LazyCache, Real, Versioned};
use ql_processes::{HestonProcess, HullWhiteProcess};
use std::sync::Arc;

/// Heston equity with a Hull-White short rate on the `(ln S, v, r)` grid.
///
/// Greeks are central differences of the interpolated value in the spot.
///
/// Corresponds to `QuantLib::FdmHestonHullWhiteSolver`.
#[derive(Debug)]
pub struct FdmHestonHullWhiteSolver {
    heston: Arc<HestonProcess>,
    hull_white: Arc<HullWhiteProcess>,
    corr_equity_short_rate: Real,
    solver_desc: FdmSolverDesc,
    scheme_desc: FdmSchemeDesc,
    solver: LazyCache<Arc<Fdm3DimSolver>>,
}

impl FdmHestonHullWhiteSolver {
    /// Solver for the three-factor model.
    pub fn new(
        heston: Arc<HestonProcess>,
        hull_white: Arc<HullWhiteProcess>,
        corr_equity_short_rate: Real,
        solver_desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
    ) -> Self {
        Self {
            heston,
            hull_white,
            corr_equity_short_rate,
            solver_desc,
            scheme_desc,
            solver: LazyCache::new(),
        }
    }

    fn solver(&self) -> Result<Arc<Fdm3DimSolver>> {
        let stamp = self.heston.version() + self.hull_white.version();
        self.solver.get_or_try_compute(stamp, || {
            let op = FdmHestonHullWhiteOp::new(
                Arc::clone(&self.solver_desc.mesher),
                &self.heston,
                Arc::clone(&self.hull_white),
                self.corr_equity_short_rate,
            )?;
            Ok(Arc::new(Fdm3DimSolver::new(
                self.solver_desc.clone(),
                self.scheme_desc,
                Box::new(op),
            )?))
        })
    }

    /// Option value at spot `s`, variance `v` and short-rate factor `r`.
    pub fn value_at(&self, s: Real, v: Real, r: Real) -> Result<Real> {
        self.solver()?.interpolate_at(s.ln(), v, r)
    }

    /// `∂V/∂t`.
    pub fn theta_at(&self, s: Real, v: Real, r: Real) -> Result<Real> {
        self.solver()?.theta_at(s.ln(), v, r)
    }

    /// `(V(s + eps) − V(s − eps)) / 2eps`.
    pub fn delta_at(&self, s: Real, v: Real, r: Real, eps: Real) -> Result<Real> {
        Ok((self.value_at(s + eps, v, r)? - self.value_at(s - eps, v, r)?) / (2.0 * eps))
    }

    /// `(V(s + eps) + V(s − eps) − 2V(s)) / eps²`.
    pub fn gamma_at(&self, s: Real, v: Real, r: Real, eps: Real) -> Result<Real> {
        let up = self.value_at(s + eps, v, r)?;
        let down = self.value_at(s - eps, v, r)?;
        let mid = self.value_at(s, v, r)?;
        Ok((up + down - 2.0 * mid) / (eps * eps))
    }
}
