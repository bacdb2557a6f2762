use super::{axis_locations, theta_from_snapshot, FdmSolverDesc, RollbackSetup};
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, LazyCache, Real};
use ql_math::interpolations::{CubicNaturalSpline, Interpolation1D};
use ql_math::Array;
use std::sync::Arc;

#[derive(Debug)]
struct Solution {
    values: Array,
    interpolation: CubicNaturalSpline,
    theta_interpolation: Option<CubicNaturalSpline>,
}

/// One-dimensional rollback, interpolated with a natural cubic spline.
///
/// The rollback runs on the first query and is kept afterwards.
///
/// Corresponds to `QuantLib::Fdm1DimSolver`.
#[derive(Debug)]
pub struct Fdm1DimSolver {
    setup: RollbackSetup,
    x: Vec<Real>,
    solution: LazyCache<Arc<Solution>>,
}

impl Fdm1DimSolver {
    /// # Errors
    /// The mesher is not one-dimensional, or the theta snapshot cannot be
    /// joined with the step conditions.
    pub fn new(
        solver_desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        let dims = solver_desc.mesher.layout().dim().len();
        ql_core::ensure!(dims == 1, "one-dimensional mesher required, got {dims} axes");
        let x = axis_locations(solver_desc.mesher.as_ref(), 0);
        Ok(Self {
            setup: RollbackSetup::new(solver_desc, scheme_desc, op)?,
            x,
            solution: LazyCache::new(),
        })
    }

    fn solution(&self) -> Result<Arc<Solution>> {
        self.solution.get_or_try_compute(0, || {
            let rolled = self.setup.rollback()?;
            let interpolation = CubicNaturalSpline::new(&self.x, rolled.values.as_slice())?;
            let theta_interpolation = rolled
                .theta_values
                .map(|v| CubicNaturalSpline::new(&self.x, v.as_slice()))
                .transpose()?;
            Ok(Arc::new(Solution {
                values: rolled.values,
                interpolation,
                theta_interpolation,
            }))
        })
    }

    /// The solver description.
    pub fn solver_desc(&self) -> &FdmSolverDesc {
        self.setup.desc()
    }

    /// The grid values at `t = 0`.
    pub fn result_values(&self) -> Result<Array> {
        Ok(self.solution()?.values.clone())
    }

    /// The value at `x`.
    pub fn interpolate_at(&self, x: Real) -> Result<Real> {
        Ok(self.solution()?.interpolation.operator(x))
    }

    /// `∂V/∂x` at `x`.
    pub fn derivative_x(&self, x: Real) -> Result<Real> {
        Ok(self.solution()?.interpolation.derivative(x))
    }

    /// `∂²V/∂x²` at `x`.
    pub fn derivative_xx(&self, x: Real) -> Result<Real> {
        Ok(self.solution()?.interpolation.second_derivative(x))
    }

    /// `∂V/∂t` at `x` from the snapshot taken just after `t = 0`.
    ///
    /// # Errors
    /// The first stopping time is at zero, so no snapshot exists.
    pub fn theta_at(&self, x: Real) -> Result<Real> {
        let solution = self.solution()?;
        theta_from_snapshot(
            solution.theta_interpolation.as_ref().map(|s| s.operator(x)),
            solution.interpolation.operator(x),
            self.setup.theta_time(),
        )
    }
}
