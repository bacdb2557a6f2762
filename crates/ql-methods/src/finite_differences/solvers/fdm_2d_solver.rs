use super::{axis_locations, theta_from_snapshot, FdmSolverDesc, RollbackSetup};
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, LazyCache, Real};
use ql_math::interpolations::{BicubicSpline, Interpolation2D};
use ql_math::Array;
use std::sync::Arc;

#[derive(Debug)]
struct Solution {
    values: Array,
    interpolation: BicubicSpline,
    theta_interpolation: Option<BicubicSpline>,
}

/// Two-dimensional rollback, interpolated with a bicubic spline.
///
/// Corresponds to `QuantLib::Fdm2DimSolver`.
#[derive(Debug)]
pub struct Fdm2DimSolver {
    setup: RollbackSetup,
    x: Vec<Real>,
    y: Vec<Real>,
    solution: LazyCache<Arc<Solution>>,
}

impl Fdm2DimSolver {
    /// # Errors
    /// The mesher is not two-dimensional, or the theta snapshot cannot be
    /// joined with the step conditions.
    pub fn new(
        solver_desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        let dims = solver_desc.mesher.layout().dim().len();
        ql_core::ensure!(dims == 2, "two-dimensional mesher required, got {dims} axes");
        let x = axis_locations(solver_desc.mesher.as_ref(), 0);
        let y = axis_locations(solver_desc.mesher.as_ref(), 1);
        Ok(Self {
            setup: RollbackSetup::new(solver_desc, scheme_desc, op)?,
            x,
            y,
            solution: LazyCache::new(),
        })
    }

    fn solution(&self) -> Result<Arc<Solution>> {
        self.solution.get_or_try_compute(0, || {
            let rolled = self.setup.rollback()?;
            let interpolation = BicubicSpline::new(&self.x, &self.y, rolled.values.as_slice())?;
            let theta_interpolation = rolled
                .theta_values
                .map(|v| BicubicSpline::new(&self.x, &self.y, v.as_slice()))
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

    /// The grid values at `t = 0`, axis 0 varying fastest.
    pub fn result_values(&self) -> Result<Array> {
        Ok(self.solution()?.values.clone())
    }

    /// The value at `(x, y)`.
    pub fn interpolate_at(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.solution()?.interpolation.operator(x, y))
    }

    /// `∂V/∂x` at `(x, y)`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.solution()?.interpolation.derivative_x(x, y))
    }

    /// `∂V/∂y` at `(x, y)`.
    pub fn derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.solution()?.interpolation.derivative_y(x, y))
    }

    /// `∂²V/∂x²` at `(x, y)`.
    pub fn derivative_xx(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.solution()?.interpolation.second_derivative_x(x, y))
    }

    /// `∂²V/∂y²` at `(x, y)`.
    pub fn derivative_yy(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.solution()?.interpolation.second_derivative_y(x, y))
    }

    /// `∂²V/∂x∂y` at `(x, y)`.
    pub fn derivative_xy(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.solution()?.interpolation.derivative_xy(x, y))
    }

    /// `∂V/∂t` at `(x, y)` from the snapshot taken just after `t = 0`.
    ///
    /// # Errors
    /// The first stopping time is at zero, so no snapshot exists.
    pub fn theta_at(&self, x: Real, y: Real) -> Result<Real> {
        let solution = self.solution()?;
        theta_from_snapshot(
            solution.theta_interpolation.as_ref().map(|s| s.operator(x, y)),
            solution.interpolation.operator(x, y),
            self.setup.theta_time(),
        )
    }
}
