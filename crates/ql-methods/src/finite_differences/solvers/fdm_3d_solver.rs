use super::{axis_locations, theta_from_snapshot, FdmSolverDesc, RollbackSetup};
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, LazyCache, Real};
use ql_math::interpolations::{BicubicSpline, CubicNaturalSpline, Interpolation1D, Interpolation2D};
use ql_math::Array;
use std::sync::Arc;

/// A bicubic spline per `z` slice, joined by a cubic spline across slices.
#[derive(Debug)]
struct SlicedSurface {
    z: Vec<Real>,
    slices: Vec<BicubicSpline>,
}

impl SlicedSurface {
    fn new(x: &[Real], y: &[Real], z: &[Real], values: &Array) -> Result<Self> {
        let slice_size = x.len() * y.len();
        let slices = values
            .as_slice()
            .chunks(slice_size)
            .map(|slice| BicubicSpline::new(x, y, slice))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { z: z.to_vec(), slices })
    }

    fn across<F: Fn(&BicubicSpline) -> Real>(&self, f: F) -> Result<CubicNaturalSpline> {
        let column: Vec<Real> = self.slices.iter().map(f).collect();
        CubicNaturalSpline::new(&self.z, &column)
    }

    fn value(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        Ok(self.across(|s| s.operator(x, y))?.operator(z))
    }
}

#[derive(Debug)]
struct Solution {
    values: Array,
    surface: SlicedSurface,
    theta_surface: Option<SlicedSurface>,
}

/// Three-dimensional rollback, interpolated slice by slice.
///
/// Corresponds to `QuantLib::Fdm3DimSolver`.
#[derive(Debug)]
pub struct Fdm3DimSolver {
    setup: RollbackSetup,
    x: Vec<Real>,
    y: Vec<Real>,
    z: Vec<Real>,
    solution: LazyCache<Arc<Solution>>,
}

impl Fdm3DimSolver {
    /// # Errors
    /// The mesher is not three-dimensional, or the theta snapshot cannot
    /// be joined with the step conditions.
    pub fn new(
        solver_desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        let dims = solver_desc.mesher.layout().dim().len();
        ql_core::ensure!(dims == 3, "three-dimensional mesher required, got {dims} axes");
        let mesher = solver_desc.mesher.as_ref();
        let (x, y, z) = (axis_locations(mesher, 0), axis_locations(mesher, 1), axis_locations(mesher, 2));
        Ok(Self {
            setup: RollbackSetup::new(solver_desc, scheme_desc, op)?,
            x,
            y,
            z,
            solution: LazyCache::new(),
        })
    }

    fn solution(&self) -> Result<Arc<Solution>> {
        self.solution.get_or_try_compute(0, || {
            let rolled = self.setup.rollback()?;
            let surface = SlicedSurface::new(&self.x, &self.y, &self.z, &rolled.values)?;
            let theta_surface = rolled
                .theta_values
                .map(|v| SlicedSurface::new(&self.x, &self.y, &self.z, &v))
                .transpose()?;
            Ok(Arc::new(Solution {
                values: rolled.values,
                surface,
                theta_surface,
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

    /// The value at `(x, y, z)`.
    pub fn interpolate_at(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        self.solution()?.surface.value(x, y, z)
    }

    /// `∂V/∂x` at `(x, y, z)`.
    pub fn derivative_x(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        Ok(self.solution()?.surface.across(|s| s.derivative_x(x, y))?.operator(z))
    }

    /// `∂²V/∂x²` at `(x, y, z)`.
    pub fn derivative_xx(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        Ok(self.solution()?.surface.across(|s| s.second_derivative_x(x, y))?.operator(z))
    }

    /// `∂V/∂t` at `(x, y, z)` from the snapshot taken just after `t = 0`.
    ///
    /// # Errors
    /// The first stopping time is at zero, so no snapshot exists.
    pub fn theta_at(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        let solution = self.solution()?;
        let snapshot = match solution.theta_surface.as_ref() {
            Some(s) => Some(s.value(x, y, z)?),
            None => None,
        };
        theta_from_snapshot(snapshot, solution.surface.value(x, y, z)?, self.setup.theta_time())
    }
}
