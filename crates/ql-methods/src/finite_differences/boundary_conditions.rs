//! Boundary conditions applied around operator application and implicit
//! solves (translates `ql/methods/finitedifferences/boundarycondition.hpp`
//! and `ql/methods/finitedifferences/utilities/fdmdirichletboundary.hpp`).

use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Error, errors::Result, Real, Time};
use ql_math::Array;
use std::fmt;
use std::sync::Arc;

/// Which end of an axis a boundary condition acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// The first point of the axis.
    Lower,
    /// The last point of the axis.
    Upper,
}

/// Hooks a scheme calls on every time step. `t` is the start of the
/// step being rolled back to.
///
/// All hooks default to doing nothing.
pub trait FdmBoundaryCondition: Send + Sync + fmt::Debug {
    /// Before `L` is applied.
    fn apply_before_applying(&self, _t: Time, _op: &dyn FdmLinearOpComposite) -> Result<()> {
        Ok(())
    }

    /// After an explicit update `a ← a + dt·L a`.
    fn apply_after_applying(&self, _t: Time, _a: &mut Array) -> Result<()> {
        Ok(())
    }

    /// On the right-hand side of an implicit solve.
    fn apply_before_solving(&self, _t: Time, _op: &dyn FdmLinearOpComposite, _rhs: &mut Array) -> Result<()> {
        Ok(())
    }

    /// After an implicit solve.
    fn apply_after_solving(&self, _t: Time, _a: &mut Array) -> Result<()> {
        Ok(())
    }

    /// The condition as a constant Dirichlet boundary, if it is one.
    fn as_dirichlet(&self) -> Option<&FdmDirichletBoundary> {
        None
    }
}

/// The boundary conditions of one problem.
pub type FdmBoundaryConditionSet = Vec<Arc<dyn FdmBoundaryCondition>>;

pub(crate) fn before_applying(set: &FdmBoundaryConditionSet, t: Time, op: &dyn FdmLinearOpComposite) -> Result<()> {
    set.iter().try_for_each(|bc| bc.apply_before_applying(t, op))
}

pub(crate) fn after_applying(set: &FdmBoundaryConditionSet, t: Time, a: &mut Array) -> Result<()> {
    set.iter().try_for_each(|bc| bc.apply_after_applying(t, a))
}

pub(crate) fn before_solving(
    set: &FdmBoundaryConditionSet,
    t: Time,
    op: &dyn FdmLinearOpComposite,
    rhs: &mut Array,
) -> Result<()> {
    set.iter().try_for_each(|bc| bc.apply_before_solving(t, op, rhs))
}

pub(crate) fn after_solving(set: &FdmBoundaryConditionSet, t: Time, a: &mut Array) -> Result<()> {
    set.iter().try_for_each(|bc| bc.apply_after_solving(t, a))
}

/// Flat indices of every grid point on `side` of axis `direction`.
///
/// Corresponds to `QuantLib::FdmIndicesOnBoundary`.
pub fn indices_on_boundary(mesher: &dyn FdmMesher, direction: usize, side: Side) -> Result<Vec<usize>> {
    let layout = mesher.layout();
    let ndim = layout.dim().len();
    if direction >= ndim {
        return Err(Error::DimensionMismatch {
            expected: ndim,
            found: direction + 1,
        });
    }
    let edge = match side {
        Side::Lower => 0,
        Side::Upper => layout.dim()[direction] - 1,
    };
    Ok(layout
        .iter()
        .filter(|iter| iter.coordinates()[direction] == edge)
        .map(|iter| iter.index())
        .collect())
}

fn set_indices(indices: &[usize], a: &mut Array, value: Real) -> Result<()> {
    for &i in indices {
        if i >= a.size() {
            return Err(Error::IndexOutOfRange {
                index: i,
                size: a.size(),
            });
        }
        a[i] = value;
    }
    Ok(())
}

/// Fixes the solution on one side of an axis to a constant.
///
/// Corresponds to `QuantLib::FdmDirichletBoundary`.
#[derive(Debug, Clone)]
pub struct FdmDirichletBoundary {
    side: Side,
    value: Real,
    x_extreme: Real,
    indices: Vec<usize>,
}

impl FdmDirichletBoundary {
    /// `u = value` on `side` of the axis `direction`.
    pub fn new(mesher: &dyn FdmMesher, value: Real, direction: usize, side: Side) -> Result<Self> {
        let indices = indices_on_boundary(mesher, direction, side)?;
        let locations = mesher.locations(direction);
        let x_extreme = indices.first().map_or(Real::NAN, |&i| locations[i]);
        Ok(Self {
            side,
            value,
            x_extreme,
            indices,
        })
    }

    /// The boundary value.
    pub fn value(&self) -> Real {
        self.value
    }

    /// The side of the axis.
    pub fn side(&self) -> Side {
        self.side
    }

    /// `value` for a coordinate `x` beyond the boundary, otherwise the
    /// interpolated `fallback`.
    pub fn value_beyond(&self, x: Real, fallback: Real) -> Real {
        let beyond = match self.side {
            Side::Lower => x < self.x_extreme,
            Side::Upper => x > self.x_extreme,
        };
        if beyond {
            self.value
        } else {
            fallback
        }
    }
}

impl FdmBoundaryCondition for FdmDirichletBoundary {
    fn apply_after_applying(&self, _t: Time, a: &mut Array) -> Result<()> {
        set_indices(&self.indices, a, self.value)
    }

    fn apply_before_solving(&self, _t: Time, _op: &dyn FdmLinearOpComposite, rhs: &mut Array) -> Result<()> {
        set_indices(&self.indices, rhs, self.value)
    }

    fn apply_after_solving(&self, _t: Time, a: &mut Array) -> Result<()> {
        set_indices(&self.indices, a, self.value)
    }

    fn as_dirichlet(&self) -> Option<&FdmDirichletBoundary> {
        Some(self)
    }
}

/// A boundary value depending on time.
pub type BoundaryValueFn = Arc<dyn Fn(Time) -> Real + Send + Sync>;

/// Dirichlet boundary whose value is re-evaluated at every step.
///
/// Corresponds to `QuantLib::FdmTimeDepDirichletBoundary`.
#[derive(Clone)]
pub struct FdmTimeDepDirichletBoundary {
    value: BoundaryValueFn,
    indices: Vec<usize>,
}

impl FdmTimeDepDirichletBoundary {
    /// `u = value(t)` on `side` of the axis `direction`.
    pub fn new(mesher: &dyn FdmMesher, value: BoundaryValueFn, direction: usize, side: Side) -> Result<Self> {
        Ok(Self {
            value,
            indices: indices_on_boundary(mesher, direction, side)?,
        })
    }
}

impl fmt::Debug for FdmTimeDepDirichletBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmTimeDepDirichletBoundary")
            .field("indices", &self.indices.len())
            .finish_non_exhaustive()
    }
}

impl FdmBoundaryCondition for FdmTimeDepDirichletBoundary {
    fn apply_after_applying(&self, t: Time, a: &mut Array) -> Result<()> {
        set_indices(&self.indices, a, (self.value)(t))
    }

    fn apply_before_solving(&self, t: Time, _op: &dyn FdmLinearOpComposite, rhs: &mut Array) -> Result<()> {
        set_indices(&self.indices, rhs, (self.value)(t))
    }

    fn apply_after_solving(&self, t: Time, a: &mut Array) -> Result<()> {
        set_indices(&self.indices, a, (self.value)(t))
    }
}
