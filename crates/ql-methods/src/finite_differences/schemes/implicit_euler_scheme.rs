use super::{begin_step, FdmScheme};
use crate::finite_differences::boundary_conditions::{after_solving, before_solving, FdmBoundaryConditionSet};
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::{Array, BiCGStab};
use tracing::warn;

/// `a ← (I − dt·L)⁻¹ a`.
///
/// One-directional generators are inverted exactly by the tridiagonal
/// solve; otherwise the system is solved by BiCGStab, preconditioned with
/// the successive axis solves of the operator.
///
/// Corresponds to `QuantLib::ImplicitEulerScheme`.
#[derive(Debug, Clone)]
pub struct ImplicitEulerScheme {
    dt: Option<Time>,
    rel_tolerance: Real,
    bc_set: FdmBoundaryConditionSet,
}

impl ImplicitEulerScheme {
    /// Default relative residual of the BiCGStab solve.
    pub const DEFAULT_REL_TOLERANCE: Real = 1e-8;

    /// Implicit Euler with the given boundary conditions.
    pub fn new(bc_set: FdmBoundaryConditionSet) -> Self {
        Self::with_tolerance(bc_set, Self::DEFAULT_REL_TOLERANCE)
    }

    /// Implicit Euler with a custom BiCGStab tolerance.
    pub fn with_tolerance(bc_set: FdmBoundaryConditionSet, rel_tolerance: Real) -> Self {
        Self {
            dt: None,
            rel_tolerance,
            bc_set,
        }
    }

    /// A step of `theta·dt`, as used by the θ-schemes.
    pub(crate) fn step_with_theta(
        &mut self,
        op: &mut dyn FdmLinearOpComposite,
        a: &mut Array,
        t: Time,
        theta: Real,
    ) -> Result<()> {
        let (from, dt) = begin_step(op, self.dt, t)?;
        let op: &dyn FdmLinearOpComposite = op;
        before_solving(&self.bc_set, from, op, a)?;

        let weight = theta * dt;
        *a = if op.size() == 1 {
            op.solve_splitting(0, a, weight)?
        } else {
            let max_iterations = a.size().max(10);
            let result = BiCGStab::new(max_iterations, self.rel_tolerance).solve(
                |x: &Array| Ok(x - &(op.apply(x)? * weight)),
                |r: &Array| op.preconditioner(r, weight),
                a,
                Some(a),
            )?;
            if 2 * result.iterations > max_iterations {
                warn!(
                    iterations = result.iterations,
                    max_iterations,
                    residual = result.error,
                    "slow BiCGStab convergence in implicit step"
                );
            }
            result.x
        };

        after_solving(&self.bc_set, from, a)
    }
}

impl FdmScheme for ImplicitEulerScheme {
    fn step(&mut self, op: &mut dyn FdmLinearOpComposite, a: &mut Array, t: Time) -> Result<()> {
        self.step_with_theta(op, a, t, 1.0)
    }

    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }
}
