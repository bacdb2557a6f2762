use super::{begin_step, FdmScheme};
use crate::finite_differences::boundary_conditions::{after_applying, before_applying, FdmBoundaryConditionSet};
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// `a ← a + dt·L a`.
///
/// Corresponds to `QuantLib::ExplicitEulerScheme`.
#[derive(Debug, Clone)]
pub struct ExplicitEulerScheme {
    dt: Option<Time>,
    bc_set: FdmBoundaryConditionSet,
}

impl ExplicitEulerScheme {
    /// Explicit Euler with the given boundary conditions.
    pub fn new(bc_set: FdmBoundaryConditionSet) -> Self {
        Self { dt: None, bc_set }
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
        before_applying(&self.bc_set, from, op)?;
        let update = op.apply(a)? * (theta * dt);
        *a += &update;
        after_applying(&self.bc_set, from, a)
    }
}

impl FdmScheme for ExplicitEulerScheme {
    fn step(&mut self, op: &mut dyn FdmLinearOpComposite, a: &mut Array, t: Time) -> Result<()> {
        self.step_with_theta(op, a, t, 1.0)
    }

    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }
}
