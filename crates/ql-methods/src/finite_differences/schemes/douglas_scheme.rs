use super::{axis_sweeps, begin_step, FdmScheme};
use crate::finite_differences::boundary_conditions::{
    after_applying, after_solving, before_applying, FdmBoundaryConditionSet,
};
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// Douglas ADI: an explicit predictor followed by one implicit correction
/// per axis.
///
/// Corresponds to `QuantLib::DouglasScheme`.
#[derive(Debug, Clone)]
pub struct DouglasScheme {
    theta: Real,
    dt: Option<Time>,
    bc_set: FdmBoundaryConditionSet,
}

impl DouglasScheme {
    /// Douglas with weight `theta` on the implicit sweeps.
    pub fn new(theta: Real, bc_set: FdmBoundaryConditionSet) -> Self {
        Self {
            theta,
            dt: None,
            bc_set,
        }
    }
}

impl FdmScheme for DouglasScheme {
    fn step(&mut self, op: &mut dyn FdmLinearOpComposite, a: &mut Array, t: Time) -> Result<()> {
        let (from, dt) = begin_step(op, self.dt, t)?;
        let op: &dyn FdmLinearOpComposite = op;
        before_applying(&self.bc_set, from, op)?;
        let mut y = &*a + &(op.apply(a)? * dt);
        after_applying(&self.bc_set, from, &mut y)?;

        let mut y = axis_sweeps(op, y, a, self.theta * dt)?;
        after_solving(&self.bc_set, from, &mut y)?;
        *a = y;
        Ok(())
    }

    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }
}
