use super::{axis_sweeps, begin_step, FdmScheme};
use crate::finite_differences::boundary_conditions::{
    after_applying, after_solving, before_applying, FdmBoundaryConditionSet,
};
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// Hundsdorfer-Verwer ADI: a Douglas step, a correction of the whole
/// generator weighted `μ`, and a second sweep around the first stage.
///
/// Corresponds to `QuantLib::HundsdorferScheme`.
#[derive(Debug, Clone)]
pub struct HundsdorferScheme {
    theta: Real,
    mu: Real,
    dt: Option<Time>,
    bc_set: FdmBoundaryConditionSet,
}

impl HundsdorferScheme {
    /// Hundsdorfer-Verwer with implicit weight `theta` and correction
    /// weight `mu`.
    pub fn new(theta: Real, mu: Real, bc_set: FdmBoundaryConditionSet) -> Self {
        Self {
            theta,
            mu,
            dt: None,
            bc_set,
        }
    }
}

impl FdmScheme for HundsdorferScheme {
    fn step(&mut self, op: &mut dyn FdmLinearOpComposite, a: &mut Array, t: Time) -> Result<()> {
        let (from, dt) = begin_step(op, self.dt, t)?;
        let op: &dyn FdmLinearOpComposite = op;
        let theta_dt = self.theta * dt;

        before_applying(&self.bc_set, from, op)?;
        let mut y0 = &*a + &(op.apply(a)? * dt);
        after_applying(&self.bc_set, from, &mut y0)?;
        let y = axis_sweeps(op, y0.clone(), a, theta_dt)?;

        before_applying(&self.bc_set, from, op)?;
        let mut yt = y0 + op.apply(&(&y - &*a))? * (self.mu * dt);
        after_applying(&self.bc_set, from, &mut yt)?;
        let mut yt = axis_sweeps(op, yt, &y, theta_dt)?;
        after_solving(&self.bc_set, from, &mut yt)?;
        *a = yt;
        Ok(())
    }

    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }
}
