use super::{ExplicitEulerScheme, FdmScheme, ImplicitEulerScheme};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

/// An explicit step weighted `1 − θ` followed by an implicit step
/// weighted `θ`.
///
/// Corresponds to `QuantLib::CrankNicolsonScheme`.
#[derive(Debug, Clone)]
pub struct CrankNicolsonScheme {
    theta: Real,
    explicit: ExplicitEulerScheme,
    implicit: ImplicitEulerScheme,
}

impl CrankNicolsonScheme {
    /// θ-scheme with the given boundary conditions.
    pub fn new(theta: Real, bc_set: FdmBoundaryConditionSet) -> Self {
        Self {
            theta,
            explicit: ExplicitEulerScheme::new(bc_set.clone()),
            implicit: ImplicitEulerScheme::new(bc_set),
        }
    }
}

impl FdmScheme for CrankNicolsonScheme {
    fn step(&mut self, op: &mut dyn FdmLinearOpComposite, a: &mut Array, t: Time) -> Result<()> {
        if self.theta != 1.0 {
            self.explicit.step_with_theta(op, a, t, 1.0 - self.theta)?;
        }
        if self.theta != 0.0 {
            self.implicit.step_with_theta(op, a, t, self.theta)?;
        }
        Ok(())
    }

    fn set_step(&mut self, dt: Time) {
        self.explicit.set_step(dt);
        self.implicit.set_step(dt);
    }
}
