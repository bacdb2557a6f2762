use super::FiniteDifferenceModel;
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::{
    CraigSneydScheme, CrankNicolsonScheme, DouglasScheme, ExplicitEulerScheme, FdmScheme, FdmSchemeDesc,
    FdmSchemeType, HundsdorferScheme, ImplicitEulerScheme, ModifiedCraigSneydScheme,
};
use crate::finite_differences::step_conditions::{FdmStepConditionComposite, StepCondition};
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use std::sync::Arc;
use tracing::debug;

/// Rolls values back with the scheme of an [`FdmSchemeDesc`], starting
/// with fully implicit damping steps where requested.
///
/// Damping runs only once, right after the terminal condition; later
/// discontinuities introduced by step conditions are not damped again.
///
/// Corresponds to `QuantLib::FdmBackwardSolver`.
#[derive(Debug, Clone)]
pub struct FdmBackwardSolver {
    bc_set: FdmBoundaryConditionSet,
    condition: Arc<FdmStepConditionComposite>,
    scheme_desc: FdmSchemeDesc,
}

impl FdmBackwardSolver {
    /// A solver for the given boundaries, conditions and scheme.
    pub fn new(
        bc_set: FdmBoundaryConditionSet,
        condition: Arc<FdmStepConditionComposite>,
        scheme_desc: FdmSchemeDesc,
    ) -> Self {
        Self {
            bc_set,
            condition,
            scheme_desc,
        }
    }

    /// The scheme an [`FdmSchemeDesc`] describes.
    pub fn make_scheme(desc: &FdmSchemeDesc, bc_set: FdmBoundaryConditionSet) -> Box<dyn FdmScheme> {
        match desc.scheme_type {
            FdmSchemeType::Hundsdorfer => Box::new(HundsdorferScheme::new(desc.theta, desc.mu, bc_set)),
            FdmSchemeType::Douglas => Box::new(DouglasScheme::new(desc.theta, bc_set)),
            FdmSchemeType::CraigSneyd => Box::new(CraigSneydScheme::new(desc.theta, desc.mu, bc_set)),
            FdmSchemeType::ModifiedCraigSneyd => {
                Box::new(ModifiedCraigSneydScheme::new(desc.theta, desc.mu, bc_set))
            }
            FdmSchemeType::ImplicitEuler => Box::new(ImplicitEulerScheme::new(bc_set)),
            FdmSchemeType::ExplicitEuler => Box::new(ExplicitEulerScheme::new(bc_set)),
            FdmSchemeType::CrankNicolson => Box::new(CrankNicolsonScheme::new(desc.theta, bc_set)),
        }
    }

    /// Roll `rhs` back from `from` to `to` in `steps` scheme steps,
    /// preceded by `damping_steps` implicit Euler steps.
    ///
    /// # Errors
    /// Propagates every scheme, condition and divergence failure.
    pub fn rollback(
        &self,
        op: &mut dyn FdmLinearOpComposite,
        rhs: &mut Array,
        from: Time,
        to: Time,
        steps: usize,
        damping_steps: usize,
    ) -> Result<()> {
        let all_steps = steps + damping_steps;
        let damping_to = from - (from - to) * damping_steps as Real / all_steps as Real;
        let stopping_times = self.condition.stopping_times().to_vec();
        let condition: &dyn StepCondition = self.condition.as_ref();

        if self.scheme_desc.scheme_type == FdmSchemeType::ImplicitEuler {
            let mut model = FiniteDifferenceModel::new(
                Box::new(ImplicitEulerScheme::new(self.bc_set.clone())),
                stopping_times,
            );
            return model.rollback(op, rhs, from, to, all_steps, Some(condition));
        }

        let mut model = FiniteDifferenceModel::new(
            Self::make_scheme(&self.scheme_desc, self.bc_set.clone()),
            stopping_times.clone(),
        );
        if damping_steps == 0 {
            return model.rollback(op, rhs, from, to, steps, Some(condition));
        }

        debug!(damping_steps, from, to = damping_to, "implicit damping steps");
        let mut damping = FiniteDifferenceModel::new(
            Box::new(ImplicitEulerScheme::new(self.bc_set.clone())),
            stopping_times,
        );
        damping.rollback(op, rhs, from, damping_to, damping_steps, Some(condition))?;
        model.resume(op, rhs, damping_to, to, steps, Some(condition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::schemes::test_ops::{cosine_mode, HeatOp};
    use approx::assert_abs_diff_eq;

    fn rolled_back(desc: FdmSchemeDesc, damping: usize) -> Array {
        let mut op = HeatOp::new(&[21, 21], 0.0, 0.0);
        let mut u = cosine_mode(op.mesher.as_ref());
        let solver = FdmBackwardSolver::new(Vec::new(), Arc::new(FdmStepConditionComposite::default()), desc);
        solver.rollback(&mut op, &mut u, 0.5, 0.0, 20, damping).unwrap();
        u
    }

    #[test]
    fn damping_steps_change_little_on_smooth_data() {
        let centre = 10 + 21 * 10;
        let plain = rolled_back(FdmSchemeDesc::douglas(), 0);
        let damped = rolled_back(FdmSchemeDesc::douglas(), 2);
        assert_abs_diff_eq!(plain[centre], damped[centre], epsilon = 5e-3);
        assert!(plain[centre] != damped[centre]);
    }

    #[test]
    fn every_descriptor_builds_a_working_scheme() {
        let centre = 10 + 21 * 10;
        let reference = rolled_back(FdmSchemeDesc::crank_nicolson(), 0)[centre];
        for desc in [
            FdmSchemeDesc::douglas(),
            FdmSchemeDesc::craig_sneyd(),
            FdmSchemeDesc::modified_craig_sneyd(),
            FdmSchemeDesc::hundsdorfer(),
            FdmSchemeDesc::modified_hundsdorfer(),
            FdmSchemeDesc::implicit_euler(),
        ] {
            assert_abs_diff_eq!(rolled_back(desc, 1)[centre], reference, epsilon = 2e-2);
        }
    }

    #[derive(Debug)]
    struct CountAt {
        time: Time,
        hits: std::sync::Mutex<usize>,
    }

    impl StepCondition for CountAt {
        fn apply_to(&self, _a: &mut Array, t: Time) -> Result<()> {
            if t == self.time {
                *self.hits.lock().unwrap() += 1;
            }
            Ok(())
        }

        fn stopping_times(&self) -> Vec<Time> {
            vec![self.time]
        }
    }

    #[test]
    fn condition_at_the_damping_boundary_is_applied_once() {
        let damping_to = 0.5 - 0.5 * 2.0 / 22.0;
        let counter = Arc::new(CountAt {
            time: damping_to,
            hits: std::sync::Mutex::new(0),
        });
        let conditions: Vec<Arc<dyn StepCondition>> = vec![counter.clone()];
        let composite = FdmStepConditionComposite::new(conditions).unwrap();
        let solver = FdmBackwardSolver::new(Vec::new(), Arc::new(composite), FdmSchemeDesc::douglas());
        let mut op = HeatOp::new(&[21], 0.0, 0.0);
        let mut u = cosine_mode(op.mesher.as_ref());
        solver.rollback(&mut op, &mut u, 0.5, 0.0, 20, 2).unwrap();
        assert_eq!(*counter.hits.lock().unwrap(), 1);
    }
}
