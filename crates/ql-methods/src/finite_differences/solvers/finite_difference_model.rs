use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmScheme;
use crate::finite_differences::step_conditions::StepCondition;
use ql_core::{
    ensure,
    errors::{Error, Result},
    Real, Time,
};
use ql_math::Array;
use tracing::trace;

/// Relative distance below which a step end is snapped onto a stopping time.
pub(crate) const SNAP_TOLERANCE: Real = 1e-12;

/// Absolute distance below which the last step end is snapped onto the
/// rollback target.
const TARGET_TOLERANCE: Real = 1.490_116_119_384_765_6e-8;

/// Rolled-back values beyond this magnitude are treated as divergence.
pub(crate) const DIVERGENCE_BOUND: Real = 1e100;

/// Drives a scheme over `steps` uniform steps and sub-steps onto every
/// stopping time on the way, so conditions see the values exactly there.
///
/// Corresponds to `QuantLib::FiniteDifferenceModel`.
pub struct FiniteDifferenceModel {
    evolver: Box<dyn FdmScheme>,
    stopping_times: Vec<Time>,
}

impl FiniteDifferenceModel {
    /// `stopping_times` must be sorted ascending.
    pub fn new(evolver: Box<dyn FdmScheme>, stopping_times: Vec<Time>) -> Self {
        Self {
            evolver,
            stopping_times,
        }
    }

    /// Roll `a` back from `from` to `to`.
    ///
    /// `condition` is applied at `from`, at every stopping time crossed and
    /// at the end of every step.
    ///
    /// # Errors
    /// `from < to`, zero steps, values that are not finite or exceed
    /// [`DIVERGENCE_BOUND`], and any scheme or condition failure.
    pub fn rollback(
        &mut self,
        op: &mut dyn FdmLinearOpComposite,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: usize,
        condition: Option<&dyn StepCondition>,
    ) -> Result<()> {
        if let Some(c) = condition {
            c.apply_to(a, from)?;
        }
        self.resume(op, a, from, to, steps, condition)
    }

    /// Like [`rollback`](Self::rollback) for values the condition has
    /// already seen at `from`.
    pub(crate) fn resume(
        &mut self,
        op: &mut dyn FdmLinearOpComposite,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: usize,
        condition: Option<&dyn StepCondition>,
    ) -> Result<()> {
        ensure!(from >= to, "trying to roll back from {from} to {to}");
        ensure!(steps > 0, "at least one time step required");

        let dt = (from - to) / steps as Real;
        self.evolver.set_step(dt);

        let mut t = from;
        for i in 0..steps {
            let mut now = t;
            let mut next = self.snap(now - dt);
            if (to - next).abs() < TARGET_TOLERANCE || i + 1 == steps {
                next = to;
            }

            let mut hit = false;
            for j in (0..self.stopping_times.len()).rev() {
                let s = self.stopping_times[j];
                if next <= s && s < now {
                    hit = true;
                    self.evolver.set_step(now - s);
                    self.evolver.step(op, a, now)?;
                    check_values(a, s)?;
                    if let Some(c) = condition {
                        c.apply_to(a, s)?;
                    }
                    trace!(time = s, "stopping time reached");
                    now = s;
                }
            }

            if hit {
                if now > next {
                    self.evolver.set_step(now - next);
                    self.evolver.step(op, a, now)?;
                    check_values(a, next)?;
                    if let Some(c) = condition {
                        c.apply_to(a, next)?;
                    }
                }
                self.evolver.set_step(dt);
            } else {
                self.evolver.step(op, a, now)?;
                check_values(a, next)?;
                if let Some(c) = condition {
                    c.apply_to(a, next)?;
                }
            }
            t = next;
        }
        Ok(())
    }

    fn snap(&self, t: Time) -> Time {
        self.stopping_times
            .iter()
            .copied()
            .find(|&s| (s - t).abs() <= SNAP_TOLERANCE * s.abs().max(1.0))
            .unwrap_or(t)
    }
}

fn check_values(a: &Array, t: Time) -> Result<()> {
    if a.iter().all(|v| v.is_finite() && v.abs() <= DIVERGENCE_BOUND) {
        Ok(())
    } else {
        Err(Error::SolverDivergence(format!(
            "rolled-back values diverged at t = {t}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::schemes::test_ops::HeatOp;
    use crate::finite_differences::schemes::{DouglasScheme, ExplicitEulerScheme};
    use crate::finite_differences::step_conditions::StepCondition;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder(Mutex<Vec<Time>>);

    impl StepCondition for Recorder {
        fn apply_to(&self, _a: &mut Array, t: Time) -> Result<()> {
            self.0.lock().unwrap().push(t);
            Ok(())
        }
    }

    #[test]
    fn stopping_times_are_hit_exactly() {
        let mut op = HeatOp::new(&[7], 0.05, 0.0);
        let mut a = Array::from_element(7, 1.0);
        let mut model = FiniteDifferenceModel::new(Box::new(DouglasScheme::new(0.5, Vec::new())), vec![0.0, 0.33, 0.5]);
        let recorder = Recorder::default();
        model.rollback(&mut op, &mut a, 1.0, 0.0, 4, Some(&recorder)).unwrap();
        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(seen, vec![1.0, 0.75, 0.5, 0.33, 0.25, 0.0]);
    }

    #[test]
    fn step_ends_close_to_a_stopping_time_snap_onto_it() {
        let mut op = HeatOp::new(&[5], 0.0, 0.0);
        let mut a = Array::from_element(5, 1.0);
        let s = 0.7 + 1e-14;
        let mut model = FiniteDifferenceModel::new(Box::new(DouglasScheme::new(0.5, Vec::new())), vec![s]);
        let recorder = Recorder::default();
        model.rollback(&mut op, &mut a, 1.0, 0.0, 10, Some(&recorder)).unwrap();
        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(seen.len(), 11);
        assert!(seen.contains(&s));
    }

    #[test]
    fn unstable_explicit_steps_report_divergence() {
        let mut op = HeatOp::new(&[101], 0.0, 0.0);
        let mut a: Array = (0..101).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut model = FiniteDifferenceModel::new(Box::new(ExplicitEulerScheme::new(Vec::new())), Vec::new());
        let err = model.rollback(&mut op, &mut a, 1.0, 0.0, 100, None).unwrap_err();
        assert!(matches!(err, Error::SolverDivergence(_)));
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let mut op = HeatOp::new(&[5], 0.0, 0.0);
        let mut a = Array::zeros(5);
        let mut model = FiniteDifferenceModel::new(Box::new(DouglasScheme::new(0.5, Vec::new())), Vec::new());
        assert!(model.rollback(&mut op, &mut a, 0.0, 1.0, 10, None).is_err());
        assert!(model.rollback(&mut op, &mut a, 1.0, 0.0, 0, None).is_err());
    }
}
