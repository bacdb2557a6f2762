use super::{
    FdmAmericanStepCondition, FdmBermudanStepCondition, FdmDividendHandler, FdmSnapshotCondition,
    StepCondition,
};
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_instruments::{Dividend, Exercise, ExerciseType};
use ql_math::Array;
use std::sync::Arc;

/// Relative tolerance below which two stopping times are considered the
/// same instant.
pub(crate) const STOPPING_TIME_TOLERANCE: Real = 1e-12;

/// An ordered list of step conditions with the union of their stopping
/// times.
///
/// Corresponds to `QuantLib::FdmStepConditionComposite`.
#[derive(Debug, Clone, Default)]
pub struct FdmStepConditionComposite {
    stopping_times: Vec<Time>,
    conditions: Vec<Arc<dyn StepCondition>>,
}

impl FdmStepConditionComposite {
    /// Conditions applied in the given order.
    ///
    /// # Errors
    /// [`Error::GridAlignment`] if a stopping time is negative or not
    /// finite, or two distinct stopping times are too close to be resolved.
    pub fn new(conditions: Vec<Arc<dyn StepCondition>>) -> Result<Self> {
        let mut times: Vec<Time> = conditions.iter().flat_map(|c| c.stopping_times()).collect();
        if let Some(bad) = times.iter().find(|t| !(t.is_finite() && **t >= 0.0)) {
            return Err(Error::GridAlignment(format!("invalid stopping time {bad}")));
        }
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        for w in times.windows(2) {
            if w[1] - w[0] <= STOPPING_TIME_TOLERANCE * w[1].max(1.0) {
                return Err(Error::GridAlignment(format!(
                    "stopping times {} and {} cannot be separated",
                    w[0], w[1]
                )));
            }
        }
        Ok(Self {
            stopping_times: times,
            conditions,
        })
    }

    /// Sorted, deduplicated stopping times of all conditions.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// The conditions, in application order.
    pub fn conditions(&self) -> &[Arc<dyn StepCondition>] {
        &self.conditions
    }

    /// Dividends (if any) followed by the early-exercise rule of `exercise`.
    ///
    /// # Errors
    /// Propagates dividend-handler and stopping-time validation failures.
    pub fn vanilla_composite(
        dividends: &[Dividend],
        exercise: &Exercise,
        calculator: Arc<dyn FdmInnerValueCalculator>,
        mesher: Arc<dyn FdmMesher>,
        equity_direction: usize,
    ) -> Result<Self> {
        let mut conditions: Vec<Arc<dyn StepCondition>> = Vec::new();
        if !dividends.is_empty() {
            conditions.push(Arc::new(FdmDividendHandler::new(
                dividends,
                Arc::clone(&mesher),
                equity_direction,
            )?));
        }
        match exercise.exercise_type() {
            ExerciseType::European => {}
            ExerciseType::American => {
                conditions.push(Arc::new(FdmAmericanStepCondition::new(mesher, calculator)));
            }
            ExerciseType::Bermudan => {
                conditions.push(Arc::new(FdmBermudanStepCondition::new(
                    exercise.times().to_vec(),
                    mesher,
                    calculator,
                )));
            }
        }
        Self::new(conditions)
    }

    /// `composite` followed by `snapshot`.
    ///
    /// # Errors
    /// The snapshot time collides with one of the composite's stopping times
    /// within tolerance without being equal.
    pub fn join_conditions(snapshot: Arc<FdmSnapshotCondition>, composite: &Self) -> Result<Self> {
        let mut conditions = composite.conditions.clone();
        conditions.push(snapshot);
        Self::new(conditions)
    }
}

impl StepCondition for FdmStepConditionComposite {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        for condition in &self.conditions {
            condition.apply_to(a, t)?;
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.stopping_times.clone()
    }
}
