use super::{is_stopping_time, StepCondition};
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{errors::Result, Time};
use ql_math::Array;
use std::sync::Arc;

/// Early exercise at a discrete set of times.
///
/// Corresponds to `QuantLib::FdmBermudanStepCondition`.
#[derive(Debug, Clone)]
pub struct FdmBermudanStepCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<dyn FdmMesher>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmBermudanStepCondition {
    /// Exercise into `calculator` at each of `exercise_times`.
    pub fn new(
        exercise_times: Vec<Time>,
        mesher: Arc<dyn FdmMesher>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Self {
        Self {
            exercise_times,
            mesher,
            calculator,
        }
    }

    /// The exercise times.
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }
}

impl StepCondition for FdmBermudanStepCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if is_stopping_time(&self.exercise_times, t) {
            for iter in self.mesher.layout().iter() {
                let inner = self.calculator.inner_value(&iter, t);
                let i = iter.index();
                a[i] = a[i].max(inner);
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.exercise_times.clone()
    }
}
