use super::StepCondition;
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{errors::Error, errors::Result, Time};
use ql_math::Array;
use std::sync::Arc;

/// Early exercise at every step: `a ← max(a, inner value)`.
///
/// Corresponds to `QuantLib::FdmAmericanStepCondition`.
#[derive(Debug, Clone)]
pub struct FdmAmericanStepCondition {
    mesher: Arc<dyn FdmMesher>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmAmericanStepCondition {
    /// Exercise into the values of `calculator`.
    pub fn new(mesher: Arc<dyn FdmMesher>, calculator: Arc<dyn FdmInnerValueCalculator>) -> Self {
        Self { mesher, calculator }
    }
}

impl StepCondition for FdmAmericanStepCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        let layout = self.mesher.layout();
        if a.size() != layout.size() {
            return Err(Error::DimensionMismatch {
                expected: layout.size(),
                found: a.size(),
            });
        }
        for iter in layout.iter() {
            let inner = self.calculator.inner_value(&iter, t);
            let v = &mut a[iter.index()];
            if inner > *v {
                *v = inner;
            }
        }
        Ok(())
    }
}
