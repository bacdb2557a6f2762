//! Conditions applied at stopping times of the rollback
//! (translates `ql/methods/finitedifferences/stepconditions/`).
//!
//! A step condition mutates the solution in place when the rollback
//! reaches one of its stopping times. Conditions without stopping times
//! (American exercise) act after every step.

mod fdm_american_step_condition;
mod fdm_arithmetic_average_condition;
mod fdm_bermudan_step_condition;
mod fdm_discrete_barrier_condition;
mod fdm_dividend_handler;
mod fdm_snapshot_condition;
mod fdm_step_condition_composite;

pub use fdm_american_step_condition::FdmAmericanStepCondition;
pub use fdm_arithmetic_average_condition::FdmArithmeticAverageCondition;
pub use fdm_bermudan_step_condition::FdmBermudanStepCondition;
pub use fdm_discrete_barrier_condition::FdmDiscreteBarrierCondition;
pub use fdm_dividend_handler::FdmDividendHandler;
pub use fdm_snapshot_condition::FdmSnapshotCondition;
pub use fdm_step_condition_composite::FdmStepConditionComposite;

use crate::finite_differences::operators::FdmLinearOpLayout;
use ql_core::{errors::Result, Time};
use ql_math::Array;
use std::fmt::Debug;

/// A rule applied to the rolled-back values at time `t`.
///
/// Corresponds to `QuantLib::StepCondition<Array>`.
pub trait StepCondition: Send + Sync + Debug {
    /// Apply the condition to the values at time `t`.
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()>;

    /// Times the rollback must hit exactly.
    fn stopping_times(&self) -> Vec<Time> {
        Vec::new()
    }
}

/// `true` if `t` is one of `times`, compared exactly. The rollback snaps
/// its steps onto stopping times, so no tolerance is needed.
pub(crate) fn is_stopping_time(times: &[Time], t: Time) -> bool {
    times.iter().any(|&s| s == t)
}

/// Flat indices of every grid line along `axis`, one vector per line,
/// ordered by the coordinate on `axis`.
pub(crate) fn axis_lines(layout: &FdmLinearOpLayout, axis: usize) -> Vec<Vec<usize>> {
    let n = layout.dim()[axis];
    let stride = layout.spacing()[axis];
    layout
        .iter()
        .filter(|iter| iter.coordinates()[axis] == 0)
        .map(|iter| (0..n).map(|k| iter.index() + k * stride).collect())
        .collect()
}
