use super::{axis_lines, StepCondition};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};
use ql_math::Array;
use std::sync::Arc;

/// Discrete arithmetic averaging on a `(log S, A)` grid.
///
/// Axis `equity_direction` holds `ln S`, axis `average_direction` the
/// running average in spot units. At the `k`-th future fixing, with
/// `n = past_fixings + k` fixings already in the average,
/// `V(S, A) ← V(S, (n·A + S)/(n + 1))`, interpolated linearly along the
/// average axis.
///
/// Corresponds to `QuantLib::FdmArithmeticAverageCondition`.
#[derive(Debug, Clone)]
pub struct FdmArithmeticAverageCondition {
    averaging_times: Vec<Time>,
    past_fixings: usize,
    mesher: Arc<dyn FdmMesher>,
    equity_direction: usize,
    average_direction: usize,
}

impl FdmArithmeticAverageCondition {
    /// # Errors
    /// Both directions coincide or are not axes of `mesher`.
    pub fn new(
        averaging_times: Vec<Time>,
        past_fixings: usize,
        mesher: Arc<dyn FdmMesher>,
        equity_direction: usize,
        average_direction: usize,
    ) -> Result<Self> {
        let dims = mesher.layout().dim().len();
        if equity_direction == average_direction || equity_direction.max(average_direction) >= dims {
            return Err(Error::DimensionMismatch {
                expected: dims,
                found: equity_direction.max(average_direction) + 1,
            });
        }
        Ok(Self {
            averaging_times,
            past_fixings,
            mesher,
            equity_direction,
            average_direction,
        })
    }

    /// The future fixing times.
    pub fn averaging_times(&self) -> &[Time] {
        &self.averaging_times
    }
}

impl StepCondition for FdmArithmeticAverageCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        let Some(k) = self.averaging_times.iter().position(|&s| s == t) else {
            return Ok(());
        };
        let n = (self.past_fixings + k) as Real;

        let x = self.mesher.locations(self.equity_direction);
        let avg = self.mesher.locations(self.average_direction);
        let before = a.clone();
        for line in axis_lines(self.mesher.layout(), self.average_direction) {
            let averages: Vec<Real> = line.iter().map(|&i| avg[i]).collect();
            let ys: Vec<Real> = line.iter().map(|&i| before[i]).collect();
            let interp = LinearInterpolation::new(&averages, &ys)?;
            let spot = x[line[0]].exp();
            for (&i, &current) in line.iter().zip(&averages) {
                a[i] = interp.operator((n * current + spot) / (n + 1.0));
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.averaging_times.clone()
    }
}
