//! Discretely averaged Asian options
//! (translates `ql/instruments/asianoption.hpp`).

use crate::exercise::Exercise;
use crate::instrument::{Instrument, PricingEngine, PricingResults};
use crate::payoff::StrikedPayoff;
use ql_core::{ensure, errors::Result, Real, Time};
use std::sync::Arc;

/// Averaging convention.
///
/// Corresponds to `QuantLib::Average::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AverageType {
    /// Arithmetic mean of the fixings.
    Arithmetic,
    /// Geometric mean of the fixings.
    Geometric,
}

/// Arguments for a discretely averaged Asian option.
#[derive(Debug, Clone)]
pub struct AsianOptionArguments {
    /// Averaging convention.
    pub average_type: AverageType,
    /// Sum (arithmetic) or product (geometric) of the past fixings.
    pub running_accumulator: Real,
    /// Number of fixings already observed.
    pub past_fixings: usize,
    /// Future fixing times, sorted.
    pub fixing_times: Vec<Time>,
    /// The payoff applied to the average.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise specification.
    pub exercise: Exercise,
}

/// An average-price option with discrete fixings.
///
/// Corresponds to `QuantLib::DiscreteAveragingAsianOption`.
#[derive(Debug, Clone)]
pub struct AsianOption {
    args: AsianOptionArguments,
}

impl AsianOption {
    /// # Errors
    /// No fixing times, or a fixing after expiry.
    pub fn new(
        average_type: AverageType,
        running_accumulator: Real,
        past_fixings: usize,
        mut fixing_times: Vec<Time>,
        payoff: Arc<dyn StrikedPayoff>,
        exercise: Exercise,
    ) -> Result<Self> {
        ensure!(!fixing_times.is_empty(), "no fixing times given");
        fixing_times.sort_by(|a, b| a.total_cmp(b));
        fixing_times.dedup();
        let last = fixing_times[fixing_times.len() - 1];
        ensure!(
            last <= exercise.last_time(),
            "fixing at {last} after expiry {}",
            exercise.last_time()
        );
        Ok(Self {
            args: AsianOptionArguments {
                average_type,
                running_accumulator,
                past_fixings,
                fixing_times,
                payoff,
                exercise,
            },
        })
    }

    /// Get engine arguments.
    pub fn arguments(&self) -> AsianOptionArguments {
        self.args.clone()
    }

    /// Price this option using the given engine.
    pub fn price(&self, engine: &dyn PricingEngine<AsianOptionArguments>) -> Result<PricingResults> {
        engine.calculate(&self.args)
    }
}

impl Instrument for AsianOption {
    fn maturity(&self) -> Time {
        self.args.exercise.last_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::{OptionType, PlainVanillaPayoff};

    #[test]
    fn fixings_are_sorted() {
        let opt = AsianOption::new(
            AverageType::Arithmetic,
            0.0,
            0,
            vec![1.0, 0.5, 0.75],
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            Exercise::european(1.0).unwrap(),
        )
        .unwrap();
        assert_eq!(opt.arguments().fixing_times, vec![0.5, 0.75, 1.0]);
        assert_eq!(opt.maturity(), 1.0);
    }

    #[test]
    fn fixing_after_expiry_is_rejected() {
        let res = AsianOption::new(
            AverageType::Arithmetic,
            0.0,
            0,
            vec![2.0],
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            Exercise::european(1.0).unwrap(),
        );
        assert!(res.is_err());
    }
}
