//! Vanilla and barrier option instruments.
//!
//! Translates `ql/instruments/vanillaoption.hpp`,
//! `ql/instruments/oneassetoption.hpp` and `ql/instruments/barrieroption.hpp`.

use crate::exercise::Exercise;
use crate::instrument::{Instrument, PricingEngine, PricingResults};
use crate::payoff::{OptionType, PlainVanillaPayoff, StrikedPayoff};
use ql_core::{ensure, errors::Result, Real, Time};
use std::sync::Arc;

// ────────────────────────────────────────────────────────────────────────────
// Option arguments (sent to pricing engines)
// ────────────────────────────────────────────────────────────────────────────

/// Arguments needed for pricing a one-asset option.
///
/// Corresponds to `QuantLib::OneAssetOption::arguments`.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise specification.
    pub exercise: Exercise,
}

// ────────────────────────────────────────────────────────────────────────────
// VanillaOption
// ────────────────────────────────────────────────────────────────────────────

/// A plain vanilla option on a single underlying asset.
///
/// Corresponds to `QuantLib::VanillaOption` / `QuantLib::EuropeanOption`.
#[derive(Debug, Clone)]
pub struct VanillaOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
}

impl VanillaOption {
    /// Create a new vanilla option.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self { payoff, exercise }
    }

    /// Convenience: create a European call/put expiring at `expiry`.
    pub fn european(option_type: OptionType, strike: Real, expiry: Time) -> Result<Self> {
        Ok(Self {
            payoff: Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            exercise: Exercise::european(expiry)?,
        })
    }

    /// Convenience: create an American call/put exercisable on `[0, expiry]`.
    pub fn american(option_type: OptionType, strike: Real, expiry: Time) -> Result<Self> {
        Ok(Self {
            payoff: Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            exercise: Exercise::american(0.0, expiry)?,
        })
    }

    /// The strike price.
    pub fn strike(&self) -> Real {
        self.payoff.strike()
    }

    /// The option type (call/put).
    pub fn option_type(&self) -> OptionType {
        self.payoff.option_type()
    }

    /// The payoff.
    pub fn payoff(&self) -> &Arc<dyn StrikedPayoff> {
        &self.payoff
    }

    /// The exercise.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Get the arguments for a pricing engine.
    pub fn arguments(&self) -> VanillaOptionArguments {
        VanillaOptionArguments {
            payoff: Arc::clone(&self.payoff),
            exercise: self.exercise.clone(),
        }
    }

    /// Price this option using the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<VanillaOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}

impl Instrument for VanillaOption {
    fn maturity(&self) -> Time {
        self.exercise.last_time()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BarrierOption
// ────────────────────────────────────────────────────────────────────────────

/// Barrier type.
///
/// Corresponds to `QuantLib::Barrier::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierType {
    /// Down-and-in: becomes active when price drops below barrier.
    DownIn,
    /// Up-and-in: becomes active when price rises above barrier.
    UpIn,
    /// Down-and-out: expires when price drops below barrier.
    DownOut,
    /// Up-and-out: expires when price rises above barrier.
    UpOut,
}

impl BarrierType {
    /// `true` for the knock-in variants.
    pub fn is_knock_in(self) -> bool {
        matches!(self, BarrierType::DownIn | BarrierType::UpIn)
    }

    /// `true` if the barrier sits below the spot.
    pub fn is_down(self) -> bool {
        matches!(self, BarrierType::DownIn | BarrierType::DownOut)
    }

    /// The knock-out barrier on the same side.
    pub fn knock_out(self) -> BarrierType {
        if self.is_down() {
            BarrierType::DownOut
        } else {
            BarrierType::UpOut
        }
    }

    /// `true` if `underlying` has crossed the barrier.
    pub fn triggered(self, underlying: Real, barrier: Real) -> bool {
        if self.is_down() {
            underlying < barrier
        } else {
            underlying > barrier
        }
    }
}

/// Arguments for a barrier option.
#[derive(Debug, Clone)]
pub struct BarrierOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise specification.
    pub exercise: Exercise,
    /// Barrier type.
    pub barrier_type: BarrierType,
    /// Barrier level.
    pub barrier: Real,
    /// Cash rebate paid when barrier is hit (for out) or at expiry (for in).
    pub rebate: Real,
    /// Monitoring times; empty means continuous monitoring.
    pub monitoring_times: Vec<Time>,
}

/// A barrier option.
///
/// Corresponds to `QuantLib::BarrierOption`.
#[derive(Debug, Clone)]
pub struct BarrierOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
    barrier_type: BarrierType,
    barrier: Real,
    rebate: Real,
    monitoring_times: Vec<Time>,
}

impl BarrierOption {
    /// Create a continuously monitored barrier option.
    ///
    /// # Errors
    /// A non-positive barrier.
    pub fn new(
        payoff: Arc<dyn StrikedPayoff>,
        exercise: Exercise,
        barrier_type: BarrierType,
        barrier: Real,
        rebate: Real,
    ) -> Result<Self> {
        ensure!(barrier > 0.0 && barrier.is_finite(), "barrier must be positive, got {barrier}");
        Ok(Self {
            payoff,
            exercise,
            barrier_type,
            barrier,
            rebate,
            monitoring_times: Vec::new(),
        })
    }

    /// Monitor the barrier only at `times`.
    pub fn with_monitoring_times(mut self, mut times: Vec<Time>) -> Self {
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        self.monitoring_times = times;
        self
    }

    /// The strike.
    pub fn strike(&self) -> Real {
        self.payoff.strike()
    }

    /// The option type.
    pub fn option_type(&self) -> OptionType {
        self.payoff.option_type()
    }

    /// The exercise.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Barrier type.
    pub fn barrier_type(&self) -> BarrierType {
        self.barrier_type
    }

    /// Barrier level.
    pub fn barrier(&self) -> Real {
        self.barrier
    }

    /// Rebate.
    pub fn rebate(&self) -> Real {
        self.rebate
    }

    /// Get engine arguments.
    pub fn arguments(&self) -> BarrierOptionArguments {
        BarrierOptionArguments {
            payoff: Arc::clone(&self.payoff),
            exercise: self.exercise.clone(),
            barrier_type: self.barrier_type,
            barrier: self.barrier,
            rebate: self.rebate,
            monitoring_times: self.monitoring_times.clone(),
        }
    }

    /// Price this option using the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<BarrierOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}

impl Instrument for BarrierOption {
    fn maturity(&self) -> Time {
        self.exercise.last_time()
    }
}
