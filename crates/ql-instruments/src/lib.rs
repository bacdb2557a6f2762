//! # ql-instruments
//!
//! Option terms handed to the pricing engines: payoffs, time-based
//! exercise schedules, cash dividends, vanilla / barrier / Asian option
//! arguments and the engine interface.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod asian_option;
pub mod dividend;
pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;

pub use asian_option::{AsianOption, AsianOptionArguments, AverageType};
pub use dividend::{dividends_before, Dividend, DividendSchedule};
pub use exercise::{Exercise, ExerciseType};
pub use instrument::{Instrument, PricingEngine, PricingResults};
pub use option::{
    BarrierOption, BarrierOptionArguments, BarrierType, VanillaOption, VanillaOptionArguments,
};
pub use payoff::{CashOrNothingPayoff, OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};
