//! `TermStructure`: base trait for all term structures
//! (translates `ql/termstructures/termstructure.hpp`).
//!
//! Curves here are parameterised directly by year fractions from the
//! valuation time `t = 0`; calendars and day counters live outside the
//! finite-difference layer.

use ql_core::{Time, Versioned};

/// Common interface of yield, volatility and local-volatility structures.
///
/// Corresponds to `QuantLib::TermStructure`.
pub trait TermStructure: Versioned + std::fmt::Debug + Send + Sync {
    /// The latest time for which the curve can return values.
    fn max_time(&self) -> Time {
        Time::MAX
    }

    /// `true` if `t` lies in `[0, max_time]`.
    fn is_in_range(&self, t: Time) -> bool {
        (0.0..=self.max_time()).contains(&t)
    }
}
