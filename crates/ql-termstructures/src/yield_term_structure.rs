//! `YieldTermStructure`: interest-rate term structures
//! (translates `ql/termstructures/yieldtermstructure.hpp`).
//!
//! Rates are continuously compounded throughout:
//!
//! * **discount factor**: `P(0,t)`
//! * **zero rate**: `-ln P(0,t) / t`
//! * **forward rate**: `ln(P(0,t₁) / P(0,t₂)) / (t₂ - t₁)`, or the
//!   instantaneous forward when `t₁ = t₂`

use crate::term_structure::TermStructure;
use ql_core::{DiscountFactor, Rate, Time};

/// Small time step used for instantaneous forward rate computations.
const DT: Time = 1.0e-4;

/// A yield (interest-rate) term structure.
///
/// Implementors must provide **exactly one** of the two low-level methods
/// [`discount_impl`](YieldTermStructure::discount_impl) or
/// [`zero_rate_impl`](YieldTermStructure::zero_rate_impl).
///
/// Corresponds to `QuantLib::YieldTermStructure`.
pub trait YieldTermStructure: TermStructure {
    /// Return the discount factor for a given time `t`.
    ///
    /// Default: computed from `zero_rate_impl`.
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        if t == 0.0 {
            return 1.0;
        }
        (-self.zero_rate_impl(t) * t).exp()
    }

    /// Return the continuously-compounded zero rate for time `t`.
    ///
    /// Default: computed from `discount_impl`.
    fn zero_rate_impl(&self, t: Time) -> Rate {
        if t == 0.0 {
            return self.forward_rate(0.0, DT);
        }
        -self.discount_impl(t).ln() / t
    }

    /// Discount factor `P(0, t)`.
    fn discount(&self, t: Time) -> DiscountFactor {
        self.discount_impl(t)
    }

    /// Continuously-compounded zero rate for maturity `t`.
    fn zero_rate(&self, t: Time) -> Rate {
        self.zero_rate_impl(t)
    }

    /// Continuously-compounded forward rate between `t1` and `t2`.
    ///
    /// For `t1 == t2` the instantaneous forward at `t1` is returned.
    fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        let (t1, t2) = if t2 == t1 {
            ((t1 - 0.5 * DT).max(0.0), (t1 - 0.5 * DT).max(0.0) + DT)
        } else {
            (t1, t2)
        };
        (self.discount_impl(t1) / self.discount_impl(t2)).ln() / (t2 - t1)
    }

    /// Instantaneous forward rate `f(0, t)`.
    fn instantaneous_forward(&self, t: Time) -> Rate {
        self.forward_rate(t, t)
    }
}
