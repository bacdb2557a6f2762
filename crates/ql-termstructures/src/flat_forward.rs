//! `FlatForward`: a yield term structure with a constant forward rate
//! (translates `ql/termstructures/yield/flatforward.hpp`).

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{DiscountFactor, Rate, Real, Time, Versioned};
use ql_quotes::Quote;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum FlatRate {
    Fixed(Rate),
    Quoted(Arc<dyn Quote>),
}

/// A flat (constant) forward-rate yield term structure.
///
/// Discount factors are `P(t) = exp(-r t)` with `r` continuously
/// compounded. When built on a quote, the curve follows it: its version is
/// the quote's version and an unset quote yields NaN discount factors.
///
/// Corresponds to `QuantLib::FlatForward`.
#[derive(Debug, Clone)]
pub struct FlatForward {
    rate: FlatRate,
}

impl FlatForward {
    /// A curve with constant continuously-compounded rate `rate`.
    pub fn new(rate: Rate) -> Self {
        Self {
            rate: FlatRate::Fixed(rate),
        }
    }

    /// A curve whose rate is read from `quote` at each query.
    pub fn with_quote(quote: Arc<dyn Quote>) -> Self {
        Self {
            rate: FlatRate::Quoted(quote),
        }
    }

    /// The current flat rate.
    pub fn rate(&self) -> Rate {
        match &self.rate {
            FlatRate::Fixed(r) => *r,
            FlatRate::Quoted(q) => q.value().unwrap_or(Real::NAN),
        }
    }
}

impl Versioned for FlatForward {
    fn version(&self) -> u64 {
        match &self.rate {
            FlatRate::Fixed(_) => 0,
            FlatRate::Quoted(q) => q.version(),
        }
    }
}

impl TermStructure for FlatForward {}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        (-self.rate() * t).exp()
    }

    fn zero_rate_impl(&self, _t: Time) -> Rate {
        self.rate()
    }

    fn forward_rate(&self, _t1: Time, _t2: Time) -> Rate {
        self.rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_quotes::SimpleQuote;

    #[test]
    fn flat_forward_discount() {
        let ff = FlatForward::new(0.05);
        assert_abs_diff_eq!(ff.discount(0.0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(ff.discount(2.0), (-0.1_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(ff.zero_rate(3.0), 0.05, epsilon = 1e-15);
        assert_abs_diff_eq!(ff.forward_rate(1.0, 2.0), 0.05, epsilon = 1e-15);
    }

    #[test]
    fn quoted_curve_tracks_quote() {
        let q = Arc::new(SimpleQuote::new(0.03));
        let ff = FlatForward::with_quote(q.clone());
        assert_eq!(ff.version(), 0);
        q.set_value(0.04);
        assert_eq!(ff.version(), 1);
        assert_abs_diff_eq!(ff.discount(1.0), (-0.04_f64).exp(), epsilon = 1e-15);
    }
}
