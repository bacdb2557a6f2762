//! `InterpolatedZeroCurve`: a yield term structure defined by zero rates
//! at pillar times (translates `ql/termstructures/yield/zerocurve.hpp`).
//!
//! Zero rates are interpolated linearly in time, extrapolated flat beyond
//! the last pillar, and discount factors are `P(t) = exp(-z(t) t)`.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{errors::Result, Rate, Time, Versioned};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};

/// A yield curve defined by continuously-compounded zero rates at known times.
///
/// Corresponds to `QuantLib::InterpolatedZeroCurve<Linear>`.
#[derive(Debug, Clone)]
pub struct InterpolatedZeroCurve {
    times: Vec<Time>,
    rates: Vec<Rate>,
    interp: LinearInterpolation,
}

impl InterpolatedZeroCurve {
    /// Build a zero-rate curve from pillar times and zero rates.
    ///
    /// # Errors
    /// Fewer than two pillars, a negative first time, or non-increasing times.
    pub fn new(times: &[Time], rates: &[Rate]) -> Result<Self> {
        ql_core::ensure!(
            times.first().map_or(false, |t| *t >= 0.0),
            "pillar times must start at or after zero"
        );
        let interp = LinearInterpolation::new(times, rates)?;
        Ok(Self {
            times: times.to_vec(),
            rates: rates.to_vec(),
            interp,
        })
    }

    /// Return the pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Return the pillar zero rates.
    pub fn rates(&self) -> &[Rate] {
        &self.rates
    }
}

impl Versioned for InterpolatedZeroCurve {}

impl TermStructure for InterpolatedZeroCurve {}

impl YieldTermStructure for InterpolatedZeroCurve {
    fn zero_rate_impl(&self, t: Time) -> Rate {
        let first = self.times[0];
        let last = self.times[self.times.len() - 1];
        if t <= first {
            self.rates[0]
        } else if t >= last {
            self.rates[self.rates.len() - 1]
        } else {
            self.interp.operator(t)
        }
    }
}
