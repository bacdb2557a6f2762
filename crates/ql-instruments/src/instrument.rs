//! `Instrument` base trait, pricing results and the engine interface.
//!
//! Translates `ql/instrument.hpp` and `ql/pricingengine.hpp`.
//!
//! Instruments hold their terms and hand a plain arguments struct to an
//! engine, which returns a fresh `PricingResults`. Nothing is cached on the
//! instrument; engines that cache do so against version stamps of their
//! market data.

use ql_core::{errors::Result, Real, Time};
use std::collections::HashMap;

/// Results of pricing an instrument.
///
/// Contains the value, the greeks an engine can provide, and optionally
/// additional named results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingResults {
    /// Present value.
    pub value: Real,
    /// First derivative with respect to the spot.
    pub delta: Option<Real>,
    /// Second derivative with respect to the spot.
    pub gamma: Option<Real>,
    /// Time decay, per year.
    pub theta: Option<Real>,
    /// Additional named results.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Create pricing results with just a value.
    pub fn from_value(value: Real) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Attach delta alone.
    pub fn with_delta(mut self, delta: Real) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Attach delta and gamma.
    pub fn with_delta_gamma(mut self, delta: Real, gamma: Real) -> Self {
        self.delta = Some(delta);
        self.gamma = Some(gamma);
        self
    }

    /// Attach theta.
    pub fn with_theta(mut self, theta: Real) -> Self {
        self.theta = Some(theta);
        self
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }
}

/// Base trait for all pricing engines.
///
/// A pricing engine computes `PricingResults` for a specific instrument type.
///
/// Corresponds to `QuantLib::PricingEngine`.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}

/// Base trait for all financial instruments.
///
/// Corresponds to `QuantLib::Instrument`.
pub trait Instrument: std::fmt::Debug + Send + Sync {
    /// The last relevant time.
    fn maturity(&self) -> Time;

    /// Whether the instrument is expired (maturity before the evaluation
    /// time zero).
    fn is_expired(&self) -> bool {
        self.maturity() < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_results_builder() {
        let r = PricingResults::from_value(42.0)
            .with_delta_gamma(0.55, 0.02)
            .with_theta(-3.0)
            .with_result("vega", 0.4);
        assert!((r.value - 42.0).abs() < 1e-15);
        assert_eq!(r.delta, Some(0.55));
        assert_eq!(r.gamma, Some(0.02));
        assert_eq!(r.theta, Some(-3.0));
        assert!((r.additional_results["vega"] - 0.4).abs() < 1e-15);
    }
}
