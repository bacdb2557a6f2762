//! `LocalVolTermStructure`: local-volatility term structures
//! (translates `ql/termstructures/volatility/equityfx/localvoltermstructure.hpp`).
//!
//! Provides the `LocalVolTermStructure` trait and `LocalConstantVol`.

use crate::term_structure::TermStructure;
use ql_core::{Real, Time, Versioned, Volatility};

/// A local volatility surface `σ(t, S)`.
///
/// Corresponds to `QuantLib::LocalVolTermStructure`.
pub trait LocalVolTermStructure: TermStructure {
    /// Local volatility at time `t` and underlying level `underlying`.
    fn local_vol(&self, t: Time, underlying: Real) -> Volatility;
}

/// A flat local volatility.
///
/// Corresponds to `QuantLib::LocalConstantVol`.
#[derive(Debug, Clone)]
pub struct LocalConstantVol {
    volatility: Volatility,
}

impl LocalConstantVol {
    /// A surface returning `volatility` everywhere.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }
}

impl Versioned for LocalConstantVol {}

impl TermStructure for LocalConstantVol {}

impl LocalVolTermStructure for LocalConstantVol {
    fn local_vol(&self, _t: Time, _underlying: Real) -> Volatility {
        self.volatility
    }
}
