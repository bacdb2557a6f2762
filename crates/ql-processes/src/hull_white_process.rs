//! Hull-White (extended Vasicek) one-factor short-rate process
//! (translates `ql/processes/hullwhiteprocess.hpp`).
//!
//! The Hull-White model is:
//!
//! ```text
//! dr = (θ(t) − a·r) dt + σ dW
//! ```
//!
//! with `θ(t)` chosen to fit the initial yield curve. Writing
//! `r(t) = x(t) + φ(t)`, the factor `x` is a zero-level Ornstein-Uhlenbeck
//! process and
//!
//! ```text
//! φ(t) = f(0,t) + σ²/(2a²) · (1 − e^{−at})²
//! ```
//!
//! The state variable of this process is `r`.

use crate::ornstein_uhlenbeck_process::OrnsteinUhlenbeckProcess;
use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time, Versioned};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Hull-White one-factor short-rate process.
///
/// Corresponds to `QuantLib::HullWhiteProcess`.
#[derive(Debug, Clone)]
pub struct HullWhiteProcess {
    a: Real,
    sigma: Real,
    yield_curve: Arc<dyn YieldTermStructure>,
    ou: OrnsteinUhlenbeckProcess,
}

impl HullWhiteProcess {
    /// Create a new Hull-White process.
    ///
    /// # Arguments
    /// * `yield_curve`: the initial yield curve (for θ(t) calibration)
    /// * `a`: mean-reversion speed (must be positive)
    /// * `sigma`: short-rate volatility
    pub fn new(yield_curve: Arc<dyn YieldTermStructure>, a: Real, sigma: Real) -> Result<Self> {
        ensure!(a > 0.0, "mean-reversion speed must be positive, got {a}");
        let ou = OrnsteinUhlenbeckProcess::new(a, sigma, 0.0, 0.0)?;
        Ok(Self {
            a,
            sigma,
            yield_curve,
            ou,
        })
    }

    /// Mean-reversion speed.
    pub fn a(&self) -> Real {
        self.a
    }

    /// Short-rate volatility.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// The fitted term structure.
    pub fn term_structure(&self) -> &Arc<dyn YieldTermStructure> {
        &self.yield_curve
    }

    /// The deterministic shift `φ(t)` with `r = x + φ`.
    pub fn alpha(&self, t: Time) -> Real {
        let alfa = self.sigma / self.a * (1.0 - (-self.a * t).exp());
        self.yield_curve.instantaneous_forward(t) + 0.5 * alfa * alfa
    }
}

impl Versioned for HullWhiteProcess {
    fn version(&self) -> u64 {
        self.yield_curve.version()
    }
}

impl StochasticProcess1D for HullWhiteProcess {
    fn x0(&self) -> Real {
        self.yield_curve.instantaneous_forward(0.0)
    }

    fn drift(&self, t: Time, r: Real) -> Real {
        let dt = 1e-4;
        let dalpha = (self.alpha(t + dt) - self.alpha((t - dt).max(0.0))) / (t + dt - (t - dt).max(0.0));
        dalpha + self.a * (self.alpha(t) - r)
    }

    fn diffusion(&self, _t: Time, _r: Real) -> Real {
        self.sigma
    }

    /// `E[r(t+dt) | r(t)] = (r(t) − φ(t))·e^{−a dt} + φ(t+dt)`
    fn expectation(&self, t: Time, r: Real, dt: Time) -> Real {
        self.ou.expectation(t, r - self.alpha(t), dt) + self.alpha(t + dt)
    }

    fn std_deviation(&self, t: Time, r: Real, dt: Time) -> Real {
        self.ou.std_deviation(t, r, dt)
    }

    fn variance(&self, t: Time, r: Real, dt: Time) -> Real {
        self.ou.variance(t, r, dt)
    }
}
