//! Square-root (CIR) process (translates `ql/processes/squarerootprocess.hpp`).
//!
//! ```text
//! dX = a(b − X) dt + σ √X dW
//! ```
//!
//! This is the Cox-Ingersoll-Ross process, driving the short rate of the
//! CIR finite-difference operator.

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time, Versioned};

/// A square-root (CIR) process.
///
/// `dX = speed · (mean − X) dt + volatility · √X · dW`
///
/// The conditional mean and variance are the exact ones:
/// ```text
/// E[X(t+dt)]   = b + (x − b)·e^{−a dt}
/// Var[X(t+dt)] = x σ²/a (e^{−a dt} − e^{−2a dt}) + b σ²/(2a) (1 − e^{−a dt})²
/// ```
///
/// Corresponds to `QuantLib::SquareRootProcess`.
#[derive(Debug, Clone)]
pub struct SquareRootProcess {
    x0: Real,
    speed: Real,
    mean: Real,
    volatility: Real,
}

impl SquareRootProcess {
    /// Create a new square-root (CIR) process.
    ///
    /// # Arguments
    /// * `speed`: mean-reversion speed `a`
    /// * `mean`: long-run level `b`
    /// * `volatility`: volatility `σ`
    /// * `x0`: initial value (must be ≥ 0)
    pub fn new(speed: Real, mean: Real, volatility: Real, x0: Real) -> Result<Self> {
        ensure!(x0 >= 0.0, "initial value must be non-negative, got {x0}");
        ensure!(speed >= 0.0, "mean-reversion speed must be non-negative, got {speed}");
        ensure!(volatility >= 0.0, "volatility must be non-negative, got {volatility}");
        Ok(Self {
            x0,
            speed,
            mean,
            volatility,
        })
    }

    /// Mean-reversion speed.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Long-run mean level.
    pub fn mean(&self) -> Real {
        self.mean
    }

    /// Volatility.
    pub fn volatility(&self) -> Real {
        self.volatility
    }
}

impl Versioned for SquareRootProcess {}

impl StochasticProcess1D for SquareRootProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.mean - x)
    }

    fn diffusion(&self, _t: Time, x: Real) -> Real {
        self.volatility * x.max(0.0).sqrt()
    }

    fn expectation(&self, _t0: Time, x0: Real, dt: Time) -> Real {
        self.mean + (x0 - self.mean) * (-self.speed * dt).exp()
    }

    fn std_deviation(&self, t0: Time, x0: Real, dt: Time) -> Real {
        self.variance(t0, x0, dt).max(0.0).sqrt()
    }

    fn variance(&self, _t0: Time, x0: Real, dt: Time) -> Real {
        let (a, b, s2) = (self.speed, self.mean, self.volatility * self.volatility);
        if a < 1e-12 {
            return s2 * x0.max(0.0) * dt;
        }
        let e = (-a * dt).exp();
        x0.max(0.0) * s2 / a * (e - e * e) + b * s2 / (2.0 * a) * (1.0 - e) * (1.0 - e)
    }
}
