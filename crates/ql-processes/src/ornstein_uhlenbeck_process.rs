//! Ornstein-Uhlenbeck mean-reverting process
//! (translates `ql/processes/ornsteinuhlenbeckprocess.hpp`).
//!
//! ```text
//! dX = a(b − X) dt + σ dW
//! ```
//!
//! where `a` is the speed of mean reversion, `b` is the long-run level,
//! and `σ` is the constant volatility.

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time, Versioned};

/// An Ornstein-Uhlenbeck mean-reverting process.
///
/// `dX = speed · (level − X) dt + volatility · dW`
///
/// Closed-form expectation and variance:
/// ```text
/// E[X(t+dt) | X(t)] = level + (X(t) − level) · exp(−speed · dt)
/// Var[X(t+dt) | X(t)] = σ² / (2·speed) · (1 − exp(−2·speed·dt))
/// ```
///
/// Corresponds to `QuantLib::OrnsteinUhlenbeckProcess`.
#[derive(Debug, Clone)]
pub struct OrnsteinUhlenbeckProcess {
    x0: Real,
    speed: Real,
    level: Real,
    volatility: Real,
}

impl OrnsteinUhlenbeckProcess {
    /// Create a new Ornstein-Uhlenbeck process.
    ///
    /// # Arguments
    /// * `speed`: mean-reversion speed `a` (must be ≥ 0)
    /// * `volatility`: diffusion coefficient `σ` (must be ≥ 0)
    /// * `x0`: initial value
    /// * `level`: long-run mean level `b`
    pub fn new(speed: Real, volatility: Real, x0: Real, level: Real) -> Result<Self> {
        ensure!(
            speed >= 0.0,
            "mean-reversion speed must be non-negative, got {speed}"
        );
        ensure!(
            volatility >= 0.0,
            "volatility must be non-negative, got {volatility}"
        );
        Ok(Self {
            x0,
            speed,
            level,
            volatility,
        })
    }

    /// Speed of mean reversion.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Long-run level.
    pub fn level(&self) -> Real {
        self.level
    }

    /// Volatility.
    pub fn volatility(&self) -> Real {
        self.volatility
    }
}

impl Versioned for OrnsteinUhlenbeckProcess {}

impl StochasticProcess1D for OrnsteinUhlenbeckProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.level - x)
    }

    fn diffusion(&self, _t: Time, _x: Real) -> Real {
        self.volatility
    }

    fn expectation(&self, _t: Time, x: Real, dt: Time) -> Real {
        self.level + (x - self.level) * (-self.speed * dt).exp()
    }

    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance(t, x, dt).sqrt()
    }

    fn variance(&self, _t: Time, _x: Real, dt: Time) -> Real {
        if self.speed < 1e-15 {
            // no mean reversion: Brownian motion
            self.volatility * self.volatility * dt
        } else {
            self.volatility * self.volatility * (1.0 - (-2.0 * self.speed * dt).exp())
                / (2.0 * self.speed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ou_drift() {
        let p = OrnsteinUhlenbeckProcess::new(2.0, 0.3, 0.5, 1.0).unwrap();
        assert_abs_diff_eq!(p.x0(), 0.5, epsilon = 1e-15);
        // drift = speed * (level - x) = 2 * (1.0 - 0.5) = 1.0
        assert_abs_diff_eq!(p.drift(0.0, 0.5), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.diffusion(0.0, 100.0), 0.3, epsilon = 1e-15);
    }

    #[test]
    fn ou_expectation_mean_reversion() {
        let p = OrnsteinUhlenbeckProcess::new(1.0, 0.2, 0.5, 0.0).unwrap();
        let e = p.expectation(0.0, 0.5, 1.0);
        assert_abs_diff_eq!(e, 0.5 * (-1.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn ou_variance_formula() {
        let (speed, sigma, dt) = (2.0, 0.3, 0.5);
        let p = OrnsteinUhlenbeckProcess::new(speed, sigma, 0.5, 0.0).unwrap();
        let expected = sigma * sigma * (1.0 - (-2.0 * speed * dt).exp()) / (2.0 * speed);
        assert_abs_diff_eq!(p.variance(0.0, 0.5, dt), expected, epsilon = 1e-15);
        let std = p.std_deviation(0.0, 0.0, dt);
        assert_abs_diff_eq!(std * std, expected, epsilon = 1e-14);
    }

    #[test]
    fn ou_zero_speed_degenerates_to_brownian() {
        let sigma = 0.3;
        let p = OrnsteinUhlenbeckProcess::new(0.0, sigma, 1.0, 0.0).unwrap();
        let dt = 0.25;
        assert_abs_diff_eq!(p.expectation(0.0, 1.0, dt), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.variance(0.0, 1.0, dt), sigma * sigma * dt, epsilon = 1e-15);
    }

    #[test]
    fn ou_rejects_negative_volatility() {
        assert!(OrnsteinUhlenbeckProcess::new(1.0, -0.1, 0.0, 0.0).is_err());
    }
}
