//! Ornstein-Uhlenbeck process with a time-dependent level
//! (translates `ql/experimental/processes/extendedornsteinuhlenbeckprocess.hpp`).
//!
//! ```text
//! dX = a(b(t) − X) dt + σ dW
//! ```
//!
//! The conditional mean is `x₀e^{−a dt} + a ∫ₜ^{t+dt} e^{−a(t+dt−s)} b(s) ds`;
//! the integral is approximated according to [`Discretization`].

use crate::ornstein_uhlenbeck_process::OrnsteinUhlenbeckProcess;
use crate::stochastic_process::StochasticProcess1D;
use ql_core::{errors::Result, Real, Time, Versioned};
use ql_math::integrals::{GaussLobattoIntegral, Integrator};
use std::fmt;
use std::sync::Arc;

/// The time-dependent mean-reversion level `b(t)`.
pub type LevelFn = Arc<dyn Fn(Time) -> Real + Send + Sync>;

/// How the level integral in the conditional mean is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discretization {
    /// `b(t + dt/2)·(1 − e^{−a dt})`.
    MidPoint,
    /// Trapezoidal rule on the integrand.
    Trapezodial,
    /// Adaptive Gauss-Lobatto quadrature.
    GaussLobatto,
}

/// Extended Ornstein-Uhlenbeck process.
///
/// Corresponds to `QuantLib::ExtendedOrnsteinUhlenbeckProcess`.
#[derive(Clone)]
pub struct ExtendedOrnsteinUhlenbeckProcess {
    speed: Real,
    sigma: Real,
    b: LevelFn,
    discretization: Discretization,
    integration_eps: Real,
    ou: OrnsteinUhlenbeckProcess,
}

impl ExtendedOrnsteinUhlenbeckProcess {
    /// Create the process with mid-point discretization.
    ///
    /// # Errors
    /// Negative speed or volatility.
    pub fn new(speed: Real, sigma: Real, x0: Real, b: LevelFn) -> Result<Self> {
        Ok(Self {
            speed,
            sigma,
            b,
            discretization: Discretization::MidPoint,
            integration_eps: 1e-4,
            ou: OrnsteinUhlenbeckProcess::new(speed, sigma, x0, 0.0)?,
        })
    }

    /// Choose the discretization of the level integral.
    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = discretization;
        self
    }

    /// Absolute accuracy of the Gauss-Lobatto discretization.
    pub fn with_integration_eps(mut self, eps: Real) -> Self {
        self.integration_eps = eps;
        self
    }

    /// Mean-reversion speed.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Volatility.
    pub fn volatility(&self) -> Real {
        self.sigma
    }

    /// Level `b(t)`.
    pub fn level(&self, t: Time) -> Real {
        (self.b)(t)
    }

    fn level_integral(&self, t: Time, dt: Time) -> Result<Real> {
        let a = self.speed;
        let u = t + dt;
        let d = (-a * dt).exp();
        Ok(match self.discretization {
            Discretization::MidPoint => self.level(t + 0.5 * dt) * (1.0 - d),
            Discretization::Trapezodial => 0.5 * a * dt * (self.level(u) + d * self.level(t)),
            Discretization::GaussLobatto => {
                let integrand = |s: Real| a * (-a * (u - s)).exp() * self.level(s);
                GaussLobattoIntegral::new(self.integration_eps, 100_000).integrate(integrand, t, u)?
            }
        })
    }
}

impl fmt::Debug for ExtendedOrnsteinUhlenbeckProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedOrnsteinUhlenbeckProcess")
            .field("speed", &self.speed)
            .field("sigma", &self.sigma)
            .field("x0", &self.ou.x0())
            .field("discretization", &self.discretization)
            .finish_non_exhaustive()
    }
}

impl Versioned for ExtendedOrnsteinUhlenbeckProcess {}

impl StochasticProcess1D for ExtendedOrnsteinUhlenbeckProcess {
    fn x0(&self) -> Real {
        self.ou.x0()
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        self.speed * (self.level(t) - x)
    }

    fn diffusion(&self, _t: Time, _x: Real) -> Real {
        self.sigma
    }

    /// Returns NaN when the Gauss-Lobatto budget is exhausted; meshers
    /// reject non-finite coordinates.
    fn expectation(&self, t: Time, x0: Real, dt: Time) -> Real {
        self.ou.expectation(t, x0, dt) + self.level_integral(t, dt).unwrap_or(Real::NAN)
    }

    fn std_deviation(&self, t: Time, x0: Real, dt: Time) -> Real {
        self.ou.std_deviation(t, x0, dt)
    }

    fn variance(&self, t: Time, x0: Real, dt: Time) -> Real {
        self.ou.variance(t, x0, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn seasonal() -> LevelFn {
        Arc::new(|t: Time| 3.0 + 0.5 * (2.0 * std::f64::consts::PI * t).sin())
    }

    #[test]
    fn constant_level_matches_plain_ou() {
        let ext = ExtendedOrnsteinUhlenbeckProcess::new(1.5, 0.3, 2.0, Arc::new(|_: Time| 3.0)).unwrap();
        let ou = OrnsteinUhlenbeckProcess::new(1.5, 0.3, 2.0, 3.0).unwrap();
        for d in [
            Discretization::MidPoint,
            Discretization::Trapezodial,
            Discretization::GaussLobatto,
        ] {
            let p = ext.clone().with_discretization(d);
            let tol = match d {
                Discretization::MidPoint => 1e-12,
                Discretization::Trapezodial => 1e-2,
                Discretization::GaussLobatto => 1e-6,
            };
            assert_abs_diff_eq!(p.expectation(0.0, 2.0, 0.1), ou.expectation(0.0, 2.0, 0.1), epsilon = tol);
        }
        assert_abs_diff_eq!(ext.variance(0.0, 2.0, 0.5), ou.variance(0.0, 2.0, 0.5), epsilon = 1e-15);
    }

    #[test]
    fn discretizations_agree_on_short_steps() {
        let base = ExtendedOrnsteinUhlenbeckProcess::new(4.0, 0.2, 3.1, seasonal()).unwrap();
        let exact = base
            .clone()
            .with_discretization(Discretization::GaussLobatto)
            .with_integration_eps(1e-10)
            .expectation(0.3, 3.1, 0.01);
        let mid = base.expectation(0.3, 3.1, 0.01);
        assert_abs_diff_eq!(mid, exact, epsilon = 1e-5);
    }

    #[test]
    fn drift_uses_level() {
        let p = ExtendedOrnsteinUhlenbeckProcess::new(2.0, 0.2, 0.0, seasonal()).unwrap();
        assert_abs_diff_eq!(p.drift(0.25, 1.0), 2.0 * (3.5 - 1.0), epsilon = 1e-12);
    }
}
