//! `StochasticProcess1D`: the one-factor process interface
//! (translates `ql/stochasticprocess.hpp`).
//!
//! A process `dX = μ(t,X) dt + σ(t,X) dW` is described by its drift (`μ`)
//! and diffusion (`σ`). Meshers only need the conditional mean and standard
//! deviation over a time step, which default to an Euler discretization and
//! are overridden where a closed form exists.

use ql_core::{Real, Time, Versioned};

/// A 1-dimensional stochastic process `dX = μ(t,X) dt + σ(t,X) dW`.
///
/// Corresponds to `QuantLib::StochasticProcess1D`.
pub trait StochasticProcess1D: Versioned + std::fmt::Debug + Send + Sync {
    /// Initial value `X(0)`.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion(&self, t: Time, x: Real) -> Real;

    /// `E[X(t0+dt) | X(t0) = x0]`.
    ///
    /// Default: `x0 + μ(t0, x0)·dt`.
    fn expectation(&self, t0: Time, x0: Real, dt: Time) -> Real {
        x0 + self.drift(t0, x0) * dt
    }

    /// Standard deviation of `X(t0+dt)` given `X(t0) = x0`.
    ///
    /// Default: `σ(t0, x0)·√dt`.
    fn std_deviation(&self, t0: Time, x0: Real, dt: Time) -> Real {
        self.diffusion(t0, x0) * dt.sqrt()
    }

    /// Variance of `X(t0+dt)` given `X(t0) = x0`.
    fn variance(&self, t0: Time, x0: Real, dt: Time) -> Real {
        let s = self.std_deviation(t0, x0, dt);
        s * s
    }

    /// One Euler step driven by the standard normal increment `dw`.
    fn evolve(&self, t0: Time, x0: Real, dt: Time, dw: Real) -> Real {
        self.expectation(t0, x0, dt) + self.std_deviation(t0, x0, dt) * dw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[derive(Debug)]
    struct Drifting;

    impl Versioned for Drifting {}

    impl StochasticProcess1D for Drifting {
        fn x0(&self) -> Real {
            1.0
        }
        fn drift(&self, _t: Time, _x: Real) -> Real {
            0.5
        }
        fn diffusion(&self, _t: Time, _x: Real) -> Real {
            0.2
        }
    }

    #[test]
    fn euler_defaults() {
        let p = Drifting;
        assert_abs_diff_eq!(p.expectation(0.0, 1.0, 0.5), 1.25, epsilon = 1e-15);
        assert_abs_diff_eq!(p.std_deviation(0.0, 1.0, 0.25), 0.1, epsilon = 1e-15);
        assert_abs_diff_eq!(p.variance(0.0, 1.0, 0.25), 0.01, epsilon = 1e-15);
        assert_abs_diff_eq!(p.evolve(0.0, 1.0, 0.25, 2.0), 1.325, epsilon = 1e-15);
    }
}
