use super::{checked_locations, Fdm1dMesher};
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::integrals::{GaussLobattoIntegral, Integrator};
use statrs::function::gamma::{gamma_lr, ln_gamma};
use std::cell::RefCell;

/// Jump-axis mesher for an exponential jump process with mean reversion.
///
/// The jump component `dY = −β Y dt + J dN` with exponentially distributed
/// jump sizes (rate `η`) and intensity `λ` has a gamma stationary
/// distribution; the grid is spread by the exponential quantiles up to
/// `1 − eps`, scaled by `1 / (1 − exp(−β/λ))`.
///
/// Corresponds to `QuantLib::ExponentialJump1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialJump1dMesher {
    locations: Vec<Real>,
    beta: Real,
    jump_intensity: Real,
    eta: Real,
}

impl ExponentialJump1dMesher {
    /// # Errors
    /// Fewer than two steps, `eps` outside `(0, 1)`, or non-positive
    /// parameters.
    pub fn new(steps: usize, beta: Real, jump_intensity: Real, eta: Real, eps: Real) -> Result<Self> {
        ensure!(eps > 0.0 && eps < 1.0, "eps must lie in (0, 1), got {eps}");
        ensure!(steps > 1, "minimum number of steps is two");
        ensure!(
            beta > 0.0 && jump_intensity > 0.0 && eta > 0.0,
            "beta, jump intensity and eta must be positive"
        );

        let end = 1.0 - eps;
        let dx = end / (steps - 1) as Real;
        let scale = 1.0 / (1.0 - (-beta / jump_intensity).exp());
        let locations = (0..steps)
            .map(|i| {
                let p = i as Real * dx;
                scale * (-1.0 / eta * (1.0 - p).ln())
            })
            .collect();

        Ok(Self {
            locations: checked_locations(locations)?,
            beta,
            jump_intensity,
            eta,
        })
    }

    /// Stationary density of the jump component: gamma with shape `λ/β`
    /// and rate `η`.
    pub fn jump_size_density(&self, x: Real) -> Real {
        let a = self.jump_intensity / self.beta;
        let b = self.eta;
        (a * b.ln() + (a - 1.0) * x.ln() - b * x - ln_gamma(a)).exp()
    }

    /// Density of the jump component at time `t`, conditional on at least
    /// one jump.
    ///
    /// # Errors
    /// Requires `λ < β`, `x > 0` and `t > 0`.
    pub fn jump_size_density_at(&self, x: Real, t: Time) -> Result<Real> {
        let a = 1.0 - self.jump_intensity / self.beta;
        ensure!(a > 0.0, "time dependent density needs jump intensity below beta");
        ensure!(x > 0.0 && t > 0.0, "density needs positive x and t");

        let norm = 1.0 - (-self.jump_intensity * t).exp();
        let gamma_value = ln_gamma(a).exp();
        let lower = gamma_lr(a, x * self.eta * (self.beta * t).exp()) - gamma_lr(a, x * self.eta);
        Ok(self.jump_intensity * gamma_value / norm * lower
            * self.eta.powf(self.jump_intensity / self.beta)
            / (self.beta * x.powf(a)))
    }

    /// Stationary distribution function of the jump component.
    pub fn jump_size_distribution(&self, x: Real) -> Result<Real> {
        let x_min = x.min(1.0e-100);
        GaussLobattoIntegral::new(1e-12, 1_000_000)
            .integrate(|u| self.jump_size_density(u), x_min, x.max(x_min))
    }

    /// Distribution function of the jump component at time `t`.
    pub fn jump_size_distribution_at(&self, x: Real, t: Time) -> Result<Real> {
        ensure!(x > 0.0, "distribution needs positive x, got {x}");
        let x_min = x.min(Real::EPSILON);
        let failure = RefCell::new(None);
        let value = GaussLobattoIntegral::new(1e-12, 1_000_000).integrate(
            |u| {
                self.jump_size_density_at(u, t).unwrap_or_else(|e| {
                    failure.borrow_mut().get_or_insert(e);
                    0.0
                })
            },
            x_min,
            x.max(x_min),
        )?;
        match failure.into_inner() {
            Some(e) => Err(e),
            None => Ok(value),
        }
    }
}

impl Fdm1dMesher for ExponentialJump1dMesher {
    fn locations(&self) -> &[Real] {
        &self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn grid_starts_at_zero_and_grows_with_eps() {
        let m = ExponentialJump1dMesher::new(20, 1.0, 2.0, 5.0, 1e-3).unwrap();
        assert_eq!(m.locations()[0], 0.0);
        let scale = 1.0 / (1.0 - (-0.5f64).exp());
        assert_abs_diff_eq!(m.locations()[19], scale * 1000f64.ln() / 5.0, epsilon = 1e-10);
    }

    #[test]
    fn stationary_distribution_matches_gamma_cdf() {
        let m = ExponentialJump1dMesher::new(10, 1.0, 2.0, 5.0, 1e-3).unwrap();
        for x in [0.1, 0.4, 1.0] {
            let expected = gamma_lr(2.0, 5.0 * x);
            assert_abs_diff_eq!(m.jump_size_distribution(x).unwrap(), expected, epsilon = 1e-8);
        }
    }

    #[test]
    fn time_dependent_density_is_positive() {
        let m = ExponentialJump1dMesher::new(10, 2.0, 1.0, 4.0, 1e-3).unwrap();
        for x in [0.05, 0.2, 0.5] {
            let d = m.jump_size_density_at(x, 0.5).unwrap();
            assert!(d.is_finite() && d > 0.0);
        }
        assert!(ExponentialJump1dMesher::new(10, 1.0, 2.0, 4.0, 1e-3)
            .unwrap()
            .jump_size_density_at(0.1, 0.5)
            .is_err());
    }
}
