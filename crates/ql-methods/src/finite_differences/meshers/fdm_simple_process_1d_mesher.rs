use super::{checked_locations, Fdm1dMesher};
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::normal_cdf_inverse;
use ql_processes::StochasticProcess1D;

/// Mesher from the normal quantiles of a one-dimensional process.
///
/// For each of `t_avg_steps` horizons the process is evolved from `x0`
/// with the quantiles of probabilities spread evenly over
/// `[epsilon, 1 − epsilon]`; the locations are the average over horizons.
/// The end points always include `x0` and `mandatory_point`.
///
/// Corresponds to `QuantLib::FdmSimpleProcess1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmSimpleProcess1dMesher {
    locations: Vec<Real>,
}

impl FdmSimpleProcess1dMesher {
    /// Mesher with ten averaging steps and `epsilon = 1e-4`.
    pub fn new(size: usize, process: &dyn StochasticProcess1D, maturity: Time) -> Result<Self> {
        Self::with_params(size, process, maturity, 10, 0.0001, None)
    }

    /// # Errors
    /// Fewer than two points, a non-positive maturity, `epsilon` outside
    /// `(0, 0.5)`, or [`ql_core::Error::InvalidGrid`] for a degenerate
    /// process.
    pub fn with_params(
        size: usize,
        process: &dyn StochasticProcess1D,
        maturity: Time,
        t_avg_steps: usize,
        epsilon: Real,
        mandatory_point: Option<Real>,
    ) -> Result<Self> {
        ensure!(size >= 2, "at least two points required, got {size}");
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        ensure!(t_avg_steps > 0, "at least one averaging step required");
        ensure!(epsilon > 0.0 && epsilon < 0.5, "epsilon must lie in (0, 0.5)");

        let x0 = process.x0();
        let mp = mandatory_point.unwrap_or(x0);
        let mut locations = vec![0.0; size];
        let dp = (1.0 - 2.0 * epsilon) / (size - 1) as Real;

        for l in 1..=t_avg_steps {
            let t = maturity * l as Real / t_avg_steps as Real;
            let q_min = mp
                .min(x0)
                .min(process.evolve(0.0, x0, t, normal_cdf_inverse(epsilon)));
            let q_max = mp
                .max(x0)
                .max(process.evolve(0.0, x0, t, normal_cdf_inverse(1.0 - epsilon)));

            locations[0] += q_min;
            let mut p = epsilon;
            for loc in locations.iter_mut().take(size - 1).skip(1) {
                p += dp;
                *loc += process.evolve(0.0, x0, t, normal_cdf_inverse(p));
            }
            locations[size - 1] += q_max;
        }
        for loc in &mut locations {
            *loc /= t_avg_steps as Real;
        }

        Ok(Self {
            locations: checked_locations(locations)?,
        })
    }
}

impl Fdm1dMesher for FdmSimpleProcess1dMesher {
    fn locations(&self) -> &[Real] {
        &self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_processes::OrnsteinUhlenbeckProcess;

    #[test]
    fn ornstein_uhlenbeck_grid_is_symmetric_around_the_level() {
        let process = OrnsteinUhlenbeckProcess::new(1.0, 0.1, 0.0, 0.0).unwrap();
        let m = FdmSimpleProcess1dMesher::new(11, &process, 1.0).unwrap();
        let x = m.locations();
        for i in 0..11 {
            assert_abs_diff_eq!(x[i], -x[10 - i], epsilon = 1e-8);
        }
        assert_abs_diff_eq!(x[5], 0.0, epsilon = 1e-8);
    }

    #[test]
    fn mandatory_point_widens_the_grid() {
        let process = OrnsteinUhlenbeckProcess::new(1.0, 0.1, 0.0, 0.0).unwrap();
        let m = FdmSimpleProcess1dMesher::with_params(11, &process, 1.0, 10, 1e-4, Some(2.0)).unwrap();
        assert_abs_diff_eq!(m.locations()[10], 2.0, epsilon = 1e-14);
    }
}
