use super::{checked_locations, Fdm1dMesher};
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::distributions::NonCentralChiSquareDistribution;
use ql_math::integrals::{GaussLobattoIntegral, Integrator};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};
use ql_processes::HestonProcess;

/// Variance-axis mesher for the Heston model.
///
/// For `t_avg_steps` times up to maturity the variance is non-central
/// chi-square distributed; each time contributes `size` quantiles spread
/// evenly in probability, and the sorted union is averaged down to `size`
/// points. The node closest to `v0` is moved onto `v0`.
///
/// Corresponds to `QuantLib::FdmHestonVarianceMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmHestonVarianceMesher {
    locations: Vec<Real>,
    vola_estimate: Real,
}

impl FdmHestonVarianceMesher {
    /// Mesher with `epsilon = 1e-4` and no mixing.
    pub fn new(size: usize, process: &HestonProcess, maturity: Time, t_avg_steps: usize) -> Result<Self> {
        Self::with_params(size, process, maturity, t_avg_steps, 0.0001, 1.0)
    }

    /// # Errors
    /// Fewer than two points, a non-positive maturity, or a failure of the
    /// chi-square quantile search.
    pub fn with_params(
        size: usize,
        process: &HestonProcess,
        maturity: Time,
        t_avg_steps: usize,
        epsilon: Real,
        mixing_factor: Real,
    ) -> Result<Self> {
        ensure!(size >= 2, "at least two variance points required, got {size}");
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        ensure!(t_avg_steps > 0, "at least one averaging step required");

        let kappa = process.kappa();
        let theta = process.theta();
        let v0 = process.v0();
        let mixed_sigma = process.sigma() * mixing_factor;
        let sigma2 = mixed_sigma * mixed_sigma;
        let df = 4.0 * theta * kappa / sigma2;

        let mut grid: Vec<(Real, Real)> = Vec::with_capacity(size * t_avg_steps);
        for l in 1..=t_avg_steps {
            let t = maturity * l as Real / t_avg_steps as Real;
            let decay = (-kappa * t).exp();
            let ncp = 4.0 * kappa * decay / (sigma2 * (1.0 - decay)) * v0;
            let k = sigma2 * (1.0 - decay) / (4.0 * kappa);
            let dist = NonCentralChiSquareDistribution::new(df, ncp)?;

            let q_min = 0.0;
            let q_max = v0.max(k * dist.inverse_cdf(1.0 - epsilon)?);
            let min_v_step = (q_max - q_min) / (50 * size) as Real;

            let mut p = 0.0;
            let mut v_tmp = q_min;
            grid.push((q_min, epsilon));
            for i in 1..size {
                let ps = (1.0 - epsilon - p) / (size - i) as Real;
                p += ps;
                let tmp = k * dist.inverse_cdf(p)?;
                let vx = (v_tmp + min_v_step).max(tmp);
                p = dist.cdf(vx / k)?;
                v_tmp = vx;
                grid.push((vx, p));
            }
        }
        grid.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let mut v_grid = vec![0.0; size];
        let mut p_grid = vec![0.0; size];
        for i in 0..size {
            let b = i * grid.len() / size;
            let e = (i + 1) * grid.len() / size;
            let n = (e - b) as Real;
            for &(v, p) in &grid[b..e] {
                v_grid[i] += v / n;
                p_grid[i] += p / n;
            }
        }

        let skew_hint = if kappa != 0.0 { (mixed_sigma / kappa).max(1.0) } else { 1.0 };
        p_grid.sort_by(|a, b| a.total_cmp(b));
        let vola_estimate = Self::vola_estimate_from(&p_grid, &v_grid)? * skew_hint.powf(1.5);

        for i in 1..v_grid.len() {
            if v_grid[i - 1] <= v0 && v_grid[i] >= v0 {
                if (v_grid[i - 1] - v0).abs() < (v_grid[i] - v0).abs() {
                    v_grid[i - 1] = v0;
                } else {
                    v_grid[i] = v0;
                }
            }
        }

        Ok(Self {
            locations: checked_locations(v_grid)?,
            vola_estimate,
        })
    }

    /// Probability-weighted average volatility over the grid.
    pub fn vola_estimate(&self) -> Real {
        self.vola_estimate
    }

    fn vola_estimate_from(p_grid: &[Real], v_grid: &[Real]) -> Result<Real> {
        let (p_min, p_max) = (p_grid[0], p_grid[p_grid.len() - 1]);
        if p_max <= p_min {
            return Ok(v_grid[0].max(0.0).sqrt());
        }
        let interp = LinearInterpolation::new(p_grid, v_grid)?;
        GaussLobattoIntegral::new(1e-4, 100_000)
            .integrate(|p| interp.operator(p).max(0.0).sqrt(), p_min, p_max)
    }
}

impl Fdm1dMesher for FdmHestonVarianceMesher {
    fn locations(&self) -> &[Real] {
        &self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::test_support::heston_process;

    #[test]
    fn grid_starts_at_zero_and_contains_v0() {
        let process = heston_process(100.0, 0.04, 1.5, 0.04, 0.3, -0.7);
        let m = FdmHestonVarianceMesher::new(30, &process, 1.0, 10).unwrap();
        let v = m.locations();
        assert_eq!(v.len(), 30);
        assert!(v[0].abs() < 1e-12);
        assert!(v.iter().any(|&x| (x - 0.04).abs() < 1e-14));
        assert!(v[29] > 0.04);
    }

    #[test]
    fn vola_estimate_is_close_to_long_run_vol() {
        let process = heston_process(100.0, 0.04, 1.5, 0.04, 0.3, -0.7);
        let m = FdmHestonVarianceMesher::new(50, &process, 1.0, 10).unwrap();
        let est = m.vola_estimate();
        assert!(est > 0.1 && est < 0.3, "vola estimate {est}");
    }
}
