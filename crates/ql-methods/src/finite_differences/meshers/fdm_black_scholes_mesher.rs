use super::{checked_locations, Concentrating1dMesher, Fdm1dMesher, Uniform1dMesher};
use ql_core::{ensure, errors::Error, errors::Result, Real, Time, Volatility};
use ql_instruments::Dividend;
use ql_math::normal_cdf_inverse;
use ql_processes::GeneralizedBlackScholesProcess;
use ql_quotes::SimpleQuote;
use ql_termstructures::{BlackConstantVol, YieldTermStructure};
use std::sync::Arc;

/// Options of [`FdmBlackScholesMesher`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlackScholesMesherConfig {
    /// Fixed lower bound in log-spot.
    pub x_min_constraint: Option<Real>,
    /// Fixed upper bound in log-spot.
    pub x_max_constraint: Option<Real>,
    /// Tail probability cut off on each side.
    pub eps: Real,
    /// Widening applied to the quantile bounds.
    pub scale_factor: Real,
    /// Concentration `(spot level, density)`.
    pub c_point: Option<(Real, Real)>,
    /// Cash dividends shifting the forward.
    pub dividends: Vec<Dividend>,
}

impl Default for BlackScholesMesherConfig {
    fn default() -> Self {
        Self {
            x_min_constraint: None,
            x_max_constraint: None,
            eps: 0.0001,
            scale_factor: 1.5,
            c_point: None,
            dividends: Vec::new(),
        }
    }
}

/// Log-spot mesher for Black-Scholes type processes.
///
/// The bounds are the lowest and highest forward reached up to maturity
/// (cash dividends lower the forward at their payment times), widened by
/// `scale_factor` standard deviations at the `1 − eps` normal quantile.
///
/// Corresponds to `QuantLib::FdmBlackScholesMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmBlackScholesMesher {
    locations: Vec<Real>,
}

impl FdmBlackScholesMesher {
    /// Mesher with default options.
    pub fn new(
        size: usize,
        process: &GeneralizedBlackScholesProcess,
        maturity: Time,
        strike: Real,
    ) -> Result<Self> {
        Self::with_config(size, process, maturity, strike, &BlackScholesMesherConfig::default())
    }

    /// # Errors
    /// A non-positive spot, a non-positive forward after dividends, or
    /// [`Error::InvalidGrid`] when the bounds collapse.
    pub fn with_config(
        size: usize,
        process: &GeneralizedBlackScholesProcess,
        maturity: Time,
        strike: Real,
        config: &BlackScholesMesherConfig,
    ) -> Result<Self> {
        let spot = process.s0()?;
        ensure!(spot > 0.0, "negative or null underlying given");
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        ensure!(config.eps > 0.0 && config.eps < 1.0, "eps must lie in (0, 1)");

        let mut steps: Vec<(Time, Real)> = config
            .dividends
            .iter()
            .filter(|d| d.time >= 0.0 && d.time <= maturity)
            .map(|d| (d.time, d.amount))
            .collect();
        let intermediate = ((24.0 * maturity) as usize).max(2);
        steps.extend((0..intermediate).map(|i| ((i + 1) as Real * maturity / intermediate as Real, 0.0)));
        steps.sort_by(|a, b| a.0.total_cmp(&b.0));

        let r_ts = process.risk_free_rate();
        let q_ts = process.dividend_yield();
        let mut last_time = 0.0;
        let mut fwd = spot;
        let (mut mi, mut ma) = (fwd, fwd);
        for (time, amount) in steps {
            fwd *= r_ts.discount(last_time) / r_ts.discount(time) * q_ts.discount(time)
                / q_ts.discount(last_time);
            mi = mi.min(fwd);
            ma = ma.max(fwd);
            fwd -= amount;
            mi = mi.min(fwd);
            ma = ma.max(fwd);
            last_time = time;
        }
        ensure!(mi > 0.0, "dividends drive the forward to {mi}");

        let norm_inv_eps = normal_cdf_inverse(1.0 - config.eps);
        let sigma_sqrt_t = process.black_volatility().black_vol(maturity, strike) * maturity.sqrt();

        let x_min = config
            .x_min_constraint
            .unwrap_or_else(|| mi.ln() - sigma_sqrt_t * norm_inv_eps * config.scale_factor);
        let x_max = config
            .x_max_constraint
            .unwrap_or_else(|| ma.ln() + sigma_sqrt_t * norm_inv_eps * config.scale_factor);
        if !(x_max > x_min) {
            return Err(Error::InvalidGrid(format!("empty log-spot range [{x_min}, {x_max}]")));
        }

        let locations = match config.c_point {
            Some((c, density)) if c > 0.0 && c.ln() >= x_min && c.ln() <= x_max => {
                Concentrating1dMesher::new(x_min, x_max, size, Some((c.ln(), density)), false)?
                    .locations()
                    .to_vec()
            }
            _ => Uniform1dMesher::new(x_min, x_max, size)?.locations().to_vec(),
        };

        Ok(Self {
            locations: checked_locations(locations)?,
        })
    }

    /// A constant-volatility process used only to size a mesher.
    pub fn process_helper(
        s0: Real,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        vol: Volatility,
    ) -> GeneralizedBlackScholesProcess {
        GeneralizedBlackScholesProcess::new(
            Arc::new(SimpleQuote::new(s0)),
            dividend_yield,
            risk_free_rate,
            Arc::new(BlackConstantVol::new(vol)),
        )
    }
}

impl Fdm1dMesher for FdmBlackScholesMesher {
    fn locations(&self) -> &[Real] {
        &self.locations
    }
}
