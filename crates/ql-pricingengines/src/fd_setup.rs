//! Assembly steps shared by the finite-difference engines.

use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::{Dividend, Exercise, PricingResults};
use ql_methods::finite_differences::meshers::{
    BlackScholesMesherConfig, Fdm1dMesher, FdmBlackScholesMesher, FdmMesher, FdmMesherComposite,
};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;
use tracing::warn;

/// Density of the log-spot mesher around the strike.
pub(crate) const STRIKE_DENSITY: Real = 0.1;

/// The last exercise time, which must lie in the future.
pub(crate) fn maturity(exercise: &Exercise) -> Result<Time> {
    let maturity = exercise.last_time();
    ensure!(maturity > 0.0, "option expired at {maturity}");
    Ok(maturity)
}

/// Log-spot axis concentrated at the strike, with optional fixed bounds in
/// spot units.
pub(crate) fn equity_mesher(
    x_grid: usize,
    process: &GeneralizedBlackScholesProcess,
    maturity: Time,
    strike: Real,
    dividends: &[Dividend],
    bounds: (Option<Real>, Option<Real>),
) -> Result<Arc<dyn Fdm1dMesher>> {
    let config = BlackScholesMesherConfig {
        x_min_constraint: bounds.0.map(Real::ln),
        x_max_constraint: bounds.1.map(Real::ln),
        c_point: Some((strike, STRIKE_DENSITY)),
        dividends: dividends.to_vec(),
        ..BlackScholesMesherConfig::default()
    };
    Ok(Arc::new(FdmBlackScholesMesher::with_config(
        x_grid, process, maturity, strike, &config,
    )?))
}

pub(crate) fn composite(meshers: Vec<Arc<dyn Fdm1dMesher>>) -> Result<Arc<dyn FdmMesher>> {
    Ok(Arc::new(FdmMesherComposite::new(meshers)?))
}

/// Value and spot greeks; theta is left out, with a warning, where the
/// rollback cannot provide it.
pub(crate) fn spot_results(value: Real, delta: Real, gamma: Real, theta: Result<Real>) -> PricingResults {
    let results = PricingResults::from_value(value).with_delta_gamma(delta, gamma);
    match theta {
        Ok(theta) => results.with_theta(theta),
        Err(e) => {
            warn!(error = %e, "theta unavailable, reporting value and spot greeks only");
            results
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_core::errors::Error;

    #[test]
    fn missing_theta_keeps_the_other_results() {
        let results = spot_results(
            4.0,
            0.5,
            0.02,
            Err(Error::Precondition("no snapshot after t = 0".into())),
        );
        assert_eq!(results.value, 4.0);
        assert_eq!(results.delta, Some(0.5));
        assert_eq!(results.gamma, Some(0.02));
        assert_eq!(results.theta, None);
        assert_eq!(spot_results(4.0, 0.5, 0.02, Ok(-1.5)).theta, Some(-1.5));
    }

    #[test]
    fn expired_exercise_is_rejected() {
        assert!(maturity(&Exercise::european(1.0).unwrap()).is_ok());
        assert!(matches!(maturity(&Exercise::european(0.0).unwrap()), Err(Error::Precondition(_))));
    }
}
