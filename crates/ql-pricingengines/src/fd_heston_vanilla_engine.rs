//! Finite-difference engine for vanilla options under Heston.
//!
//! Translates `ql/pricingengines/vanilla/fdhestonvanillaengine.hpp`.

use crate::fd_setup::{composite, maturity, spot_results, STRIKE_DENSITY};
use ql_core::{errors::Result, Real, Size, Time};
use ql_instruments::{dividends_before, Dividend, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::meshers::{
    BlackScholesMesherConfig, Fdm1dMesher, FdmBlackScholesMesher, FdmHestonVarianceMesher,
};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmHestonSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::FdmStepConditionComposite;
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use ql_processes::HestonProcess;
use std::sync::Arc;
use tracing::debug;

/// Key of the mean-variance delta in [`PricingResults::additional_results`].
pub const MEAN_VARIANCE_DELTA: &str = "mean_variance_delta";
/// Key of the mean-variance gamma in [`PricingResults::additional_results`].
pub const MEAN_VARIANCE_GAMMA: &str = "mean_variance_gamma";

/// `(ln S, v)` axes for a Heston process: a variance mesher from the
/// averaged variance quantiles and a log-spot mesher sized with the
/// resulting volatility estimate.
pub(crate) fn heston_axes(
    process: &HestonProcess,
    maturity: Time,
    strike: Real,
    dividends: &[Dividend],
    t_grid: Size,
    x_grid: Size,
    v_grid: Size,
) -> Result<Vec<Arc<dyn Fdm1dMesher>>> {
    let t_avg_steps = (t_grid / 50).max(5);
    let variance = FdmHestonVarianceMesher::new(v_grid, process, maturity, t_avg_steps)?;
    let helper = FdmBlackScholesMesher::process_helper(
        process.spot()?,
        Arc::clone(process.risk_free_rate()),
        Arc::clone(process.dividend_yield()),
        variance.vola_estimate(),
    );
    let config = BlackScholesMesherConfig {
        c_point: Some((strike, STRIKE_DENSITY)),
        dividends: dividends.to_vec(),
        ..BlackScholesMesherConfig::default()
    };
    let equity: Arc<dyn Fdm1dMesher> =
        Arc::new(FdmBlackScholesMesher::with_config(x_grid, &helper, maturity, strike, &config)?);
    Ok(vec![equity, Arc::new(variance)])
}

/// European, American and Bermudan options under Heston, with optional
/// cash dividends.
///
/// Defaults: 100 time steps, 100 spot points, 50 variance points, no
/// damping, Hundsdorfer scheme. The mean-variance delta and gamma are
/// reported as additional results.
///
/// Corresponds to `QuantLib::FdHestonVanillaEngine`.
#[derive(Debug, Clone)]
pub struct FdHestonVanillaEngine {
    process: Arc<HestonProcess>,
    dividends: Vec<Dividend>,
    t_grid: Size,
    x_grid: Size,
    v_grid: Size,
    damping_steps: Size,
    scheme_desc: FdmSchemeDesc,
}

impl FdHestonVanillaEngine {
    /// Engine with the default grid.
    pub fn new(process: Arc<HestonProcess>) -> Self {
        Self {
            process,
            dividends: Vec::new(),
            t_grid: 100,
            x_grid: 100,
            v_grid: 50,
            damping_steps: 0,
            scheme_desc: FdmSchemeDesc::hundsdorfer(),
        }
    }

    /// Number of time steps, spot points and variance points.
    pub fn with_grid(mut self, t_grid: Size, x_grid: Size, v_grid: Size) -> Self {
        self.t_grid = t_grid;
        self.x_grid = x_grid;
        self.v_grid = v_grid;
        self
    }

    /// Implicit Euler steps run before the scheme.
    pub fn with_damping_steps(mut self, damping_steps: Size) -> Self {
        self.damping_steps = damping_steps;
        self
    }

    /// The time-stepping scheme.
    pub fn with_scheme(mut self, scheme_desc: FdmSchemeDesc) -> Self {
        self.scheme_desc = scheme_desc;
        self
    }

    /// Cash dividends paid by the underlying.
    pub fn with_dividends(mut self, dividends: Vec<Dividend>) -> Self {
        self.dividends = dividends;
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for FdHestonVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = maturity(&args.exercise)?;
        let strike = args.payoff.strike();
        let dividends = dividends_before(&self.dividends, maturity);

        let mesher = composite(heston_axes(
            &self.process,
            maturity,
            strike,
            &dividends,
            self.t_grid,
            self.x_grid,
            self.v_grid,
        )?)?;
        let calculator: Arc<dyn FdmInnerValueCalculator> = Arc::new(FdmLogInnerValue::new(
            Arc::clone(&args.payoff).into_payoff(),
            Arc::clone(&mesher),
            0,
        ));
        let conditions = FdmStepConditionComposite::vanilla_composite(
            &dividends,
            &args.exercise,
            Arc::clone(&calculator),
            Arc::clone(&mesher),
            0,
        )?;
        debug!(
            t_grid = self.t_grid,
            x_grid = self.x_grid,
            v_grid = self.v_grid,
            scheme = %self.scheme_desc.scheme_type,
            "assembled Heston rollback"
        );

        let desc = FdmSolverDesc {
            mesher,
            bc_set: Vec::new(),
            condition: Arc::new(conditions),
            calculator,
            maturity,
            time_steps: self.t_grid,
            damping_steps: self.damping_steps,
        };
        let solver = FdmHestonSolver::new(Arc::clone(&self.process), desc, self.scheme_desc);
        let (spot, v0) = (self.process.spot()?, self.process.v0());

        Ok(spot_results(
            solver.value_at(spot, v0)?,
            solver.delta_at(spot, v0)?,
            solver.gamma_at(spot, v0)?,
            solver.theta_at(spot, v0),
        )
        .with_result(MEAN_VARIANCE_DELTA, solver.mean_variance_delta_at(spot, v0)?)
        .with_result(MEAN_VARIANCE_GAMMA, solver.mean_variance_gamma_at(spot, v0)?))
    }
}
