//! Finite-difference engine for vanilla options under Black-Scholes.
//!
//! Translates `ql/pricingengines/vanilla/fdblackscholesvanillaengine.hpp`.

use crate::fd_setup::{composite, equity_mesher, maturity, spot_results};
use ql_core::{errors::Result, Size};
use ql_instruments::{dividends_before, Dividend, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmBlackScholesSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::FdmStepConditionComposite;
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;
use tracing::debug;

/// European, American and Bermudan options on a log-spot grid, with
/// optional cash dividends and local volatility.
///
/// Defaults: 100 time steps, 100 spot points, no damping, Douglas scheme.
///
/// Corresponds to `QuantLib::FdBlackScholesVanillaEngine`.
#[derive(Debug, Clone)]
pub struct FdBlackScholesVanillaEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    dividends: Vec<Dividend>,
    t_grid: Size,
    x_grid: Size,
    damping_steps: Size,
    scheme_desc: FdmSchemeDesc,
    local_vol: bool,
}

impl FdBlackScholesVanillaEngine {
    /// Engine with the default grid.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            process,
            dividends: Vec::new(),
            t_grid: 100,
            x_grid: 100,
            damping_steps: 0,
            scheme_desc: FdmSchemeDesc::douglas(),
            local_vol: false,
        }
    }

    /// Number of time steps and spot points.
    pub fn with_grid(mut self, t_grid: Size, x_grid: Size) -> Self {
        self.t_grid = t_grid;
        self.x_grid = x_grid;
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

    /// Use the local volatility surface of the process.
    pub fn with_local_vol(mut self, local_vol: bool) -> Self {
        self.local_vol = local_vol;
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for FdBlackScholesVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = maturity(&args.exercise)?;
        let strike = args.payoff.strike();
        let dividends = dividends_before(&self.dividends, maturity);

        let mesher = composite(vec![equity_mesher(
            self.x_grid,
            &self.process,
            maturity,
            strike,
            &dividends,
            (None, None),
        )?])?;
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
            exercise = ?args.exercise.exercise_type(),
            dividends = dividends.len(),
            t_grid = self.t_grid,
            x_grid = self.x_grid,
            "assembled Black-Scholes vanilla rollback"
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
        let solver =
            FdmBlackScholesSolver::new(Arc::clone(&self.process), strike, desc, self.scheme_desc, self.local_vol);

        let spot = self.process.s0()?;
        Ok(spot_results(
            solver.value_at(spot)?,
            solver.delta_at(spot)?,
            solver.gamma_at(spot)?,
            solver.theta_at(spot),
        ))
    }
}
