//! Finite-difference engine for vanilla options under Bates.
//!
//! Translates `ql/pricingengines/vanilla/fdbatesvanillaengine.hpp`.

use crate::fd_heston_vanilla_engine::heston_axes;
use crate::fd_setup::{composite, maturity, spot_results};
use ql_core::{errors::Result, Size};
use ql_instruments::{dividends_before, Dividend, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmBatesSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::FdmStepConditionComposite;
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use ql_processes::BatesProcess;
use std::sync::Arc;
use tracing::debug;

/// Heston stochastic volatility with lognormal jumps in the spot, on the
/// same grid as [`crate::FdHestonVanillaEngine`].
///
/// Defaults: 100 time steps, 100 spot points, 50 variance points, no
/// damping, Hundsdorfer scheme.
#[derive(Debug, Clone)]
pub struct FdBatesVanillaEngine {
    process: Arc<BatesProcess>,
    dividends: Vec<Dividend>,
    t_grid: Size,
    x_grid: Size,
    v_grid: Size,
    damping_steps: Size,
    scheme_desc: FdmSchemeDesc,
}

impl FdBatesVanillaEngine {
    /// Engine with the default grid.
    pub fn new(process: Arc<BatesProcess>) -> Self {
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

impl PricingEngine<VanillaOptionArguments> for FdBatesVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = maturity(&args.exercise)?;
        let strike = args.payoff.strike();
        let dividends = dividends_before(&self.dividends, maturity);
        let heston = self.process.heston();

        let mesher = composite(heston_axes(
            heston,
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
            lambda = self.process.lambda(),
            t_grid = self.t_grid,
            x_grid = self.x_grid,
            v_grid = self.v_grid,
            "assembled Bates rollback"
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
        let solver = FdmBatesSolver::new(Arc::clone(&self.process), desc, self.scheme_desc);
        let (spot, v0) = (heston.spot()?, heston.v0());
        Ok(spot_results(
            solver.value_at(spot, v0)?,
            solver.delta_at(spot, v0)?,
            solver.gamma_at(spot, v0)?,
            solver.theta_at(spot, v0),
        ))
    }
}
