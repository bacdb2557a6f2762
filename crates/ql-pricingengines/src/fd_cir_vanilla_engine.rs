//! Finite-difference engine for vanilla options with a CIR short rate.
//!
//! Translates `ql/pricingengines/vanilla/fdcirvanillaengine.hpp`.

use crate::fd_setup::{composite, equity_mesher, maturity, spot_results};
use ql_core::{ensure, errors::Result, Real, Size};
use ql_instruments::{dividends_before, Dividend, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::meshers::{Fdm1dMesher, FdmSimpleProcess1dMesher};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmCirSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::FdmStepConditionComposite;
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use ql_processes::{GeneralizedBlackScholesProcess, SquareRootProcess, StochasticProcess1D};
use std::sync::Arc;
use tracing::debug;

/// Black-Scholes equity whose discount rate follows a correlated CIR
/// process, on a `(ln S, r)` grid. The value is read at the current spot
/// and the CIR starting rate.
///
/// Defaults: 100 time steps, 100 spot points, 50 rate points, no damping,
/// modified Hundsdorfer scheme.
#[derive(Debug, Clone)]
pub struct FdCirVanillaEngine {
    bs_process: Arc<GeneralizedBlackScholesProcess>,
    cir_process: Arc<SquareRootProcess>,
    rho: Real,
    dividends: Vec<Dividend>,
    t_grid: Size,
    x_grid: Size,
    r_grid: Size,
    damping_steps: Size,
    scheme_desc: FdmSchemeDesc,
}

impl FdCirVanillaEngine {
    /// Engine with the default grid.
    ///
    /// # Errors
    /// `rho` outside `[-1, 1]`.
    pub fn new(
        bs_process: Arc<GeneralizedBlackScholesProcess>,
        cir_process: Arc<SquareRootProcess>,
        rho: Real,
    ) -> Result<Self> {
        ensure!((-1.0..=1.0).contains(&rho), "correlation {rho} outside [-1, 1]");
        Ok(Self {
            bs_process,
            cir_process,
            rho,
            dividends: Vec::new(),
            t_grid: 100,
            x_grid: 100,
            r_grid: 50,
            damping_steps: 0,
            scheme_desc: FdmSchemeDesc::modified_hundsdorfer(),
        })
    }

    /// Number of time steps, spot points and rate points.
    pub fn with_grid(mut self, t_grid: Size, x_grid: Size, r_grid: Size) -> Self {
        self.t_grid = t_grid;
        self.x_grid = x_grid;
        self.r_grid = r_grid;
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

impl PricingEngine<VanillaOptionArguments> for FdCirVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = maturity(&args.exercise)?;
        let strike = args.payoff.strike();
        let dividends = dividends_before(&self.dividends, maturity);

        let equity = equity_mesher(self.x_grid, &self.bs_process, maturity, strike, &dividends, (None, None))?;
        let rate: Arc<dyn Fdm1dMesher> = Arc::new(FdmSimpleProcess1dMesher::new(
            self.r_grid,
            self.cir_process.as_ref(),
            maturity,
        )?);
        let mesher = composite(vec![equity, rate])?;

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
            rho = self.rho,
            t_grid = self.t_grid,
            x_grid = self.x_grid,
            r_grid = self.r_grid,
            "assembled CIR equity rollback"
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
        let solver = FdmCirSolver::new(
            Arc::clone(&self.bs_process),
            Arc::clone(&self.cir_process),
            self.rho,
            strike,
            desc,
            self.scheme_desc,
        );
        let (spot, r0) = (self.bs_process.s0()?, self.cir_process.x0());
        Ok(spot_results(
            solver.value_at(spot, r0)?,
            solver.delta_at(spot, r0)?,
            solver.gamma_at(spot, r0)?,
            solver.theta_at(spot, r0),
        ))
    }
}
