//! Finite-difference engine for vanilla options under Heston with a
//! Hull-White short rate.
//!
//! Translates `ql/pricingengines/vanilla/fdhestonhullwhitevanillaengine.hpp`.

use crate::fd_heston_vanilla_engine::heston_axes;
use crate::fd_setup::{composite, maturity, spot_results};
use ql_core::{ensure, errors::Result, Real, Size};
use ql_instruments::{dividends_before, Dividend, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::meshers::FdmSimpleProcess1dMesher;
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmHestonHullWhiteSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::FdmStepConditionComposite;
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use ql_processes::{HestonProcess, HullWhiteProcess, OrnsteinUhlenbeckProcess};
use std::sync::Arc;
use tracing::debug;

/// Relative spot bump of the finite-difference greeks.
const SPOT_BUMP: Real = 0.01;

/// Three-factor `(ln S, v, x)` rollback, with the short rate `x + α(t)`
/// following the Hull-White process and correlated with the equity.
///
/// Defaults: 50 time steps, 100 spot points, 40 variance points, 20 rate
/// points, no damping, Hundsdorfer scheme. Delta and gamma are central
/// differences in the spot.
#[derive(Debug, Clone)]
pub struct FdHestonHullWhiteVanillaEngine {
    heston: Arc<HestonProcess>,
    hull_white: Arc<HullWhiteProcess>,
    corr_equity_short_rate: Real,
    dividends: Vec<Dividend>,
    t_grid: Size,
    x_grid: Size,
    v_grid: Size,
    r_grid: Size,
    damping_steps: Size,
    scheme_desc: FdmSchemeDesc,
}

impl FdHestonHullWhiteVanillaEngine {
    /// Engine with the default grid.
    ///
    /// # Errors
    /// The equity, variance and rate correlations are inconsistent.
    pub fn new(
        heston: Arc<HestonProcess>,
        hull_white: Arc<HullWhiteProcess>,
        corr_equity_short_rate: Real,
    ) -> Result<Self> {
        let rho = heston.rho();
        ensure!(
            rho * rho + corr_equity_short_rate * corr_equity_short_rate <= 1.0,
            "correlation matrix has negative eigenvalues"
        );
        Ok(Self {
            heston,
            hull_white,
            corr_equity_short_rate,
            dividends: Vec::new(),
            t_grid: 50,
            x_grid: 100,
            v_grid: 40,
            r_grid: 20,
            damping_steps: 0,
            scheme_desc: FdmSchemeDesc::hundsdorfer(),
        })
    }

    /// Number of time steps, spot, variance and rate points.
    pub fn with_grid(mut self, t_grid: Size, x_grid: Size, v_grid: Size, r_grid: Size) -> Self {
        self.t_grid = t_grid;
        self.x_grid = x_grid;
        self.v_grid = v_grid;
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

impl PricingEngine<VanillaOptionArguments> for FdHestonHullWhiteVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = maturity(&args.exercise)?;
        let strike = args.payoff.strike();
        let dividends = dividends_before(&self.dividends, maturity);

        let mut axes = heston_axes(
            &self.heston,
            maturity,
            strike,
            &dividends,
            self.t_grid,
            self.x_grid,
            self.v_grid,
        )?;
        let short_rate = OrnsteinUhlenbeckProcess::new(self.hull_white.a(), self.hull_white.sigma(), 0.0, 0.0)?;
        axes.push(Arc::new(FdmSimpleProcess1dMesher::new(self.r_grid, &short_rate, maturity)?));
        let mesher = composite(axes)?;

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
            r_grid = self.r_grid,
            "assembled Heston-Hull-White rollback"
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
        let solver = FdmHestonHullWhiteSolver::new(
            Arc::clone(&self.heston),
            Arc::clone(&self.hull_white),
            self.corr_equity_short_rate,
            desc,
            self.scheme_desc,
        );
        let (spot, v0) = (self.heston.spot()?, self.heston.v0());
        let eps = spot * SPOT_BUMP;
        Ok(spot_results(
            solver.value_at(spot, v0, 0.0)?,
            solver.delta_at(spot, v0, 0.0, eps)?,
            solver.gamma_at(spot, v0, 0.0, eps)?,
            solver.theta_at(spot, v0, 0.0),
        ))
    }
}
