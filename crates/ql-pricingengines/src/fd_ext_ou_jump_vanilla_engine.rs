//! Finite-difference engine for vanilla options on an exponential
//! Ornstein-Uhlenbeck process with jumps.
//!
//! Translates `ql/experimental/finitedifferences/fdextoujumpvanillaengine.hpp`.

use crate::fd_setup::maturity;
use ql_core::{errors::Result, Size};
use ql_instruments::{PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::meshers::{
    ExponentialJump1dMesher, Fdm1dMesher, FdmMesher, FdmMesherComposite, FdmSimpleProcess1dMesher,
};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmExtOUJumpSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::FdmStepConditionComposite;
use ql_methods::finite_differences::utilities::{FdmExtOUJumpModelInnerValue, FdmInnerValueCalculator};
use ql_processes::ExtOUWithJumpsProcess;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;
use tracing::debug;

/// Tail probability cut off by the jump mesher.
const JUMP_MESHER_EPS: f64 = 1e-3;

/// Options on `S = exp(x + y)`, with `x` an extended OU diffusion and `y`
/// a mean-reverting jump component, on an `(x, y)` grid.
///
/// The jump integral uses Gauss-Laguerre quadrature of
/// `integration_order` points. Only the value and theta are reported;
/// spot greeks have no meaning in `(x, y)` coordinates.
///
/// Defaults: 50 time steps, 200 `x` points, 50 `y` points, no damping,
/// Hundsdorfer scheme, order 32.
#[derive(Debug, Clone)]
pub struct FdExtOUJumpVanillaEngine {
    process: Arc<ExtOUWithJumpsProcess>,
    r_ts: Arc<dyn YieldTermStructure>,
    t_grid: Size,
    x_grid: Size,
    y_grid: Size,
    damping_steps: Size,
    scheme_desc: FdmSchemeDesc,
    integration_order: Size,
}

impl FdExtOUJumpVanillaEngine {
    /// Engine discounting on `r_ts`.
    pub fn new(process: Arc<ExtOUWithJumpsProcess>, r_ts: Arc<dyn YieldTermStructure>) -> Self {
        Self {
            process,
            r_ts,
            t_grid: 50,
            x_grid: 200,
            y_grid: 50,
            damping_steps: 0,
            scheme_desc: FdmSchemeDesc::hundsdorfer(),
            integration_order: 32,
        }
    }

    /// Number of time steps, diffusion points and jump points.
    pub fn with_grid(mut self, t_grid: Size, x_grid: Size, y_grid: Size) -> Self {
        self.t_grid = t_grid;
        self.x_grid = x_grid;
        self.y_grid = y_grid;
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

    /// Number of Gauss-Laguerre points of the jump integral.
    pub fn with_integration_order(mut self, order: Size) -> Self {
        self.integration_order = order;
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for FdExtOUJumpVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = maturity(&args.exercise)?;

        let x: Arc<dyn Fdm1dMesher> = Arc::new(FdmSimpleProcess1dMesher::new(
            self.x_grid,
            self.process.ext_ou_process().as_ref(),
            maturity,
        )?);
        let y: Arc<dyn Fdm1dMesher> = Arc::new(ExponentialJump1dMesher::new(
            self.y_grid,
            self.process.beta(),
            self.process.jump_intensity(),
            self.process.eta(),
            JUMP_MESHER_EPS,
        )?);
        let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::new(vec![x, y])?);

        let calculator: Arc<dyn FdmInnerValueCalculator> = Arc::new(FdmExtOUJumpModelInnerValue::new(
            Arc::clone(&args.payoff).into_payoff(),
            Arc::clone(&mesher),
        ));
        let conditions = FdmStepConditionComposite::vanilla_composite(
            &[],
            &args.exercise,
            Arc::clone(&calculator),
            Arc::clone(&mesher),
            0,
        )?;
        debug!(
            t_grid = self.t_grid,
            x_grid = self.x_grid,
            y_grid = self.y_grid,
            order = self.integration_order,
            "assembled OU jump rollback"
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
        let solver = FdmExtOUJumpSolver::new(
            Arc::clone(&self.process),
            Arc::clone(&self.r_ts),
            desc,
            self.scheme_desc,
            self.integration_order,
        );
        let [x0, y0] = self.process.initial_values();
        let results = PricingResults::from_value(solver.value_at(x0, y0)?);
        Ok(match solver.theta_at(x0, y0) {
            Ok(theta) => results.with_theta(theta),
            Err(_) => results,
        })
    }
}
