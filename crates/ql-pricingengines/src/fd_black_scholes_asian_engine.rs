//! Finite-difference engine for discretely monitored arithmetic Asian
//! options under Black-Scholes.
//!
//! Translates `ql/pricingengines/asian/fdblackscholesasianengine.hpp`.

use crate::fd_setup::{composite, equity_mesher, maturity};
use ql_core::{
    ensure,
    errors::{Error, Result},
    Real, Size,
};
use ql_instruments::{AsianOptionArguments, AverageType, ExerciseType, PricingEngine, PricingResults};
use ql_methods::finite_differences::meshers::{Fdm1dMesher, Uniform1dMesher};
use ql_methods::finite_differences::operators::FdmBlackScholesOp;
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{Fdm2DimSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::{
    FdmArithmeticAverageCondition, FdmStepConditionComposite, StepCondition,
};
use ql_methods::finite_differences::utilities::{FdmAverageInnerValue, FdmInnerValueCalculator};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;
use tracing::debug;

/// European arithmetic-average options on a `(ln S, A)` grid.
///
/// The payoff is read off the average axis; at each fixing the average is
/// updated by [`FdmArithmeticAverageCondition`]. The value is taken at the
/// current spot and running average.
///
/// Defaults: 100 time steps, 100 spot points, 50 average points, Douglas
/// scheme.
///
/// Corresponds to `QuantLib::FdBlackScholesAsianEngine`.
#[derive(Debug, Clone)]
pub struct FdBlackScholesAsianEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    t_grid: Size,
    x_grid: Size,
    a_grid: Size,
    scheme_desc: FdmSchemeDesc,
}

impl FdBlackScholesAsianEngine {
    /// Engine with the default grid.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            process,
            t_grid: 100,
            x_grid: 100,
            a_grid: 50,
            scheme_desc: FdmSchemeDesc::douglas(),
        }
    }

    /// Number of time steps, spot points and average points.
    pub fn with_grid(mut self, t_grid: Size, x_grid: Size, a_grid: Size) -> Self {
        self.t_grid = t_grid;
        self.x_grid = x_grid;
        self.a_grid = a_grid;
        self
    }

    /// The time-stepping scheme.
    pub fn with_scheme(mut self, scheme_desc: FdmSchemeDesc) -> Self {
        self.scheme_desc = scheme_desc;
        self
    }
}

impl PricingEngine<AsianOptionArguments> for FdBlackScholesAsianEngine {
    fn calculate(&self, args: &AsianOptionArguments) -> Result<PricingResults> {
        if args.average_type != AverageType::Arithmetic {
            return Err(Error::UnsupportedCondition(
                "only arithmetic averaging is supported".into(),
            ));
        }
        if args.exercise.exercise_type() != ExerciseType::European {
            return Err(Error::UnsupportedCondition(
                "only European Asian options are supported".into(),
            ));
        }
        let maturity = maturity(&args.exercise)?;
        let strike = args.payoff.strike();
        let spot = self.process.s0()?;
        let fixing_times: Vec<Real> = args
            .fixing_times
            .iter()
            .copied()
            .filter(|&t| t >= 0.0 && t <= maturity)
            .collect();
        ensure!(
            args.past_fixings + fixing_times.len() > 0,
            "an Asian option needs at least one fixing"
        );
        let average = if args.past_fixings > 0 {
            args.running_accumulator / args.past_fixings as Real
        } else {
            spot
        };

        let x_mesher = equity_mesher(self.x_grid, &self.process, maturity, strike, &[], (None, None))?;
        let x = x_mesher.locations();
        let (x_min, x_max) = (x[0], x[x.len() - 1]);
        let a_mesher: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(
            x_min.exp().min(average),
            x_max.exp().max(average),
            self.a_grid,
        )?);
        let mesher = composite(vec![x_mesher, a_mesher])?;

        let calculator: Arc<dyn FdmInnerValueCalculator> = Arc::new(FdmAverageInnerValue::new(
            Arc::clone(&args.payoff).into_payoff(),
            Arc::clone(&mesher),
            1,
        ));
        let conditions: Vec<Arc<dyn StepCondition>> = vec![Arc::new(FdmArithmeticAverageCondition::new(
            fixing_times,
            args.past_fixings,
            Arc::clone(&mesher),
            0,
            1,
        )?)];
        debug!(
            t_grid = self.t_grid,
            x_grid = self.x_grid,
            a_grid = self.a_grid,
            past_fixings = args.past_fixings,
            "assembled Black-Scholes Asian rollback"
        );

        let desc = FdmSolverDesc {
            mesher: Arc::clone(&mesher),
            bc_set: Vec::new(),
            condition: Arc::new(FdmStepConditionComposite::new(conditions)?),
            calculator,
            maturity,
            time_steps: self.t_grid,
            damping_steps: 0,
        };
        let op = FdmBlackScholesOp::new(mesher, &self.process, strike, false, 0)?;
        let solver = Fdm2DimSolver::new(desc, self.scheme_desc, Box::new(op))?;

        let ln_spot = spot.ln();
        let value = solver.interpolate_at(ln_spot, average)?;
        let delta = solver.derivative_x(ln_spot, average)? / spot;
        Ok(PricingResults::from_value(value).with_delta(delta))
    }
}
