//! Finite-difference engine for single-barrier options under Black-Scholes.
//!
//! Translates `ql/pricingengines/barrier/fdblackscholesbarrierengine.hpp`.
//!
//! Knock-out options are rolled back directly: under continuous
//! monitoring the log-spot grid ends at the barrier, which carries a
//! Dirichlet condition paying the rebate; discretely monitored barriers
//! keep the full grid and reset the knocked-out region at each monitoring
//! time. Knock-in options follow from in-out parity,
//! `in = vanilla − out + (rebate paid at expiry if never knocked in)`.

use crate::fd_black_scholes_vanilla_engine::FdBlackScholesVanillaEngine;
use crate::fd_setup::{composite, equity_mesher, maturity};
use ql_core::{
    ensure,
    errors::{Error, Result},
    Real, Size, Time,
};
use ql_instruments::{
    dividends_before, BarrierOptionArguments, CashOrNothingPayoff, Dividend, ExerciseType,
    OptionType, Payoff, PricingEngine, PricingResults, VanillaOptionArguments,
};
use ql_methods::finite_differences::boundary_conditions::{FdmBoundaryConditionSet, FdmDirichletBoundary, Side};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmBlackScholesSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::{
    FdmDiscreteBarrierCondition, FdmStepConditionComposite, StepCondition,
};
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;
use tracing::debug;

/// Spot greeks of one rollback, combined linearly for in-out parity.
#[derive(Debug, Clone, Copy, Default)]
struct Greeks {
    value: Real,
    delta: Real,
    gamma: Real,
    theta: Option<Real>,
}

impl Greeks {
    fn from_results(r: &PricingResults) -> Self {
        Self {
            value: r.value,
            delta: r.delta.unwrap_or(0.0),
            gamma: r.gamma.unwrap_or(0.0),
            theta: r.theta,
        }
    }

    fn combine(self, other: Self, weight: Real) -> Self {
        Self {
            value: self.value + weight * other.value,
            delta: self.delta + weight * other.delta,
            gamma: self.gamma + weight * other.gamma,
            theta: self.theta.zip(other.theta).map(|(a, b)| a + weight * b),
        }
    }

    fn into_results(self) -> PricingResults {
        let results = PricingResults::from_value(self.value).with_delta_gamma(self.delta, self.gamma);
        match self.theta {
            Some(theta) => results.with_theta(theta),
            None => results,
        }
    }
}

/// European single-barrier options with continuous or discrete
/// monitoring.
///
/// Defaults: 100 time steps, 100 spot points, no damping, Douglas scheme.
///
/// Corresponds to `QuantLib::FdBlackScholesBarrierEngine`.
#[derive(Debug, Clone)]
pub struct FdBlackScholesBarrierEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    dividends: Vec<Dividend>,
    t_grid: Size,
    x_grid: Size,
    damping_steps: Size,
    scheme_desc: FdmSchemeDesc,
    local_vol: bool,
}

impl FdBlackScholesBarrierEngine {
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

    /// Knock-out value of `payoff` paying `rebate` when the barrier is hit.
    fn knock_out(
        &self,
        args: &BarrierOptionArguments,
        payoff: Arc<dyn Payoff>,
        rebate: Real,
        maturity: Time,
    ) -> Result<Greeks> {
        let strike = args.payoff.strike();
        let barrier_type = args.barrier_type.knock_out();
        let dividends = dividends_before(&self.dividends, maturity);
        let monitoring_times: Vec<Time> = args
            .monitoring_times
            .iter()
            .copied()
            .filter(|&t| t >= 0.0 && t <= maturity)
            .collect();
        let continuous = args.monitoring_times.is_empty();

        let bounds = match (continuous, barrier_type.is_down()) {
            (true, true) => (Some(args.barrier), None),
            (true, false) => (None, Some(args.barrier)),
            (false, _) => (None, None),
        };
        let mesher = composite(vec![equity_mesher(
            self.x_grid,
            &self.process,
            maturity,
            strike,
            &dividends,
            bounds,
        )?])?;
        let calculator: Arc<dyn FdmInnerValueCalculator> =
            Arc::new(FdmLogInnerValue::new(payoff, Arc::clone(&mesher), 0));

        let vanilla = FdmStepConditionComposite::vanilla_composite(
            &dividends,
            &args.exercise,
            Arc::clone(&calculator),
            Arc::clone(&mesher),
            0,
        )?;
        let mut conditions: Vec<Arc<dyn StepCondition>> = vanilla.conditions().to_vec();
        let mut bc_set: FdmBoundaryConditionSet = Vec::new();
        if continuous {
            let side = if barrier_type.is_down() { Side::Lower } else { Side::Upper };
            bc_set.push(Arc::new(FdmDirichletBoundary::new(mesher.as_ref(), rebate, 0, side)?));
        } else {
            conditions.push(Arc::new(FdmDiscreteBarrierCondition::new(
                Arc::clone(&mesher),
                barrier_type,
                args.barrier,
                rebate,
                monitoring_times,
                0,
            )));
        }
        debug!(
            barrier = args.barrier,
            continuous,
            t_grid = self.t_grid,
            x_grid = self.x_grid,
            "assembled Black-Scholes knock-out rollback"
        );

        let desc = FdmSolverDesc {
            mesher,
            bc_set,
            condition: Arc::new(FdmStepConditionComposite::new(conditions)?),
            calculator,
            maturity,
            time_steps: self.t_grid,
            damping_steps: self.damping_steps,
        };
        let solver =
            FdmBlackScholesSolver::new(Arc::clone(&self.process), strike, desc, self.scheme_desc, self.local_vol);
        let spot = self.process.s0()?;
        Ok(Greeks {
            value: solver.value_at(spot)?,
            delta: solver.delta_at(spot)?,
            gamma: solver.gamma_at(spot)?,
            theta: solver.theta_at(spot).ok(),
        })
    }

    fn vanilla(&self, args: &BarrierOptionArguments) -> Result<Greeks> {
        let engine = FdBlackScholesVanillaEngine::new(Arc::clone(&self.process))
            .with_grid(self.t_grid, self.x_grid)
            .with_damping_steps(self.damping_steps)
            .with_scheme(self.scheme_desc)
            .with_dividends(self.dividends.clone())
            .with_local_vol(self.local_vol);
        let results = engine.calculate(&VanillaOptionArguments {
            payoff: Arc::clone(&args.payoff),
            exercise: args.exercise.clone(),
        })?;
        Ok(Greeks::from_results(&results))
    }
}

impl PricingEngine<BarrierOptionArguments> for FdBlackScholesBarrierEngine {
    fn calculate(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::European {
            return Err(Error::UnsupportedCondition(
                "only European barrier options are supported".into(),
            ));
        }
        let maturity = maturity(&args.exercise)?;
        let spot = self.process.s0()?;
        ensure!(
            !args.barrier_type.triggered(spot, args.barrier),
            "barrier {} touched by spot {spot}",
            args.barrier
        );
        let payoff = Arc::clone(&args.payoff).into_payoff();

        if !args.barrier_type.is_knock_in() {
            return Ok(self.knock_out(args, payoff, args.rebate, maturity)?.into_results());
        }

        let mut greeks = self
            .vanilla(args)?
            .combine(self.knock_out(args, payoff, 0.0, maturity)?, -1.0);
        if args.rebate != 0.0 {
            let cash: Arc<dyn Payoff> = Arc::new(CashOrNothingPayoff::new(OptionType::Call, 0.0, args.rebate));
            greeks = greeks.combine(self.knock_out(args, cash, 0.0, maturity)?, 1.0);
        }
        Ok(greeks.into_results())
    }
}
