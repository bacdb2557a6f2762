//! Backward solvers and solver façades
//! (translates `ql/methods/finitedifferences/solvers/`).
//!
//! [`FiniteDifferenceModel`] steps a scheme through time, hitting every
//! stopping time exactly. [`FdmBackwardSolver`] adds damping steps and
//! scheme selection. The dimension façades ([`Fdm1DimSolver`],
//! [`Fdm2DimSolver`], [`Fdm3DimSolver`]) run the rollback lazily and
//! interpolate the result; the model façades build their operator from a
//! process and rebuild when the process version changes.

mod fdm_1d_solver;
mod fdm_2d_solver;
mod fdm_3d_solver;
mod fdm_backward_solver;
mod fdm_bates_solver;
mod fdm_black_scholes_solver;
mod fdm_cir_solver;
mod fdm_ext_ou_jump_solver;
mod fdm_heston_hull_white_solver;
mod fdm_heston_solver;
mod fdm_solver_desc;
mod finite_difference_model;

pub use fdm_1d_solver::Fdm1DimSolver;
pub use fdm_2d_solver::Fdm2DimSolver;
pub use fdm_3d_solver::Fdm3DimSolver;
pub use fdm_backward_solver::FdmBackwardSolver;
pub use fdm_bates_solver::FdmBatesSolver;
pub use fdm_black_scholes_solver::FdmBlackScholesSolver;
pub use fdm_cir_solver::FdmCirSolver;
pub use fdm_ext_ou_jump_solver::FdmExtOUJumpSolver;
pub use fdm_heston_hull_white_solver::FdmHestonHullWhiteSolver;
pub use fdm_heston_solver::FdmHestonSolver;
pub use fdm_solver_desc::FdmSolverDesc;
pub use finite_difference_model::FiniteDifferenceModel;

use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use crate::finite_differences::step_conditions::{FdmSnapshotCondition, FdmStepConditionComposite};
use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_math::Array;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// The state shared by the dimension façades: the operator, the terminal
/// values and the step conditions joined with the theta snapshot.
#[derive(Debug)]
pub(crate) struct RollbackSetup {
    desc: FdmSolverDesc,
    scheme_desc: FdmSchemeDesc,
    op: Mutex<Box<dyn FdmLinearOpComposite>>,
    theta_condition: Arc<FdmSnapshotCondition>,
    conditions: Arc<FdmStepConditionComposite>,
    initial_values: Array,
}

/// The rolled-back values and the snapshot taken for theta.
#[derive(Debug, Clone)]
pub(crate) struct RolledBack {
    pub values: Array,
    pub theta_values: Option<Array>,
}

impl RollbackSetup {
    pub(crate) fn new(
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        let layout = desc.mesher.layout();
        if op.size() > layout.dim().len() {
            return Err(Error::DimensionMismatch {
                expected: layout.dim().len(),
                found: op.size(),
            });
        }
        let first_stop = desc
            .condition
            .stopping_times()
            .iter()
            .copied()
            .find(|&t| t > 0.0)
            .unwrap_or(desc.maturity);
        let theta_time = 0.99 * (1.0_f64 / 365.0).min(first_stop).min(desc.maturity);
        let theta_condition = Arc::new(FdmSnapshotCondition::new(theta_time));
        let conditions = Arc::new(FdmStepConditionComposite::join_conditions(
            Arc::clone(&theta_condition),
            &desc.condition,
        )?);

        let mut initial_values = Array::zeros(layout.size());
        for iter in layout.iter() {
            initial_values[iter.index()] = desc.calculator.avg_inner_value(&iter, desc.maturity);
        }

        Ok(Self {
            desc,
            scheme_desc,
            op: Mutex::new(op),
            theta_condition,
            conditions,
            initial_values,
        })
    }

    pub(crate) fn desc(&self) -> &FdmSolverDesc {
        &self.desc
    }

    pub(crate) fn theta_time(&self) -> Time {
        self.theta_condition.time()
    }

    pub(crate) fn rollback(&self) -> Result<RolledBack> {
        let mut op = self
            .op
            .lock()
            .map_err(|_| Error::Runtime("operator lock poisoned".into()))?;
        let mut values = self.initial_values.clone();
        debug!(
            grid = ?self.desc.mesher.layout().dim(),
            scheme = %self.scheme_desc.scheme_type,
            maturity = self.desc.maturity,
            time_steps = self.desc.time_steps,
            damping_steps = self.desc.damping_steps,
            "rollback start"
        );
        FdmBackwardSolver::new(self.desc.bc_set.clone(), Arc::clone(&self.conditions), self.scheme_desc)
            .rollback(
                &mut **op,
                &mut values,
                self.desc.maturity,
                0.0,
                self.desc.time_steps,
                self.desc.damping_steps,
            )?;
        debug!(min = values.min(), max = values.max(), "rollback finished");
        Ok(RolledBack {
            values,
            theta_values: self.theta_condition.values(),
        })
    }
}

/// `(snapshot − value) / t`, the theta convention of the façades.
pub(crate) fn theta_from_snapshot(snapshot: Option<Real>, value: Real, t: Time) -> Result<Real> {
    match snapshot {
        Some(s) if t > 0.0 => Ok((s - value) / t),
        _ => Err(Error::Runtime("stopping time at zero: can't calculate theta".into())),
    }
}

/// Sorted unique grid locations along `axis`.
pub(crate) fn axis_locations(mesher: &dyn crate::finite_differences::meshers::FdmMesher, axis: usize) -> Vec<Real> {
    let layout = mesher.layout();
    let mut xs = vec![0.0; layout.dim()[axis]];
    for iter in layout.iter() {
        xs[iter.coordinates()[axis]] = mesher.location(&iter, axis);
    }
    xs
}
