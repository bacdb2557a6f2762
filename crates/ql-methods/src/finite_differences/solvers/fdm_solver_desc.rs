use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::step_conditions::FdmStepConditionComposite;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::Time;
use std::sync::Arc;

/// Everything a solver façade needs besides the operator and the scheme.
///
/// Corresponds to `QuantLib::FdmSolverDesc`.
#[derive(Debug, Clone)]
pub struct FdmSolverDesc {
    /// The spatial grid.
    pub mesher: Arc<dyn FdmMesher>,
    /// Boundary conditions.
    pub bc_set: FdmBoundaryConditionSet,
    /// Step conditions applied during the rollback.
    pub condition: Arc<FdmStepConditionComposite>,
    /// Terminal values and exercise values.
    pub calculator: Arc<dyn FdmInnerValueCalculator>,
    /// Rollback start.
    pub maturity: Time,
    /// Number of scheme steps.
    pub time_steps: usize,
    /// Number of implicit damping steps before the scheme starts.
    pub damping_steps: usize,
}
