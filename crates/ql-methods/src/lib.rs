//! # ql-methods
//!
//! Finite-difference PDE machinery for option pricing.
//!
//! Translates `ql/methods/finitedifferences/`: meshers, composite linear
//! operators for the Black-Scholes, Heston, Bates, CIR, Hull-White and
//! Kluge models, boundary and step conditions, ADI time-stepping schemes
//! and the backward solver with its 1-D/2-D/3-D façades.
//!
//! # Modules
//!
//! * [`finite_differences`]: the full FD stack
//!
//! # Features
//!
//! * `parallel`: evaluate operator rows on the rayon pool
//! * `serde`: serialize scheme descriptors and boundary sides

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Finite difference methods: meshers, operators, schemes, solvers.
pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{
    FdmBackwardSolver, FdmBoundaryConditionSet, FdmLinearOpComposite, FdmMesher, FdmScheme,
    FdmSchemeDesc, FdmSchemeType, FdmSolverDesc, FdmStepConditionComposite, StepCondition,
};
