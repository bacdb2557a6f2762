//! Finite-difference framework for option-pricing PDEs.
//!
//! Translates the modern `ql/methods/finitedifferences/` stack: meshers on
//! a tensor grid, composite linear operators per model, boundary and step
//! conditions, ADI and theta time-stepping schemes, and solver façades that
//! roll a payoff back to today and interpolate the result.
//!
//! # Overview
//!
//! * [`meshers`]: 1-D axis grids and their tensor product
//! * [`operators`]: derivative stencils and model generators
//! * [`boundary_conditions`]: Dirichlet conditions on grid faces
//! * [`step_conditions`]: early exercise, dividends, snapshots, averaging
//! * [`schemes`]: explicit/implicit Euler, Crank-Nicolson and ADI schemes
//! * [`solvers`]: backward solver and 1-D/2-D/3-D solver façades
//! * [`utilities`]: payoff evaluation on grid points

/// Dirichlet boundary conditions on the faces of the grid.
pub mod boundary_conditions;

/// 1-D meshers and the tensor-product composite.
pub mod meshers;

/// Layout, derivative stencils and model operators.
pub mod operators;

/// Time-stepping schemes.
pub mod schemes;

/// Backward solver and solver façades.
pub mod solvers;

/// Conditions applied to the value array at stopping times.
pub mod step_conditions;

/// Inner-value (payoff) calculators.
pub mod utilities;

pub use boundary_conditions::{FdmBoundaryCondition, FdmBoundaryConditionSet, FdmDirichletBoundary, Side};
pub use meshers::{Fdm1dMesher, FdmMesher, FdmMesherComposite};
pub use operators::{FdmLinearOpComposite, FdmLinearOpLayout};
pub use schemes::{FdmScheme, FdmSchemeDesc, FdmSchemeType};
pub use solvers::{FdmBackwardSolver, FdmSolverDesc};
pub use step_conditions::{FdmStepConditionComposite, StepCondition};
pub use utilities::FdmInnerValueCalculator;

#[cfg(test)]
pub(crate) mod test_support {
    use ql_core::Real;
    use ql_processes::{black_scholes_merton_process, GeneralizedBlackScholesProcess, HestonProcess};
    use ql_quotes::SimpleQuote;
    use ql_termstructures::{BlackConstantVol, FlatForward};
    use std::sync::Arc;

    pub(crate) fn bsm_process(spot: Real, q: Real, r: Real, vol: Real) -> GeneralizedBlackScholesProcess {
        black_scholes_merton_process(
            Arc::new(SimpleQuote::new(spot)),
            Arc::new(FlatForward::new(q)),
            Arc::new(FlatForward::new(r)),
            Arc::new(BlackConstantVol::new(vol)),
        )
    }

    /// Heston process with `r = 5%` and no dividend yield.
    pub(crate) fn heston_process(
        s0: Real,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> HestonProcess {
        HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            Arc::new(SimpleQuote::new(s0)),
            v0,
            kappa,
            theta,
            sigma,
            rho,
        )
        .unwrap()
    }
}
