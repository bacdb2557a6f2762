//! # ql-processes
//!
//! Stochastic process definitions feeding the finite-difference operators
//! and meshers.
//!
//! The processes here are coefficient containers: each exposes the SDE
//! parameters (drift, diffusion, mean reversion, correlation, jump
//! intensity and size) and, for one-factor processes, the conditional
//! moments used to size meshes.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bates_process;
pub mod black_scholes_process;
pub mod ext_ou_with_jumps_process;
pub mod extended_ornstein_uhlenbeck_process;
pub mod heston_process;
pub mod hull_white_process;
pub mod ornstein_uhlenbeck_process;
pub mod square_root_process;
pub mod stochastic_process;

pub use bates_process::BatesProcess;
pub use black_scholes_process::{
    black_scholes_merton_process, black_scholes_process, GeneralizedBlackScholesProcess,
};
pub use ext_ou_with_jumps_process::ExtOUWithJumpsProcess;
pub use extended_ornstein_uhlenbeck_process::{
    Discretization, ExtendedOrnsteinUhlenbeckProcess, LevelFn,
};
pub use heston_process::HestonProcess;
pub use hull_white_process::HullWhiteProcess;
pub use ornstein_uhlenbeck_process::OrnsteinUhlenbeckProcess;
pub use square_root_process::SquareRootProcess;
pub use stochastic_process::StochasticProcess1D;
