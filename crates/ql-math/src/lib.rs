//! # ql-math
//!
//! Numerical building blocks for the finite-difference framework: the
//! `Array` value vector (over nalgebra), spline interpolation, quadrature,
//! BiCGStab, Brent root finding and the normal / chi-square distributions
//! (via statrs).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `Array` newtype over `nalgebra::DVector`.
pub mod array;

/// Preconditioned BiCGStab linear solver.
pub mod bicgstab;

/// Probability distributions.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

/// 1D and 2D interpolation schemes.
pub mod interpolations;

/// 1D root-finding solvers.
pub mod solvers1d;

pub use array::Array;
pub use bicgstab::{BiCGStab, BiCGStabResult};
pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf};
