//! Probability distributions (translates `ql/math/distributions/`).
//!
//! Normal and chi-square families, delegating to the `statrs` crate.

pub mod chi_square;
pub mod normal;

pub use chi_square::{chi_square_cdf, NonCentralChiSquareDistribution};
pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf, normal_pdf_with};
