//! # ql-termstructures
//!
//! Time-parameterised yield curves and Black / local volatility surfaces
//! feeding the finite-difference operators.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `TermStructure`: base trait for all term structures.
pub mod term_structure;

/// `YieldTermStructure`: yield / interest-rate term structures.
pub mod yield_term_structure;

/// `FlatForward`: constant forward-rate yield curve.
pub mod flat_forward;

/// `InterpolatedZeroCurve`: zero-rate interpolated yield curve.
pub mod interpolated_zero_curve;

/// Black-volatility term structures: `BlackConstantVol`, `BlackVarianceCurve`.
pub mod black_vol_term_structure;

/// `LocalVolTermStructure`: local-volatility term structures and `LocalConstantVol`.
pub mod local_vol_term_structure;

/// `LocalVolSurface`: Dupire local volatility surface from a Black vol surface.
pub mod local_vol_surface;

pub use black_vol_term_structure::{BlackConstantVol, BlackVarianceCurve, BlackVolTermStructure};
pub use flat_forward::FlatForward;
pub use interpolated_zero_curve::InterpolatedZeroCurve;
pub use local_vol_surface::LocalVolSurface;
pub use local_vol_term_structure::{LocalConstantVol, LocalVolTermStructure};
pub use term_structure::TermStructure;
pub use yield_term_structure::YieldTermStructure;
