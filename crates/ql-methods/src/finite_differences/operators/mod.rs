//! Linear operators on FD grids (translates `ql/methods/finitedifferences/operators/`).
//!
//! Building blocks ([`TripleBandLinearOp`], [`NinePointLinearOp`] and the
//! derivative stencils built from them) live next to the model operators
//! that combine them into a full generator implementing
//! [`FdmLinearOpComposite`].

mod fdm_bates_op;
mod fdm_black_scholes_op;
mod fdm_cir_op;
mod fdm_ext_ou_jump_op;
mod fdm_extended_ornstein_uhlenbeck_op;
mod fdm_heston_hull_white_op;
mod fdm_heston_op;
mod fdm_hull_white_op;
mod fdm_linear_op_layout;
mod first_derivative_op;
mod nine_point_linear_op;
mod second_derivative_op;
mod second_order_mixed_derivative_op;
mod triple_band_linear_op;

pub use fdm_bates_op::FdmBatesOp;
pub use fdm_black_scholes_op::FdmBlackScholesOp;
pub use fdm_cir_op::FdmCirOp;
pub use fdm_ext_ou_jump_op::FdmExtOUJumpOp;
pub use fdm_extended_ornstein_uhlenbeck_op::FdmExtendedOrnsteinUhlenbeckOp;
pub use fdm_heston_hull_white_op::FdmHestonHullWhiteOp;
pub use fdm_heston_op::FdmHestonOp;
pub use fdm_hull_white_op::FdmHullWhiteOp;
pub use fdm_linear_op_layout::{FdmLinearOpIterator, FdmLinearOpLayout, LayoutIter};
pub use first_derivative_op::FirstDerivativeOp;
pub use nine_point_linear_op::NinePointLinearOp;
pub use second_derivative_op::SecondDerivativeOp;
pub use second_order_mixed_derivative_op::SecondOrderMixedDerivativeOp;
pub use triple_band_linear_op::TripleBandLinearOp;

use ql_core::{errors::Error, errors::Result, Real, Time};
use ql_math::Array;
use std::fmt::Debug;

/// The spatial generator `L` of a pricing PDE `∂u/∂t + L u = 0`, split
/// into per-axis parts and a coupled remainder.
///
/// `apply = Σ apply_direction + apply_mixed + integro`. Splitting schemes
/// invert the per-axis parts exactly and treat
/// [`apply_coupled`](Self::apply_coupled) explicitly.
///
/// Corresponds to `QuantLib::FdmLinearOpComposite`.
pub trait FdmLinearOpComposite: Send + Sync + Debug {
    /// Number of directions that take part in operator splitting.
    fn size(&self) -> usize;

    /// Re-evaluate time-dependent coefficients over `[t1, t2]`.
    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()>;

    /// `L · r`.
    fn apply(&self, r: &Array) -> Result<Array>;

    /// Cross-derivative part of `L · r`.
    fn apply_mixed(&self, r: &Array) -> Result<Array>;

    /// Part of `L · r` along a single axis.
    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array>;

    /// Non-local jump integral part of `L · r`.
    fn integro(&self, r: &Array) -> Result<Array> {
        Ok(Array::zeros(r.size()))
    }

    /// Everything that is not split across axes: `apply_mixed + integro`.
    fn apply_coupled(&self, r: &Array) -> Result<Array> {
        Ok(self.apply_mixed(r)? + self.integro(r)?)
    }

    /// Solve `(I − a·L_direction) x = r` exactly.
    fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array>;

    /// Approximate `(I − a·L)⁻¹ r`.
    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array>;
}

/// Evaluate `f` for every row `0..n`.
#[cfg(not(feature = "parallel"))]
pub(crate) fn map_rows<F>(n: usize, f: F) -> Array
where
    F: Fn(usize) -> Real + Send + Sync,
{
    (0..n).map(f).collect()
}

/// Evaluate `f` for every row `0..n`, spread over the rayon pool.
#[cfg(feature = "parallel")]
pub(crate) fn map_rows<F>(n: usize, f: F) -> Array
where
    F: Fn(usize) -> Real + Send + Sync,
{
    use rayon::prelude::*;
    Array::from_vec((0..n).into_par_iter().map(f).collect())
}

pub(crate) fn direction_error(size: usize, direction: usize) -> Error {
    Error::DimensionMismatch {
        expected: size,
        found: direction + 1,
    }
}

#[cfg(test)]
pub(crate) mod checks {
    //! Shared assertions for composite operators.

    use super::FdmLinearOpComposite;
    use approx::assert_abs_diff_eq;
    use ql_math::Array;

    /// `apply` equals the sum of its parts.
    pub fn assert_additive(op: &dyn FdmLinearOpComposite, u: &Array, tol: f64) {
        let full = op.apply(u).unwrap();
        let mut parts = op.apply_mixed(u).unwrap() + op.integro(u).unwrap();
        for d in 0..op.size() {
            parts += &op.apply_direction(d, u).unwrap();
        }
        for i in 0..u.size() {
            assert_abs_diff_eq!(full[i], parts[i], epsilon = tol * (1.0 + full[i].abs()));
        }
    }

    /// `solve_splitting` inverts `I − a·L_direction`.
    pub fn assert_splitting_round_trip(op: &dyn FdmLinearOpComposite, v: &Array, a: f64, tol: f64) {
        for d in 0..op.size() {
            let rhs = v - &(op.apply_direction(d, v).unwrap() * a);
            let x = op.solve_splitting(d, &rhs, a).unwrap();
            for i in 0..v.size() {
                assert_abs_diff_eq!(x[i], v[i], epsilon = tol * (1.0 + v[i].abs()));
            }
        }
    }
}
