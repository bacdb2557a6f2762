use super::first_derivative_op::stencil;
use super::NinePointLinearOp;
use crate::finite_differences::meshers::FdmMesher;
use ql_core::errors::Result;
use std::ops::Deref;
use std::sync::Arc;

/// `∂²/∂x∂y` as the tensor product of the first-derivative stencils of the
/// two axes, one-sided on the boundary rows.
///
/// Corresponds to `QuantLib::SecondOrderMixedDerivativeOp`.
#[derive(Debug, Clone)]
pub struct SecondOrderMixedDerivativeOp(NinePointLinearOp);

impl SecondOrderMixedDerivativeOp {
    /// Build the stencil in the `(d0, d1)` plane.
    pub fn new(d0: usize, d1: usize, mesher: Arc<dyn FdmMesher>) -> Result<Self> {
        let mut op = NinePointLinearOp::new(d0, d1, Arc::clone(&mesher))?;
        let layout = Arc::clone(mesher.layout());
        let last0 = layout.dim()[d0] - 1;
        let last1 = layout.dim()[d1] - 1;
        let weights = op.weights_mut();
        for iter in layout.iter() {
            let c = iter.coordinates();
            let w0 = stencil(c[d0], last0, mesher.dminus(&iter, d0), mesher.dplus(&iter, d0));
            let w1 = stencil(c[d1], last1, mesher.dminus(&iter, d1), mesher.dplus(&iter, d1));
            let row = &mut weights[iter.index()];
            for (k, w) in row.iter_mut().enumerate() {
                *w = w0[k % 3] * w1[k / 3];
            }
        }
        Ok(Self(op))
    }

    /// The underlying nine-point operator.
    pub fn into_inner(self) -> NinePointLinearOp {
        self.0
    }
}

impl Deref for SecondOrderMixedDerivativeOp {
    type Target = NinePointLinearOp;

    fn deref(&self) -> &NinePointLinearOp {
        &self.0
    }
}

impl From<SecondOrderMixedDerivativeOp> for NinePointLinearOp {
    fn from(op: SecondOrderMixedDerivativeOp) -> Self {
        op.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Concentrating1dMesher, Fdm1dMesher, FdmMesherComposite, Uniform1dMesher};
    use approx::assert_abs_diff_eq;
    use ql_math::Array;

    fn mesher() -> Arc<dyn FdmMesher> {
        let x: Arc<dyn Fdm1dMesher> =
            Arc::new(Concentrating1dMesher::new(-1.0, 1.0, 9, Some((0.0, 0.3)), false).unwrap());
        let y: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 2.0, 7).unwrap());
        let z: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 1.0, 3).unwrap());
        Arc::new(FdmMesherComposite::new(vec![x, y, z]).unwrap())
    }

    #[test]
    fn exact_for_bilinear_functions_everywhere() {
        let mesher = mesher();
        let x = mesher.locations(0);
        let y = mesher.locations(1);
        let u: Array = x.zip_map(&y, |a, b| 2.0 * a * b + a - 3.0 * b);
        let op = SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(&mesher)).unwrap();
        let r = op.apply(&u).unwrap();
        for i in 0..r.size() {
            assert_abs_diff_eq!(r[i], 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn apply_matches_dense_matrix() {
        let mesher = mesher();
        let op = SecondOrderMixedDerivativeOp::new(2, 0, Arc::clone(&mesher))
            .unwrap()
            .mult(&mesher.locations(1));
        let u: Array = (0..op.weights().len()).map(|i| ((i * 5) % 13) as f64).collect();
        let dense = op.to_matrix() * nalgebra::DVector::from_column_slice(u.as_slice());
        let r = op.apply(&u).unwrap();
        for i in 0..r.size() {
            assert_abs_diff_eq!(r[i], dense[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn distinct_axes_required() {
        assert!(SecondOrderMixedDerivativeOp::new(1, 1, mesher()).is_err());
    }
}
