//! First-derivative stencil along one axis
//! (translates `ql/methods/finitedifferences/operators/firstderivativeop.cpp`).

use super::TripleBandLinearOp;
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real};
use std::ops::Deref;
use std::sync::Arc;

/// `∂/∂x` along one axis on a non-uniform grid.
///
/// Interior rows use the three-point central stencil exact for quadratics;
/// the first and last rows are one-sided differences.
///
/// Corresponds to `QuantLib::FirstDerivativeOp`.
#[derive(Debug, Clone)]
pub struct FirstDerivativeOp(TripleBandLinearOp);

impl FirstDerivativeOp {
    /// Build the stencil along `direction`.
    pub fn new(direction: usize, mesher: Arc<dyn FdmMesher>) -> Result<Self> {
        let layout = Arc::clone(mesher.layout());
        let n = layout.size();
        let last = layout.dim()[direction] - 1;
        let (mut lower, mut diag, mut upper) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);

        for iter in layout.iter() {
            let i = iter.index();
            let hm = mesher.dminus(&iter, direction);
            let hp = mesher.dplus(&iter, direction);
            let [l, d, u] = stencil(iter.coordinates()[direction], last, hm, hp);
            lower[i] = l;
            diag[i] = d;
            upper[i] = u;
        }
        Ok(Self(TripleBandLinearOp::with_bands(direction, mesher, lower, diag, upper)?))
    }

    /// The underlying banded operator.
    pub fn into_inner(self) -> TripleBandLinearOp {
        self.0
    }
}

impl Deref for FirstDerivativeOp {
    type Target = TripleBandLinearOp;

    fn deref(&self) -> &TripleBandLinearOp {
        &self.0
    }
}

impl From<FirstDerivativeOp> for TripleBandLinearOp {
    fn from(op: FirstDerivativeOp) -> Self {
        op.0
    }
}

/// Weights `(lower, diag, upper)` of the first derivative at coordinate `c`
/// of an axis whose last coordinate is `last`.
pub(crate) fn stencil(c: usize, last: usize, hm: Real, hp: Real) -> [Real; 3] {
    if c == 0 {
        [0.0, -1.0 / hp, 1.0 / hp]
    } else if c == last {
        [-1.0 / hm, 1.0 / hm, 0.0]
    } else {
        [-hp / (hm * (hm + hp)), (hp - hm) / (hm * hp), hm / (hp * (hm + hp))]
    }
}
