//! Second-derivative stencil along one axis
//! (translates `ql/methods/finitedifferences/operators/secondderivativeop.cpp`).

use super::TripleBandLinearOp;
use crate::finite_differences::meshers::FdmMesher;
use ql_core::errors::Result;
use std::ops::Deref;
use std::sync::Arc;

/// `∂²/∂x²` along one axis on a non-uniform grid.
///
/// The first and last rows are zero, which turns the boundary rows of a
/// diffusion operator into pure drift and discount terms.
///
/// Corresponds to `QuantLib::SecondDerivativeOp`.
#[derive(Debug, Clone)]
pub struct SecondDerivativeOp(TripleBandLinearOp);

impl SecondDerivativeOp {
    /// Build the stencil along `direction`.
    pub fn new(direction: usize, mesher: Arc<dyn FdmMesher>) -> Result<Self> {
        let layout = Arc::clone(mesher.layout());
        let n = layout.size();
        let last = layout.dim()[direction] - 1;
        let (mut lower, mut diag, mut upper) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);

        for iter in layout.iter() {
            let c = iter.coordinates()[direction];
            if c == 0 || c == last {
                continue;
            }
            let i = iter.index();
            let hm = mesher.dminus(&iter, direction);
            let hp = mesher.dplus(&iter, direction);
            lower[i] = 2.0 / (hm * (hm + hp));
            diag[i] = -2.0 / (hm * hp);
            upper[i] = 2.0 / (hp * (hm + hp));
        }
        Ok(Self(TripleBandLinearOp::with_bands(direction, mesher, lower, diag, upper)?))
    }

    /// The underlying banded operator.
    pub fn into_inner(self) -> TripleBandLinearOp {
        self.0
    }
}

impl Deref for SecondDerivativeOp {
    type Target = TripleBandLinearOp;

    fn deref(&self) -> &TripleBandLinearOp {
        &self.0
    }
}

impl From<SecondDerivativeOp> for TripleBandLinearOp {
    fn from(op: SecondDerivativeOp) -> Self {
        op.0
    }
}
