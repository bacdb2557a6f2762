//! Nine-point stencil in the plane of two axes
//! (translates `ql/methods/finitedifferences/operators/ninepointlinearop.hpp`).

use super::map_rows;
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Error, errors::Result, Real};
use ql_math::Array;
use nalgebra::DMatrix;
use std::sync::Arc;

/// An operator coupling each point with its eight neighbours in the
/// `(d0, d1)` plane.
///
/// Weight `k = 3·(o1 + 1) + (o0 + 1)` of a row belongs to the neighbour
/// shifted by `o0 ∈ {−1, 0, 1}` along `d0` and `o1` along `d1`.
///
/// Corresponds to `QuantLib::NinePointLinearOp`.
#[derive(Debug, Clone)]
pub struct NinePointLinearOp {
    d0: usize,
    d1: usize,
    indices: Arc<[[usize; 9]]>,
    weights: Vec<[Real; 9]>,
    mesher: Arc<dyn FdmMesher>,
}

impl NinePointLinearOp {
    /// The zero operator in the `(d0, d1)` plane.
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] unless `d0` and `d1` are two distinct
    /// axes of the mesher.
    pub fn new(d0: usize, d1: usize, mesher: Arc<dyn FdmMesher>) -> Result<Self> {
        let layout = Arc::clone(mesher.layout());
        let ndim = layout.dim().len();
        if d0 == d1 || d0 >= ndim || d1 >= ndim {
            return Err(Error::DimensionMismatch {
                expected: ndim,
                found: d0.max(d1) + 1,
            });
        }
        let indices: Vec<[usize; 9]> = layout
            .iter()
            .map(|iter| {
                let mut row = [0; 9];
                for (k, idx) in row.iter_mut().enumerate() {
                    let o0 = (k % 3) as isize - 1;
                    let o1 = (k / 3) as isize - 1;
                    *idx = layout.neighbourhood2(&iter, d0, o0, d1, o1);
                }
                row
            })
            .collect();
        Ok(Self {
            d0,
            d1,
            weights: vec![[0.0; 9]; indices.len()],
            indices: indices.into(),
            mesher,
        })
    }

    /// The two axes of the stencil.
    pub fn directions(&self) -> (usize, usize) {
        (self.d0, self.d1)
    }

    /// The mesher the operator was built on.
    pub fn mesher(&self) -> &Arc<dyn FdmMesher> {
        &self.mesher
    }

    /// Per-row weights.
    pub fn weights(&self) -> &[[Real; 9]] {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut [[Real; 9]] {
        &mut self.weights
    }

    /// `self · u`.
    pub fn apply(&self, u: &Array) -> Result<Array> {
        if u.size() != self.weights.len() {
            return Err(Error::DimensionMismatch {
                expected: self.weights.len(),
                found: u.size(),
            });
        }
        let u = u.as_slice();
        Ok(map_rows(self.weights.len(), |i| {
            self.indices[i]
                .iter()
                .zip(&self.weights[i])
                .map(|(&j, &w)| w * u[j])
                .sum()
        }))
    }

    /// Scale row `i` by `u[i]`.
    pub fn mult(&self, u: &Array) -> Self {
        let mut op = self.clone();
        for (row, &s) in op.weights.iter_mut().zip(u.iter()) {
            for w in row.iter_mut() {
                *w *= s;
            }
        }
        op
    }

    /// Dense matrix representation.
    pub fn to_matrix(&self) -> DMatrix<Real> {
        let n = self.weights.len();
        let mut m = DMatrix::zeros(n, n);
        for i in 0..n {
            for (&j, &w) in self.indices[i].iter().zip(&self.weights[i]) {
                m[(i, j)] += w;
            }
        }
        m
    }
}
