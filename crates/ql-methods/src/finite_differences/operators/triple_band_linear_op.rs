//! Tri-diagonal operator along one axis of an N-D grid
//! (translates `ql/methods/finitedifferences/operators/triplebandlinearop.hpp`).

use super::map_rows;
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Error, errors::Result, Real};
use ql_math::Array;
use nalgebra::DMatrix;
use std::sync::Arc;

/// A banded operator coupling every grid point with its two neighbours
/// along `direction`.
///
/// Row `i` reads `lower[i]·u[i₀] + diag[i]·u[i] + upper[i]·u[i₂]` where
/// `i₀` and `i₂` are the clamped neighbours. Rows on the first (last)
/// point of the axis must carry a zero lower (upper) weight for
/// [`solve_splitting`](Self::solve_splitting) to apply.
///
/// Corresponds to `QuantLib::TripleBandLinearOp`.
#[derive(Debug, Clone)]
pub struct TripleBandLinearOp {
    direction: usize,
    i0: Arc<[usize]>,
    i2: Arc<[usize]>,
    reverse_index: Arc<[usize]>,
    lower: Vec<Real>,
    diag: Vec<Real>,
    upper: Vec<Real>,
    mesher: Arc<dyn FdmMesher>,
}

impl TripleBandLinearOp {
    /// The zero operator along `direction`.
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] if `direction` is not an axis of the
    /// mesher.
    pub fn new(direction: usize, mesher: Arc<dyn FdmMesher>) -> Result<Self> {
        let layout = Arc::clone(mesher.layout());
        let ndim = layout.dim().len();
        if direction >= ndim {
            return Err(Error::DimensionMismatch {
                expected: ndim,
                found: direction + 1,
            });
        }

        // Strides of a layout in which `direction` varies fastest.
        let mut swapped = layout.dim().to_vec();
        swapped.swap(0, direction);
        let mut stride = Vec::with_capacity(ndim);
        let mut acc = 1;
        for &n in &swapped {
            stride.push(acc);
            acc *= n;
        }
        stride.swap(0, direction);

        let n = layout.size();
        let mut i0 = vec![0; n];
        let mut i2 = vec![0; n];
        let mut reverse_index = vec![0; n];
        for iter in layout.iter() {
            let i = iter.index();
            i0[i] = layout.neighbourhood(&iter, direction, -1);
            i2[i] = layout.neighbourhood(&iter, direction, 1);
            let new_index: usize = iter.coordinates().iter().zip(&stride).map(|(c, s)| c * s).sum();
            reverse_index[new_index] = i;
        }

        Ok(Self {
            direction,
            i0: i0.into(),
            i2: i2.into(),
            reverse_index: reverse_index.into(),
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
            mesher,
        })
    }

    /// Build from explicit bands.
    pub(crate) fn with_bands(
        direction: usize,
        mesher: Arc<dyn FdmMesher>,
        lower: Vec<Real>,
        diag: Vec<Real>,
        upper: Vec<Real>,
    ) -> Result<Self> {
        let mut op = Self::new(direction, mesher)?;
        op.lower = lower;
        op.diag = diag;
        op.upper = upper;
        Ok(op)
    }

    /// The axis this operator acts on.
    pub fn direction(&self) -> usize {
        self.direction
    }

    /// The mesher the operator was built on.
    pub fn mesher(&self) -> &Arc<dyn FdmMesher> {
        &self.mesher
    }

    /// Lower band.
    pub fn lower(&self) -> &[Real] {
        &self.lower
    }

    /// Main diagonal.
    pub fn diag(&self) -> &[Real] {
        &self.diag
    }

    /// Upper band.
    pub fn upper(&self) -> &[Real] {
        &self.upper
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    fn check_size(&self, r: &Array) -> Result<()> {
        if r.size() != self.size() {
            return Err(Error::DimensionMismatch {
                expected: self.size(),
                found: r.size(),
            });
        }
        Ok(())
    }

    /// `self · r`.
    pub fn apply(&self, r: &Array) -> Result<Array> {
        self.check_size(r)?;
        let r = r.as_slice();
        Ok(map_rows(self.size(), |i| {
            r[self.i0[i]] * self.lower[i] + r[i] * self.diag[i] + r[self.i2[i]] * self.upper[i]
        }))
    }

    /// Per-row weights: either one per grid point or a single broadcast
    /// value.
    fn check_weights(&self, v: &Array) -> Result<()> {
        if v.size() == 1 {
            Ok(())
        } else {
            self.check_size(v)
        }
    }

    /// Set `self = a·x + y + diag(b)`.
    ///
    /// `a` and `b` are per-row weights; a single element is broadcast and
    /// `None` means "no term".
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] if a weight vector is neither scalar nor
    /// of the layout size, or `x` or `y` has a different size.
    pub fn axpyb(
        &mut self,
        a: Option<&Array>,
        x: &TripleBandLinearOp,
        y: &TripleBandLinearOp,
        b: Option<&Array>,
    ) -> Result<()> {
        for w in a.into_iter().chain(b) {
            self.check_weights(w)?;
        }
        self.check_operator(x)?;
        self.check_operator(y)?;
        let weight = |v: &Array, i: usize| if v.size() > 1 { v[i] } else { v[0] };
        for i in 0..self.size() {
            let s = a.map_or(0.0, |a| weight(a, i));
            let d = b.map_or(0.0, |b| weight(b, i));
            self.lower[i] = y.lower[i] + s * x.lower[i];
            self.diag[i] = y.diag[i] + s * x.diag[i] + d;
            self.upper[i] = y.upper[i] + s * x.upper[i];
        }
        Ok(())
    }

    fn check_operator(&self, m: &TripleBandLinearOp) -> Result<()> {
        if m.size() != self.size() {
            return Err(Error::DimensionMismatch {
                expected: self.size(),
                found: m.size(),
            });
        }
        Ok(())
    }

    /// Scale row `i` by `u[i]`.
    pub fn mult(&self, u: &Array) -> Result<Self> {
        self.check_size(u)?;
        let mut op = self.clone();
        for i in 0..self.size() {
            let s = u[i];
            op.lower[i] *= s;
            op.diag[i] *= s;
            op.upper[i] *= s;
        }
        Ok(op)
    }

    /// Scale column `j` by `u[j]`, i.e. `self · diag(u)`.
    pub fn mult_r(&self, u: &Array) -> Result<Self> {
        self.check_size(u)?;
        let mut op = self.clone();
        for i in 0..self.size() {
            op.lower[i] *= u[self.i0[i]];
            op.diag[i] *= u[i];
            op.upper[i] *= u[self.i2[i]];
        }
        Ok(op)
    }

    /// `self + diag(u)`.
    pub fn add(&self, u: &Array) -> Result<Self> {
        self.check_size(u)?;
        let mut op = self.clone();
        for (d, &ui) in op.diag.iter_mut().zip(u.iter()) {
            *d += ui;
        }
        Ok(op)
    }

    /// `self + m` for an operator along the same axis.
    pub fn add_triple(&self, m: &TripleBandLinearOp) -> Result<Self> {
        self.check_operator(m)?;
        let mut op = self.clone();
        for i in 0..self.size() {
            op.lower[i] += m.lower[i];
            op.diag[i] += m.diag[i];
            op.upper[i] += m.upper[i];
        }
        Ok(op)
    }

    /// Solve `(a·self + b·I) x = r` with the Thomas algorithm, one axis line
    /// after another.
    ///
    /// # Errors
    /// A precondition error if a boundary row couples across the edge of
    /// the axis, [`Error::SolverDivergence`] on a zero or non-finite pivot.
    pub fn solve_splitting(&self, r: &Array, a: Real, b: Real) -> Result<Array> {
        self.check_size(r)?;
        let layout = self.mesher.layout();
        let last = layout.dim()[self.direction] - 1;
        for iter in layout.iter() {
            let c = iter.coordinates()[self.direction];
            let i = iter.index();
            ensure!(c != 0 || self.lower[i] == 0.0, "removing non zero entry at row {i}");
            ensure!(c != last || self.upper[i] == 0.0, "removing non zero entry at row {i}");
        }

        let n = self.size();
        let rev = &self.reverse_index;
        let mut ret = vec![0.0; n];
        let mut tmp = vec![0.0; n];

        let pivot = |bet: Real, row: usize| -> Result<Real> {
            if bet == 0.0 || !bet.is_finite() {
                return Err(Error::SolverDivergence(format!(
                    "singular tri-diagonal system at row {row}"
                )));
            }
            Ok(1.0 / bet)
        };

        let mut rim1 = rev[0];
        let mut bet = pivot(a * self.diag[rim1] + b, rim1)?;
        ret[rim1] = r[rim1] * bet;
        for j in 1..n {
            let ri = rev[j];
            tmp[j] = a * self.upper[rim1] * bet;
            bet = pivot(b + a * (self.diag[ri] - tmp[j] * self.lower[ri]), ri)?;
            ret[ri] = (r[ri] - a * self.lower[ri] * ret[rim1]) * bet;
            rim1 = ri;
        }
        for j in (0..n.saturating_sub(1)).rev() {
            ret[rev[j]] -= tmp[j + 1] * ret[rev[j + 1]];
        }
        Ok(Array::from_vec(ret))
    }

    /// Dense matrix representation.
    pub fn to_matrix(&self) -> DMatrix<Real> {
        let n = self.size();
        let mut m = DMatrix::zeros(n, n);
        for i in 0..n {
            m[(i, self.i0[i])] += self.lower[i];
            m[(i, i)] += self.diag[i];
            m[(i, self.i2[i])] += self.upper[i];
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Concentrating1dMesher, Fdm1dMesher, FdmMesherComposite, Uniform1dMesher};
    use crate::finite_differences::operators::{FirstDerivativeOp, SecondDerivativeOp};
    use approx::assert_abs_diff_eq;

    fn mesher_2d() -> Arc<dyn FdmMesher> {
        let x: Arc<dyn Fdm1dMesher> =
            Arc::new(Concentrating1dMesher::new(-1.0, 2.0, 7, Some((0.5, 0.2)), false).unwrap());
        let y: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 1.0, 5).unwrap());
        Arc::new(FdmMesherComposite::new(vec![x, y]).unwrap())
    }

    fn test_vector(n: usize) -> Array {
        (0..n).map(|i| ((i * 7 + 3) % 11) as Real - 4.0).collect()
    }

    #[test]
    fn apply_matches_dense_matrix() {
        let mesher = mesher_2d();
        for direction in 0..2 {
            let op = SecondDerivativeOp::new(direction, Arc::clone(&mesher))
                .unwrap()
                .add_triple(&FirstDerivativeOp::new(direction, Arc::clone(&mesher)).unwrap())
                .unwrap();
            let u = test_vector(op.size());
            let dense = op.to_matrix() * nalgebra::DVector::from_column_slice(u.as_slice());
            let applied = op.apply(&u).unwrap();
            for i in 0..op.size() {
                assert_abs_diff_eq!(applied[i], dense[i], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn splitting_inverts_shifted_operator() {
        let mesher = mesher_2d();
        for direction in 0..2 {
            let l = SecondDerivativeOp::new(direction, Arc::clone(&mesher))
                .unwrap()
                .add_triple(
                    &FirstDerivativeOp::new(direction, Arc::clone(&mesher))
                        .unwrap()
                        .mult(&Array::from_element(35, 0.3))
                        .unwrap(),
                )
                .unwrap();
            let v = test_vector(l.size());
            let a = -0.01;
            let rhs = &v + &(l.apply(&v).unwrap() * a);
            let x = l.solve_splitting(&rhs, a, 1.0).unwrap();
            for i in 0..v.size() {
                assert_abs_diff_eq!(x[i], v[i], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn axpyb_broadcasts_scalars() {
        let mesher = mesher_2d();
        let dx = FirstDerivativeOp::new(0, Arc::clone(&mesher)).unwrap();
        let dxx = SecondDerivativeOp::new(0, Arc::clone(&mesher)).unwrap();
        let mut op = TripleBandLinearOp::new(0, Arc::clone(&mesher)).unwrap();
        op.axpyb(Some(&Array::from_element(1, 2.0)), &dx, &dxx, Some(&Array::from_element(1, -0.5)))
            .unwrap();
        let u = test_vector(35);
        let expected = &(&(dx.apply(&u).unwrap() * 2.0) + &dxx.apply(&u).unwrap()) - &(&u * 0.5);
        let got = op.apply(&u).unwrap();
        for i in 0..35 {
            assert_abs_diff_eq!(got[i], expected[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn mult_r_scales_columns() {
        let mesher = mesher_2d();
        let op = FirstDerivativeOp::new(1, Arc::clone(&mesher)).unwrap();
        let w = test_vector(35).map(|x| x + 10.0);
        let u = test_vector(35);
        let lhs = op.mult_r(&w).unwrap().apply(&u).unwrap();
        let rhs = op.apply(&u.component_mul(&w)).unwrap();
        for i in 0..35 {
            assert_abs_diff_eq!(lhs[i], rhs[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn weights_of_the_wrong_size_are_rejected() {
        let mesher = mesher_2d();
        let dx = FirstDerivativeOp::new(0, Arc::clone(&mesher)).unwrap();
        let short = Array::from_element(34, 1.0);
        assert_eq!(
            dx.mult(&short).unwrap_err(),
            Error::DimensionMismatch { expected: 35, found: 34 }
        );
        assert!(dx.mult_r(&short).is_err());
        assert!(dx.add(&short).is_err());

        let mut op = TripleBandLinearOp::new(0, Arc::clone(&mesher)).unwrap();
        assert_eq!(
            op.axpyb(Some(&short), &dx, &dx, None).unwrap_err(),
            Error::DimensionMismatch { expected: 35, found: 34 }
        );
        assert!(op.axpyb(None, &dx, &dx, Some(&Array::from_element(2, 1.0))).is_err());

        let other: Arc<dyn FdmMesher> = Arc::new(
            FdmMesherComposite::from_1d(Arc::new(Uniform1dMesher::new(0.0, 1.0, 4).unwrap())).unwrap(),
        );
        let small = TripleBandLinearOp::new(0, other).unwrap();
        assert!(op.add_triple(&small).is_err());
        assert!(op.axpyb(None, &small, &dx, None).is_err());
    }

    #[test]
    fn singular_pivot_is_a_divergence() {
        let mesher = mesher_2d();
        let op = TripleBandLinearOp::new(0, Arc::clone(&mesher)).unwrap();
        let r = Array::from_element(35, 1.0);
        assert!(matches!(op.solve_splitting(&r, 1.0, 0.0), Err(Error::SolverDivergence(_))));
    }

    #[test]
    fn invalid_direction_is_rejected() {
        assert!(matches!(
            TripleBandLinearOp::new(2, mesher_2d()),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
