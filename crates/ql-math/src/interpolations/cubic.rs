//! Natural cubic spline (translates `ql/math/interpolations/cubicinterpolation.hpp`
//! with `CubicInterpolation::Spline` derivative approximation and
//! `SecondDerivative = 0` boundary conditions at both ends).
//!
//! The second derivatives `Mᵢ` at the nodes solve the tridiagonal system
//!
//! ```text
//! hᵢ₋₁ Mᵢ₋₁ + 2(hᵢ₋₁ + hᵢ) Mᵢ + hᵢ Mᵢ₊₁ = 6 (sᵢ - sᵢ₋₁),   M₀ = Mₙ₋₁ = 0
//! ```
//!
//! where `hᵢ = xᵢ₊₁ - xᵢ` and `sᵢ` is the secant slope on interval `i`.

use ql_core::{errors::Result, Real};

use super::{check_abscissae, locate, Interpolation1D};

/// Convert node second derivatives into polynomial coefficients.
///
/// For each interval `[x_i, x_{i+1}]`:
///
///   `f(x) = y_i + dx*(a_i + dx*(b_i + dx*c_i))`
///
/// where `dx = x - x_i`.
fn compute_coefficients(
    xs: &[Real],
    ys: &[Real],
    ms: &[Real],
) -> (Vec<Real>, Vec<Real>, Vec<Real>) {
    let n = xs.len();
    let mut a = Vec::with_capacity(n - 1);
    let mut b = Vec::with_capacity(n - 1);
    let mut c = Vec::with_capacity(n - 1);

    for i in 0..n - 1 {
        let h = xs[i + 1] - xs[i];
        let s = (ys[i + 1] - ys[i]) / h;
        a.push(s - h * (2.0 * ms[i] + ms[i + 1]) / 6.0);
        b.push(0.5 * ms[i]);
        c.push((ms[i + 1] - ms[i]) / (6.0 * h));
    }

    (a, b, c)
}

/// Thomas algorithm for the interior rows of the natural spline system.
fn natural_second_derivatives(xs: &[Real], ys: &[Real]) -> Vec<Real> {
    let n = xs.len();
    let mut ms = vec![0.0; n];
    if n < 3 {
        return ms;
    }

    let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let s: Vec<Real> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    let m = n - 2;
    let mut diag = vec![0.0; m];
    let mut rhs = vec![0.0; m];
    for k in 0..m {
        diag[k] = 2.0 * (h[k] + h[k + 1]);
        rhs[k] = 6.0 * (s[k + 1] - s[k]);
    }
    // forward sweep; sub-diagonal of row k is h[k], super-diagonal is h[k+1]
    for k in 1..m {
        let w = h[k] / diag[k - 1];
        diag[k] -= w * h[k];
        rhs[k] -= w * rhs[k - 1];
    }
    ms[m] = rhs[m - 1] / diag[m - 1];
    for k in (0..m - 1).rev() {
        ms[k + 1] = (rhs[k] - h[k + 1] * ms[k + 2]) / diag[k];
    }
    ms
}

/// Cubic spline with vanishing second derivative at both ends.
///
/// Beyond the outermost nodes the spline extrapolates with the cubic of the
/// adjacent interval.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Build the spline through `(xs[i], ys[i])`.
    ///
    /// # Errors
    /// Fewer than two points, mismatched lengths, or non-increasing `xs`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_abscissae(xs, ys.len(), 2)?;
        Ok(Self::from_checked(xs, ys))
    }

    /// Build from abscissae already known to be valid.
    pub(crate) fn from_checked(xs: &[Real], ys: &[Real]) -> Self {
        let ms = natural_second_derivatives(xs, ys);
        let (a, b, c) = compute_coefficients(xs, ys, &ms);
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            a,
            b,
            c,
        }
    }

    /// The node abscissae.
    pub fn xs(&self) -> &[Real] {
        &self.xs
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn operator(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.ys[i] + dx * (self.a[i] + dx * (self.b[i] + dx * self.c[i]))
    }

    fn derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.a[i] + dx * (2.0 * self.b[i] + 3.0 * dx * self.c[i])
    }

    fn second_derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        2.0 * self.b[i] + 6.0 * dx * self.c[i]
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reproduces_nodes() {
        let xs = [0.0, 0.7, 1.5, 2.0, 3.2];
        let ys = [1.0, -0.5, 2.0, 2.5, 0.0];
        let spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_abs_diff_eq!(spline.operator(*x), *y, epsilon = 1e-13);
        }
    }

    #[test]
    fn natural_ends_have_zero_curvature() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 1.0, 4.0, 9.0, 16.0];
        let spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
        assert_abs_diff_eq!(spline.second_derivative(0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.second_derivative(4.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn is_exact_for_linear_data() {
        let xs = [0.0, 0.3, 1.1, 2.0];
        let ys: Vec<Real> = xs.iter().map(|x| 2.0 * x - 1.0).collect();
        let spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
        assert_abs_diff_eq!(spline.operator(0.8), 0.6, epsilon = 1e-13);
        assert_abs_diff_eq!(spline.derivative(1.7), 2.0, epsilon = 1e-13);
        assert_abs_diff_eq!(spline.second_derivative(0.5), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn derivatives_are_continuous_at_nodes() {
        let xs = [0.0, 0.5, 1.3, 2.0, 2.4];
        let ys = [0.0, 0.4, 0.9, 0.2, -0.3];
        let spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
        let eps = 1e-9;
        for &x in &xs[1..4] {
            assert_abs_diff_eq!(
                spline.derivative(x - eps),
                spline.derivative(x + eps),
                epsilon = 1e-6
            );
            assert_abs_diff_eq!(
                spline.second_derivative(x - eps),
                spline.second_derivative(x + eps),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn approximates_smooth_function() {
        let xs: Vec<Real> = (0..=40).map(|i| i as Real * 0.1).collect();
        let ys: Vec<Real> = xs.iter().map(|x| x.sin()).collect();
        let spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
        assert_abs_diff_eq!(spline.operator(1.234), 1.234_f64.sin(), epsilon = 1e-5);
        assert_abs_diff_eq!(spline.derivative(2.05), 2.05_f64.cos(), epsilon = 1e-3);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn spline_interpolates_random_data(
                steps in proptest::collection::vec(0.05f64..2.0, 3..12),
                seed in proptest::collection::vec(-5.0f64..5.0, 13),
            ) {
                let mut xs = vec![0.0];
                for h in &steps {
                    let last = xs[xs.len() - 1];
                    xs.push(last + h);
                }
                let ys: Vec<Real> = seed[..xs.len()].to_vec();
                let spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
                for (x, y) in xs.iter().zip(ys.iter()) {
                    prop_assert!((spline.operator(*x) - y).abs() < 1e-9);
                }
            }
        }
    }
}
