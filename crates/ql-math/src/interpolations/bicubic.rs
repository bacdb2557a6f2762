//! Bicubic spline interpolation on a 2D grid
//! (translates `ql/math/interpolations/bicubicsplineinterpolation.hpp`).
//!
//! For each row of the grid, a 1D cubic natural spline is built along `x`.
//! Then, for any query `(x, y)`, the row splines are evaluated at `x` to
//! produce an intermediate column of values, which is itself interpolated
//! along `y` with another cubic natural spline.

use ql_core::{errors::Result, Real};

use super::{check_abscissae, CubicNaturalSpline, Interpolation1D, Interpolation2D};

/// Bicubic spline interpolation on a rectangular grid.
///
/// `z` is stored in row-major order: `z[j * nx + i]` = f(xs\[i\], ys\[j\]).
///
/// Corresponds to `QuantLib::BicubicSpline`.
#[derive(Debug, Clone)]
pub struct BicubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// One cubic spline per y-row, interpolating along x.
    row_splines: Vec<CubicNaturalSpline>,
}

impl BicubicSpline {
    /// Build a bicubic spline on the grid `(xs × ys → z)`.
    ///
    /// Both `xs` and `ys` must be strictly increasing with at least 2
    /// elements. `z` is row-major: `z[j * nx + i]` = f(xs\[i\], ys\[j\]).
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        let nx = xs.len();
        let ny = ys.len();
        check_abscissae(xs, nx, 2)?;
        check_abscissae(ys, ny, 2)?;
        ql_core::ensure!(
            z.len() == nx * ny,
            "z length ({}) must equal nx*ny ({}*{}={})",
            z.len(),
            nx,
            ny,
            nx * ny
        );

        let row_splines = z
            .chunks(nx)
            .map(|row| CubicNaturalSpline::from_checked(xs, row))
            .collect();

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            row_splines,
        })
    }

    fn column<F>(&self, along_x: F) -> CubicNaturalSpline
    where
        F: Fn(&CubicNaturalSpline) -> Real,
    {
        let values: Vec<Real> = self.row_splines.iter().map(along_x).collect();
        CubicNaturalSpline::from_checked(&self.ys, &values)
    }

    /// ∂f/∂x at `(x, y)`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.derivative(x)).operator(y)
    }

    /// ∂f/∂y at `(x, y)`.
    pub fn derivative_y(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.operator(x)).derivative(y)
    }

    /// ∂²f/∂x² at `(x, y)`.
    pub fn second_derivative_x(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.second_derivative(x)).operator(y)
    }

    /// ∂²f/∂y² at `(x, y)`.
    pub fn second_derivative_y(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.operator(x)).second_derivative(y)
    }

    /// ∂²f/∂x∂y at `(x, y)`.
    pub fn derivative_xy(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.derivative(x)).derivative(y)
    }
}

impl Interpolation2D for BicubicSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn y_min(&self) -> Real {
        self.ys[0]
    }

    fn y_max(&self) -> Real {
        self.ys[self.ys.len() - 1]
    }

    fn operator(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.operator(x)).operator(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid(f: impl Fn(Real, Real) -> Real) -> (Vec<Real>, Vec<Real>, Vec<Real>) {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 2.0, 3.0];
        let mut z = Vec::new();
        for &y in &ys {
            for &x in &xs {
                z.push(f(x, y));
            }
        }
        (xs, ys, z)
    }

    #[test]
    fn bicubic_exact_on_grid() {
        let (xs, ys, z) = grid(|x, y| x + y);
        let interp = BicubicSpline::new(&xs, &ys, &z).unwrap();
        for &y in &ys {
            for &x in &xs {
                assert_abs_diff_eq!(interp.operator(x, y), x + y, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn bicubic_smooth_interior() {
        let (xs, ys, z) = grid(|x, y| x * y);
        let interp = BicubicSpline::new(&xs, &ys, &z).unwrap();
        assert_abs_diff_eq!(interp.operator(1.5, 1.5), 2.25, epsilon = 1e-10);
        assert_abs_diff_eq!(interp.derivative_xy(1.2, 2.1), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn bicubic_reproduces_bilinear_function() {
        let (xs, ys, z) = grid(|x, y| 2.0 * x + 3.0 * y + 1.0);
        let interp = BicubicSpline::new(&xs, &ys, &z).unwrap();
        assert_abs_diff_eq!(interp.operator(1.5, 2.5), 11.5, epsilon = 1e-10);
        assert_abs_diff_eq!(interp.derivative_x(0.7, 1.9), 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(interp.derivative_y(2.2, 0.4), 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(interp.second_derivative_x(1.1, 1.1), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(interp.second_derivative_y(1.1, 1.1), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn bicubic_rejects_wrong_value_count() {
        assert!(BicubicSpline::new(&[0.0, 1.0], &[0.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
    }
}
