use super::{axis_lines, StepCondition};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_instruments::Dividend;
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};
use ql_math::Array;
use std::sync::Arc;

/// Cash dividends on a log-spot axis.
///
/// Crossing a dividend date backwards, the value at spot `S` becomes the
/// value just after the payment at `max(S_min, S − D)`, read off the grid
/// line by linear interpolation.
///
/// Corresponds to `QuantLib::FdmDividendHandler`.
#[derive(Debug, Clone)]
pub struct FdmDividendHandler {
    dividend_times: Vec<Time>,
    dividends: Vec<Real>,
    mesher: Arc<dyn FdmMesher>,
    equity_direction: usize,
    x: Vec<Real>,
}

impl FdmDividendHandler {
    /// # Errors
    /// `equity_direction` is not an axis of `mesher`, or the axis has
    /// fewer than two points.
    pub fn new(dividends: &[Dividend], mesher: Arc<dyn FdmMesher>, equity_direction: usize) -> Result<Self> {
        let layout = mesher.layout();
        if equity_direction >= layout.dim().len() {
            return Err(Error::DimensionMismatch {
                expected: layout.dim().len(),
                found: equity_direction,
            });
        }
        let n = layout.dim()[equity_direction];
        if n < 2 {
            return Err(Error::InvalidGrid(format!(
                "equity axis needs at least 2 points, got {n}"
            )));
        }
        let x = mesher.locations(equity_direction);
        let mut spots = vec![0.0; n];
        for iter in layout.iter() {
            spots[iter.coordinates()[equity_direction]] = x[iter.index()].exp();
        }
        Ok(Self {
            dividend_times: dividends.iter().map(|d| d.time).collect(),
            dividends: dividends.iter().map(|d| d.amount).collect(),
            mesher,
            equity_direction,
            x: spots,
        })
    }

    /// Payment times.
    pub fn dividend_times(&self) -> &[Time] {
        &self.dividend_times
    }

    /// Cash amounts, in the order of [`Self::dividend_times`].
    pub fn dividends(&self) -> &[Real] {
        &self.dividends
    }
}

impl StepCondition for FdmDividendHandler {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        let Some(pos) = self.dividend_times.iter().position(|&s| s == t) else {
            return Ok(());
        };
        let dividend = self.dividends[pos];
        let shifted: Vec<Real> = self.x.iter().map(|&s| self.x[0].max(s - dividend)).collect();

        let before = a.clone();
        for line in axis_lines(self.mesher.layout(), self.equity_direction) {
            let ys: Vec<Real> = line.iter().map(|&i| before[i]).collect();
            let interp = LinearInterpolation::new(&self.x, &ys)?;
            for (&i, &s) in line.iter().zip(&shifted) {
                a[i] = interp.operator(s);
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.dividend_times.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite, Uniform1dMesher};
    use approx::assert_abs_diff_eq;

    fn spot_grid(n: usize, extra: Option<usize>) -> Arc<dyn FdmMesher> {
        let x: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(3.0, 5.5, n).unwrap());
        let mut axes = vec![x];
        if let Some(m) = extra {
            axes.push(Arc::new(Uniform1dMesher::new(0.0, 1.0, m).unwrap()));
        }
        Arc::new(FdmMesherComposite::new(axes).unwrap())
    }

    #[test]
    fn linear_values_shift_by_the_dividend() {
        let mesher = spot_grid(26, None);
        let handler = FdmDividendHandler::new(&[Dividend::new(0.5, 2.0).unwrap()], Arc::clone(&mesher), 0).unwrap();
        let s = mesher.locations(0).map(|x| x.exp());
        let mut a = s.clone();
        handler.apply_to(&mut a, 0.5).unwrap();
        for i in 0..26 {
            assert_abs_diff_eq!(a[i], s[0].max(s[i] - 2.0), epsilon = 1e-9);
        }
        assert_eq!(handler.stopping_times(), vec![0.5]);
    }

    #[test]
    fn other_times_leave_values_alone() {
        let mesher = spot_grid(10, Some(3));
        let handler = FdmDividendHandler::new(&[Dividend::new(0.5, 2.0).unwrap()], mesher, 0).unwrap();
        let mut a = Array::from_element(30, 1.0);
        handler.apply_to(&mut a, 0.25).unwrap();
        assert!(a.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn every_line_of_a_2d_grid_is_shifted() {
        let mesher = spot_grid(12, Some(4));
        let handler = FdmDividendHandler::new(&[Dividend::new(1.0, 5.0).unwrap()], Arc::clone(&mesher), 0).unwrap();
        let x = mesher.locations(0);
        let y = mesher.locations(1);
        let mut a = x.zip_map(&y, |x, y| x.exp() * (1.0 + y));
        handler.apply_to(&mut a, 1.0).unwrap();
        let s_min = 3f64.exp();
        for i in 0..a.size() {
            let expected = s_min.max(x[i].exp() - 5.0) * (1.0 + y[i]);
            assert_abs_diff_eq!(a[i], expected, epsilon = 1e-9);
        }
    }
}
