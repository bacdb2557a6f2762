use super::{
    direction_error, map_rows, FdmExtendedOrnsteinUhlenbeckOp, FdmLinearOpComposite, FirstDerivativeOp,
    TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Error, errors::Result, Real, Time};
use ql_math::integrals::GaussLaguerreIntegration;
use ql_math::interpolations::locate;
use ql_math::Array;
use ql_processes::ExtOUWithJumpsProcess;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Generator of the two-factor Kluge model `ln S = X + Y` on the `(x, y)`
/// grid: the extended OU operator along `x`, jump mean reversion
/// `−βy ∂y` along `y` and the exponential jump integral
///
/// `λ (∫₀^∞ u(y + z/η) e^{−z} dz − u(y))`.
///
/// The integral is a fixed sparse matrix: Gauss-Laguerre nodes are mapped
/// onto the `y` grid by linear interpolation, extrapolating beyond the top
/// node.
///
/// Corresponds to `QuantLib::FdmExtOUJumpOp`.
#[derive(Debug, Clone)]
pub struct FdmExtOUJumpOp {
    ou_op: FdmExtendedOrnsteinUhlenbeckOp,
    dy_map: TripleBandLinearOp,
    integro_rows: Arc<[Vec<(usize, Real)>]>,
}

impl FdmExtOUJumpOp {
    /// Default number of Gauss-Laguerre nodes.
    pub const DEFAULT_INTEGRATION_ORDER: usize = 32;

    /// Generator of `process` on a two-axis mesher, discounted on `r_ts`.
    pub fn new(
        mesher: Arc<dyn FdmMesher>,
        process: &ExtOUWithJumpsProcess,
        r_ts: Arc<dyn YieldTermStructure>,
        integration_order: usize,
    ) -> Result<Self> {
        let layout = Arc::clone(mesher.layout());
        if layout.dim().len() != 2 {
            return Err(Error::DimensionMismatch {
                expected: 2,
                found: layout.dim().len(),
            });
        }
        let ou_op = FdmExtendedOrnsteinUhlenbeckOp::new(
            Arc::clone(&mesher),
            Arc::clone(process.ext_ou_process()),
            r_ts,
            0,
        )?;
        let beta = process.beta();
        let dy_map = FirstDerivativeOp::new(1, Arc::clone(&mesher))?
            .mult(&mesher.locations(1).map(|y| -beta * y))?;

        let ny = layout.dim()[1];
        let mut y_loc = vec![0.0; ny];
        for iter in layout.iter() {
            y_loc[iter.coordinates()[1]] = mesher.location(&iter, 1);
        }

        let (eta, lambda) = (process.eta(), process.jump_intensity());
        let quadrature = GaussLaguerreIntegration::new(integration_order, 0.0);
        let integro_rows: Vec<Vec<(usize, Real)>> = layout
            .iter()
            .map(|iter| {
                let j = iter.coordinates()[1] as isize;
                let y = y_loc[j as usize];
                let mut row = vec![(iter.index(), -lambda)];
                for (&z, &w) in quadrature.x().iter().zip(quadrature.w()) {
                    let ys = y + z / eta;
                    let l = locate(&y_loc, ys);
                    let s = (ys - y_loc[l]) / (y_loc[l + 1] - y_loc[l]);
                    row.push((layout.neighbourhood(&iter, 1, l as isize - j), w * lambda * (1.0 - s)));
                    row.push((layout.neighbourhood(&iter, 1, l as isize + 1 - j), w * lambda * s));
                }
                row
            })
            .collect();

        Ok(Self {
            ou_op,
            dy_map,
            integro_rows: integro_rows.into(),
        })
    }
}

impl FdmLinearOpComposite for FdmExtOUJumpOp {
    fn size(&self) -> usize {
        2
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        self.ou_op.set_time(t1, t2)
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        Ok(self.ou_op.apply(r)? + self.dy_map.apply(r)? + self.integro(r)?)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        Ok(Array::zeros(r.size()))
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array> {
        match direction {
            0 => self.ou_op.apply(r),
            1 => self.dy_map.apply(r),
            _ => Err(direction_error(2, direction)),
        }
    }

    fn integro(&self, r: &Array) -> Result<Array> {
        if r.size() != self.integro_rows.len() {
            return Err(Error::DimensionMismatch {
                expected: self.integro_rows.len(),
                found: r.size(),
            });
        }
        let u = r.as_slice();
        Ok(map_rows(u.len(), |i| {
            self.integro_rows[i].iter().map(|&(j, w)| w * u[j]).sum()
        }))
    }

    fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array> {
        match direction {
            0 => self.ou_op.solve_splitting(0, r, a),
            1 => self.dy_map.solve_splitting(r, -a, 1.0),
            _ => Err(direction_error(2, direction)),
        }
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        self.ou_op.solve_splitting(0, r, a)
    }
}
