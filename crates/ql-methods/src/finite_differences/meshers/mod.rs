//! Spatial discretisation (translates `ql/methods/finitedifferences/meshers/`).
//!
//! A 1-D mesher is a strictly increasing set of locations along one axis.
//! An N-D mesher ([`FdmMesher`]) attaches a layout to one 1-D mesher per
//! axis and answers location and spacing queries for any grid point.

mod concentrating_1d_mesher;
mod exponential_jump_1d_mesher;
mod fdm_black_scholes_mesher;
mod fdm_heston_variance_mesher;
mod fdm_mesher_composite;
mod fdm_simple_process_1d_mesher;
mod predefined_1d_mesher;
mod uniform_1d_mesher;
mod uniform_grid_mesher;

pub use concentrating_1d_mesher::Concentrating1dMesher;
pub use exponential_jump_1d_mesher::ExponentialJump1dMesher;
pub use fdm_black_scholes_mesher::{BlackScholesMesherConfig, FdmBlackScholesMesher};
pub use fdm_heston_variance_mesher::FdmHestonVarianceMesher;
pub use fdm_mesher_composite::FdmMesherComposite;
pub use fdm_simple_process_1d_mesher::FdmSimpleProcess1dMesher;
pub use predefined_1d_mesher::Predefined1dMesher;
pub use uniform_1d_mesher::Uniform1dMesher;
pub use uniform_grid_mesher::UniformGridMesher;

use crate::finite_differences::operators::{FdmLinearOpIterator, FdmLinearOpLayout};
use ql_core::{errors::Error, errors::Result, Real};
use ql_math::Array;
use std::fmt::Debug;
use std::sync::Arc;

/// Locations along a single axis.
///
/// Spacings at the two ends mirror their only neighbour, so `dplus` and
/// `dminus` are finite everywhere.
///
/// Corresponds to `QuantLib::Fdm1dMesher`.
pub trait Fdm1dMesher: Debug + Send + Sync {
    /// The grid locations, strictly increasing.
    fn locations(&self) -> &[Real];

    /// Number of points.
    fn size(&self) -> usize {
        self.locations().len()
    }

    /// Distance to the next point.
    fn dplus(&self, i: usize) -> Real {
        let x = self.locations();
        if i + 1 < x.len() {
            x[i + 1] - x[i]
        } else {
            x[i] - x[i - 1]
        }
    }

    /// Distance to the previous point.
    fn dminus(&self, i: usize) -> Real {
        let x = self.locations();
        if i > 0 {
            x[i] - x[i - 1]
        } else {
            x[1] - x[0]
        }
    }
}

/// Locations and spacings of an N-dimensional grid.
///
/// Corresponds to `QuantLib::FdmMesher`.
pub trait FdmMesher: Debug + Send + Sync {
    /// The grid layout.
    fn layout(&self) -> &Arc<FdmLinearOpLayout>;

    /// Distance to the next point along `direction`.
    fn dplus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real;

    /// Distance to the previous point along `direction`.
    fn dminus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real;

    /// Coordinate of `iter` along `direction`.
    fn location(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real;

    /// Coordinate along `direction` of every grid point, in flat order.
    fn locations(&self, direction: usize) -> Array {
        self.layout()
            .iter()
            .map(|iter| self.location(&iter, direction))
            .collect()
    }
}

/// Validate a freshly computed set of 1-D locations.
pub(crate) fn checked_locations(locations: Vec<Real>) -> Result<Vec<Real>> {
    if locations.len() < 2 {
        return Err(Error::InvalidGrid(format!(
            "a mesher needs at least two points, got {}",
            locations.len()
        )));
    }
    if let Some(i) = locations.iter().position(|x| !x.is_finite()) {
        return Err(Error::InvalidGrid(format!("non-finite location at index {i}")));
    }
    if let Some(i) = locations.windows(2).position(|w| w[1] <= w[0]) {
        return Err(Error::InvalidGrid(format!(
            "locations not strictly increasing at index {}: {} then {}",
            i + 1,
            locations[i],
            locations[i + 1]
        )));
    }
    Ok(locations)
}
