use super::FdmMesher;
use crate::finite_differences::operators::{FdmLinearOpIterator, FdmLinearOpLayout};
use ql_core::{errors::Error, errors::Result, Real};
use std::sync::Arc;

/// Uniform spacing on every axis of a layout.
///
/// Corresponds to `QuantLib::UniformGridMesher`.
#[derive(Debug, Clone)]
pub struct UniformGridMesher {
    layout: Arc<FdmLinearOpLayout>,
    dx: Vec<Real>,
    locations: Vec<Vec<Real>>,
}

impl UniformGridMesher {
    /// `boundaries[i]` is the `(low, high)` interval of axis `i`.
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] if the number of intervals differs from
    /// the number of axes, [`Error::InvalidGrid`] for an axis with fewer than
    /// two points or an empty interval.
    pub fn new(layout: Arc<FdmLinearOpLayout>, boundaries: &[(Real, Real)]) -> Result<Self> {
        if boundaries.len() != layout.dim().len() {
            return Err(Error::DimensionMismatch {
                expected: layout.dim().len(),
                found: boundaries.len(),
            });
        }
        let mut dx = Vec::with_capacity(boundaries.len());
        let mut locations = Vec::with_capacity(boundaries.len());
        for (axis, (&n, &(low, high))) in layout.dim().iter().zip(boundaries).enumerate() {
            if n < 2 || !(high > low) {
                return Err(Error::InvalidGrid(format!(
                    "axis {axis}: {n} points on [{low}, {high}]"
                )));
            }
            let h = (high - low) / (n - 1) as Real;
            dx.push(h);
            locations.push((0..n).map(|i| low + i as Real * h).collect());
        }
        Ok(Self { layout, dx, locations })
    }
}

impl FdmMesher for UniformGridMesher {
    fn layout(&self) -> &Arc<FdmLinearOpLayout> {
        &self.layout
    }

    fn dplus(&self, _iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.dx[direction]
    }

    fn dminus(&self, _iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.dx[direction]
    }

    fn location(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.locations[direction][iter.coordinates()[direction]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_spacing_per_axis() {
        let layout = Arc::new(FdmLinearOpLayout::new(vec![5, 3]).unwrap());
        let mesher = UniformGridMesher::new(layout, &[(0.0, 1.0), (-1.0, 1.0)]).unwrap();
        let first = mesher.layout().begin();
        assert_eq!(mesher.dplus(&first, 0), 0.25);
        assert_eq!(mesher.dminus(&first, 1), 1.0);
        assert_eq!(mesher.locations(1).as_slice()[14], 1.0);
    }

    #[test]
    fn boundary_count_must_match() {
        let layout = Arc::new(FdmLinearOpLayout::new(vec![5, 3]).unwrap());
        assert!(matches!(
            UniformGridMesher::new(layout, &[(0.0, 1.0)]),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
