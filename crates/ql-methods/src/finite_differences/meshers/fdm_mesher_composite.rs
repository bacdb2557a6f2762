use super::{Fdm1dMesher, FdmMesher};
use crate::finite_differences::operators::{FdmLinearOpIterator, FdmLinearOpLayout};
use ql_core::{errors::Error, errors::Result, Real};
use std::sync::Arc;

/// Cartesian product of 1-D meshers.
///
/// Corresponds to `QuantLib::FdmMesherComposite`.
#[derive(Debug, Clone)]
pub struct FdmMesherComposite {
    layout: Arc<FdmLinearOpLayout>,
    meshers: Vec<Arc<dyn Fdm1dMesher>>,
}

impl FdmMesherComposite {
    /// One axis per mesher, in order.
    ///
    /// # Errors
    /// [`Error::InvalidGrid`] when a mesher has fewer than two points.
    pub fn new(meshers: Vec<Arc<dyn Fdm1dMesher>>) -> Result<Self> {
        check_axes(&meshers)?;
        let dim = meshers.iter().map(|m| m.size()).collect();
        let layout = Arc::new(FdmLinearOpLayout::new(dim)?);
        Ok(Self { layout, meshers })
    }

    /// Attach meshers to an existing layout.
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] when the number of meshers or any of
    /// their sizes disagrees with the layout, [`Error::InvalidGrid`] when a
    /// mesher has fewer than two points.
    pub fn with_layout(layout: Arc<FdmLinearOpLayout>, meshers: Vec<Arc<dyn Fdm1dMesher>>) -> Result<Self> {
        check_axes(&meshers)?;
        if layout.dim().len() != meshers.len() {
            return Err(Error::DimensionMismatch {
                expected: layout.dim().len(),
                found: meshers.len(),
            });
        }
        for (&n, m) in layout.dim().iter().zip(&meshers) {
            if n != m.size() {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    found: m.size(),
                });
            }
        }
        Ok(Self { layout, meshers })
    }

    /// Convenience constructor for one axis.
    pub fn from_1d(mesher: Arc<dyn Fdm1dMesher>) -> Result<Self> {
        Self::new(vec![mesher])
    }

    /// The per-axis meshers.
    pub fn fdm_1d_meshers(&self) -> &[Arc<dyn Fdm1dMesher>] {
        &self.meshers
    }
}

fn check_axes(meshers: &[Arc<dyn Fdm1dMesher>]) -> Result<()> {
    for (axis, m) in meshers.iter().enumerate() {
        if m.size() < 2 {
            return Err(Error::InvalidGrid(format!(
                "axis {axis} needs at least two points, got {}",
                m.size()
            )));
        }
    }
    Ok(())
}

impl FdmMesher for FdmMesherComposite {
    fn layout(&self) -> &Arc<FdmLinearOpLayout> {
        &self.layout
    }

    fn dplus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.meshers[direction].dplus(iter.coordinates()[direction])
    }

    fn dminus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.meshers[direction].dminus(iter.coordinates()[direction])
    }

    fn location(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.meshers[direction].locations()[iter.coordinates()[direction]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Predefined1dMesher, Uniform1dMesher};

    #[test]
    fn locations_follow_the_layout() {
        let x: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 1.0, 3).unwrap());
        let y: Arc<dyn Fdm1dMesher> = Arc::new(Predefined1dMesher::new(vec![10.0, 20.0]).unwrap());
        let mesher = FdmMesherComposite::new(vec![x, y]).unwrap();
        assert_eq!(mesher.layout().size(), 6);
        assert_eq!(mesher.locations(0).as_slice(), &[0.0, 0.5, 1.0, 0.0, 0.5, 1.0]);
        assert_eq!(mesher.locations(1).as_slice(), &[10.0, 10.0, 10.0, 20.0, 20.0, 20.0]);
    }

    #[test]
    fn mismatched_layout_is_rejected() {
        let x: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 1.0, 3).unwrap());
        let layout = Arc::new(FdmLinearOpLayout::new(vec![4]).unwrap());
        assert_eq!(
            FdmMesherComposite::with_layout(layout, vec![Arc::clone(&x)]).unwrap_err(),
            Error::DimensionMismatch { expected: 4, found: 3 }
        );
        let layout = Arc::new(FdmLinearOpLayout::new(vec![3, 2]).unwrap());
        assert!(matches!(
            FdmMesherComposite::with_layout(layout, vec![x]),
            Err(Error::DimensionMismatch { expected: 2, found: 1 })
        ));
    }

    #[derive(Debug)]
    struct SinglePoint(Vec<Real>);

    impl Fdm1dMesher for SinglePoint {
        fn locations(&self) -> &[Real] {
            &self.0
        }
    }

    #[test]
    fn axis_with_a_single_point_is_rejected() {
        let single: Arc<dyn Fdm1dMesher> = Arc::new(SinglePoint(vec![1.0]));
        let x: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 1.0, 3).unwrap());
        assert!(matches!(
            FdmMesherComposite::new(vec![Arc::clone(&x), Arc::clone(&single)]),
            Err(Error::InvalidGrid(_))
        ));
        let layout = Arc::new(FdmLinearOpLayout::new(vec![1]).unwrap());
        assert!(matches!(
            FdmMesherComposite::with_layout(layout, vec![single]),
            Err(Error::InvalidGrid(_))
        ));
        let empty: Arc<dyn Fdm1dMesher> = Arc::new(SinglePoint(Vec::new()));
        assert!(matches!(FdmMesherComposite::from_1d(empty), Err(Error::InvalidGrid(_))));
    }
}
