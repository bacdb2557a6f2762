//! Memory layout of an N-dimensional finite-difference grid
//! (translates `ql/methods/finitedifferences/operators/fdmlinearoplayout.hpp`
//! and `fdmlinearopiterator.hpp`).
//!
//! Grid values are stored in a flat array. Axis 0 varies fastest, the last
//! axis slowest.

use ql_core::{errors::Error, errors::Result};

/// Maps multi-indices of an N-dimensional grid to flat array positions.
///
/// Corresponds to `QuantLib::FdmLinearOpLayout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpLayout {
    dim: Vec<usize>,
    spacing: Vec<usize>,
    size: usize,
}

impl FdmLinearOpLayout {
    /// Create a layout with `dim[i]` points along axis `i`.
    ///
    /// # Errors
    /// [`Error::InvalidGrid`] for an empty dimension list or an axis without
    /// points.
    pub fn new(dim: Vec<usize>) -> Result<Self> {
        if dim.is_empty() {
            return Err(Error::InvalidGrid("layout needs at least one axis".into()));
        }
        if let Some(axis) = dim.iter().position(|&n| n == 0) {
            return Err(Error::InvalidGrid(format!("axis {axis} has no points")));
        }
        let mut spacing = Vec::with_capacity(dim.len());
        let mut size = 1usize;
        for &n in &dim {
            spacing.push(size);
            size = size
                .checked_mul(n)
                .ok_or_else(|| Error::InvalidGrid("layout size overflows".into()))?;
        }
        Ok(Self { dim, spacing, size })
    }

    /// Total number of grid points.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Points per axis.
    pub fn dim(&self) -> &[usize] {
        &self.dim
    }

    /// Flat-index stride of each axis.
    pub fn spacing(&self) -> &[usize] {
        &self.spacing
    }

    /// The flat index of `coordinates`.
    pub fn index(&self, coordinates: &[usize]) -> usize {
        coordinates
            .iter()
            .zip(&self.spacing)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// The multi-index of flat position `index`.
    pub fn coordinates(&self, index: usize) -> Vec<usize> {
        let mut rest = index;
        self.dim
            .iter()
            .map(|&n| {
                let c = rest % n;
                rest /= n;
                c
            })
            .collect()
    }

    /// Iterator positioned on the first grid point.
    pub fn begin(&self) -> FdmLinearOpIterator {
        FdmLinearOpIterator {
            index: 0,
            coordinates: vec![0; self.dim.len()],
            dim: self.dim.clone(),
        }
    }

    /// All grid points, axis 0 fastest.
    pub fn iter(&self) -> LayoutIter {
        LayoutIter {
            current: Some(self.begin()),
        }
    }

    /// Flat index of the point `offset` steps along `axis` from `iter`.
    ///
    /// Offsets leaving the grid are clamped onto the boundary point.
    pub fn neighbourhood(&self, iter: &FdmLinearOpIterator, axis: usize, offset: isize) -> usize {
        let c = iter.coordinates[axis];
        let moved = self.clamp(axis, c, offset);
        iter.index + moved * self.spacing[axis] - c * self.spacing[axis]
    }

    /// Flat index of the point shifted along two axes at once.
    pub fn neighbourhood2(
        &self,
        iter: &FdmLinearOpIterator,
        axis1: usize,
        offset1: isize,
        axis2: usize,
        offset2: isize,
    ) -> usize {
        let c1 = iter.coordinates[axis1];
        let c2 = iter.coordinates[axis2];
        let m1 = self.clamp(axis1, c1, offset1);
        let m2 = self.clamp(axis2, c2, offset2);
        iter.index + m1 * self.spacing[axis1] + m2 * self.spacing[axis2]
            - c1 * self.spacing[axis1]
            - c2 * self.spacing[axis2]
    }

    fn clamp(&self, axis: usize, c: usize, offset: isize) -> usize {
        let last = self.dim[axis] as isize - 1;
        (c as isize + offset).clamp(0, last) as usize
    }
}

/// A position on the grid: flat index plus multi-index.
///
/// Corresponds to `QuantLib::FdmLinearOpIterator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpIterator {
    index: usize,
    coordinates: Vec<usize>,
    dim: Vec<usize>,
}

impl FdmLinearOpIterator {
    /// Flat index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Multi-index.
    pub fn coordinates(&self) -> &[usize] {
        &self.coordinates
    }

    /// Advance to the next grid point; returns `false` past the end.
    pub fn increment(&mut self) -> bool {
        self.index += 1;
        for (c, &n) in self.coordinates.iter_mut().zip(&self.dim) {
            *c += 1;
            if *c < n {
                return true;
            }
            *c = 0;
        }
        false
    }
}

/// Iterator over every point of an [`FdmLinearOpLayout`].
#[derive(Debug, Clone)]
pub struct LayoutIter {
    current: Option<FdmLinearOpIterator>,
}

impl Iterator for LayoutIter {
    type Item = FdmLinearOpIterator;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.current.take()?;
        let mut next = item.clone();
        if next.increment() {
            self.current = Some(next);
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn axis_zero_varies_fastest() {
        let layout = FdmLinearOpLayout::new(vec![3, 2]).unwrap();
        let coords: Vec<Vec<usize>> = layout.iter().map(|i| i.coordinates().to_vec()).collect();
        assert_eq!(
            coords,
            vec![
                vec![0, 0],
                vec![1, 0],
                vec![2, 0],
                vec![0, 1],
                vec![1, 1],
                vec![2, 1]
            ]
        );
        assert_eq!(layout.spacing(), &[1, 3]);
    }

    #[test]
    fn neighbours_are_clamped_at_the_boundary() {
        let layout = FdmLinearOpLayout::new(vec![4, 3]).unwrap();
        let first = layout.begin();
        assert_eq!(layout.neighbourhood(&first, 0, -1), 0);
        assert_eq!(layout.neighbourhood(&first, 0, 1), 1);
        assert_eq!(layout.neighbourhood(&first, 1, 5), 8);

        let last = layout.iter().last().unwrap();
        assert_eq!(last.index(), 11);
        assert_eq!(layout.neighbourhood(&last, 0, 1), 11);
        assert_eq!(layout.neighbourhood2(&last, 0, -1, 1, -1), 6);
        assert_eq!(layout.neighbourhood2(&last, 0, 1, 1, 1), 11);
    }

    #[test]
    fn rejects_empty_layouts() {
        assert!(matches!(FdmLinearOpLayout::new(vec![]), Err(Error::InvalidGrid(_))));
        assert!(matches!(FdmLinearOpLayout::new(vec![3, 0]), Err(Error::InvalidGrid(_))));
    }

    proptest! {
        #[test]
        fn iteration_is_a_bijection(dims in proptest::collection::vec(1usize..6, 1..4)) {
            let layout = FdmLinearOpLayout::new(dims.clone()).unwrap();
            let expected: usize = dims.iter().product();
            prop_assert_eq!(layout.size(), expected);

            let mut seen = vec![false; expected];
            let mut count = 0;
            for iter in layout.iter() {
                prop_assert!(!seen[iter.index()]);
                seen[iter.index()] = true;
                prop_assert_eq!(layout.index(iter.coordinates()), iter.index());
                prop_assert_eq!(layout.coordinates(iter.index()), iter.coordinates().to_vec());
                count += 1;
            }
            prop_assert_eq!(count, expected);
            prop_assert!(seen.iter().all(|&s| s));
        }
    }
}
