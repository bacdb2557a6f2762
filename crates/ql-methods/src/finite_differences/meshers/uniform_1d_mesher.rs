use super::{checked_locations, Fdm1dMesher};
use ql_core::{errors::Error, errors::Result, Real};

/// Equally spaced points on `[start, end]`.
///
/// Corresponds to `QuantLib::Uniform1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform1dMesher {
    locations: Vec<Real>,
}

impl Uniform1dMesher {
    /// # Errors
    /// [`Error::InvalidGrid`] for fewer than two points or `end <= start`.
    pub fn new(start: Real, end: Real, size: usize) -> Result<Self> {
        if size < 2 {
            return Err(Error::InvalidGrid(format!("at least two points required, got {size}")));
        }
        let dx = (end - start) / (size - 1) as Real;
        let mut locations: Vec<Real> = (0..size).map(|i| start + i as Real * dx).collect();
        locations[size - 1] = end;
        Ok(Self {
            locations: checked_locations(locations)?,
        })
    }
}

impl Fdm1dMesher for Uniform1dMesher {
    fn locations(&self) -> &[Real] {
        &self.locations
    }
}
