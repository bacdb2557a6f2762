use super::{checked_locations, Fdm1dMesher};
use ql_core::{errors::Result, Real};

/// A mesher over caller-supplied locations.
///
/// Corresponds to `QuantLib::Predefined1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predefined1dMesher {
    locations: Vec<Real>,
}

impl Predefined1dMesher {
    /// # Errors
    /// [`ql_core::Error::InvalidGrid`] unless `locations` holds at least two
    /// finite, strictly increasing values.
    pub fn new(locations: Vec<Real>) -> Result<Self> {
        Ok(Self {
            locations: checked_locations(locations)?,
        })
    }
}

impl Fdm1dMesher for Predefined1dMesher {
    fn locations(&self) -> &[Real] {
        &self.locations
    }
}
