use super::{checked_locations, Fdm1dMesher};
use ql_core::{ensure, errors::Error, errors::Result, Real};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};

/// Points on `[start, end]` concentrated around a point.
///
/// With a concentration point `c` and density `d` (relative to the interval
/// length), location `i` is `c + d·sinh(c1·(1 − u) + c2·u)` where `u` runs
/// uniformly over `[0, 1]`. Without a concentration point the mesh is
/// uniform.
///
/// Corresponds to `QuantLib::Concentrating1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct Concentrating1dMesher {
    locations: Vec<Real>,
}

impl Concentrating1dMesher {
    /// Create a mesher. `c_point` is `(point, density)`; when
    /// `require_c_point` is set the point itself becomes a grid node.
    ///
    /// # Errors
    /// [`Error::InvalidGrid`] for fewer than two points or an empty interval,
    /// a precondition error for a point outside `[start, end]` or a
    /// non-positive density.
    pub fn new(
        start: Real,
        end: Real,
        size: usize,
        c_point: Option<(Real, Real)>,
        require_c_point: bool,
    ) -> Result<Self> {
        if size < 2 {
            return Err(Error::InvalidGrid(format!("at least two points required, got {size}")));
        }
        if !(end > start) {
            return Err(Error::InvalidGrid(format!("end {end} must be larger than start {start}")));
        }

        let dx = 1.0 / (size - 1) as Real;
        let mut locations = vec![0.0; size];

        match c_point {
            Some((c, relative_density)) => {
                ensure!(
                    c >= start && c <= end,
                    "concentration point {c} must lie in [{start}, {end}]"
                );
                let density = relative_density * (end - start);
                ensure!(density > 0.0, "density must be positive, got {relative_density}");

                let c1 = ((start - c) / density).asinh();
                let c2 = ((end - c) / density).asinh();

                let transform = if require_c_point {
                    let z0 = -c1 / (c2 - c1);
                    let n = (size - 1) as Real;
                    let u0 = (z0 * n).round().clamp(1.0, (size as Real - 2.0).max(1.0)) / n;
                    if u0 > 0.0 && u0 < 1.0 {
                        Some(LinearInterpolation::new(&[0.0, u0, 1.0], &[0.0, z0, 1.0])?)
                    } else {
                        None
                    }
                } else {
                    None
                };

                for (i, loc) in locations.iter_mut().enumerate().take(size - 1).skip(1) {
                    let u = i as Real * dx;
                    let li = transform.as_ref().map_or(u, |t| t.operator(u));
                    *loc = c + density * (c1 * (1.0 - li) + c2 * li).sinh();
                }
            }
            None => {
                for (i, loc) in locations.iter_mut().enumerate().take(size - 1).skip(1) {
                    *loc = start + i as Real * dx * (end - start);
                }
            }
        }
        locations[0] = start;
        locations[size - 1] = end;

        Ok(Self {
            locations: checked_locations(locations)?,
        })
    }
}

impl Fdm1dMesher for Concentrating1dMesher {
    fn locations(&self) -> &[Real] {
        &self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn without_concentration_the_mesh_is_uniform() {
        let m = Concentrating1dMesher::new(0.0, 1.0, 11, None, false).unwrap();
        for i in 0..10 {
            assert_abs_diff_eq!(m.dplus(i), 0.1, epsilon = 1e-14);
        }
    }

    #[test]
    fn points_cluster_around_the_concentration_point() {
        let m = Concentrating1dMesher::new(0.0, 10.0, 51, Some((5.0, 0.05)), false).unwrap();
        let x = m.locations();
        let near = x.windows(2).filter(|w| w[0] <= 5.0 && w[1] >= 5.0).map(|w| w[1] - w[0]);
        let spacing_at_c = near.fold(Real::INFINITY, Real::min);
        assert!(spacing_at_c < 0.2 * m.dplus(0));
        assert_eq!(x[0], 0.0);
        assert_eq!(x[50], 10.0);
    }

    #[test]
    fn required_point_is_a_node() {
        let m = Concentrating1dMesher::new(-1.0, 2.0, 40, Some((0.3, 0.1)), true).unwrap();
        assert!(m.locations().iter().any(|&x| (x - 0.3).abs() < 1e-12));
    }

    #[test]
    fn rejects_point_outside_interval() {
        assert!(Concentrating1dMesher::new(0.0, 1.0, 10, Some((2.0, 0.1)), false).is_err());
        assert!(Concentrating1dMesher::new(0.0, 1.0, 10, Some((0.5, -0.1)), false).is_err());
    }
}
