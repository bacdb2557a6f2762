//! Normal (Gaussian) distribution (translates `ql/math/distributions/normaldistribution.hpp`).
//!
//! Delegates to `statrs`' standard normal, which is accurate to machine
//! precision in the body and the tails.

use ql_core::Real;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use std::f64::consts::PI;

/// The standard normal probability density function.
///
/// `φ(x) = exp(-x²/2) / √(2π)`
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

fn standard() -> Normal {
    Normal::standard()
}

/// The standard normal cumulative distribution function Φ(x).
pub fn normal_cdf(x: Real) -> Real {
    standard().cdf(x)
}

/// The inverse standard normal CDF Φ⁻¹(p).
///
/// Returns `-∞` / `+∞` at `p = 0` / `p = 1` and NaN outside `[0, 1]`.
pub fn normal_cdf_inverse(p: Real) -> Real {
    if !(0.0..=1.0).contains(&p) {
        return Real::NAN;
    }
    standard().inverse_cdf(p)
}

/// Normal density with mean `mu` and standard deviation `sigma`.
pub fn normal_pdf_with(x: Real, mu: Real, sigma: Real) -> Real {
    Normal::new(mu, sigma).map(|n| n.pdf(x)).unwrap_or(Real::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn normal_pdf_at_zero() {
        assert_abs_diff_eq!(normal_pdf(0.0), 1.0 / (2.0 * PI).sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(normal_pdf_with(1.0, 1.0, 2.0), normal_pdf(0.0) / 2.0, epsilon = 1e-15);
    }

    #[test]
    fn normal_cdf_reference_values() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_relative_eq!(normal_cdf(1.959_963_984_540_054), 0.975, epsilon = 1e-10);
        assert_relative_eq!(
            normal_cdf(-3.0),
            0.001_349_898_031_630_094_6,
            epsilon = 1e-12,
            max_relative = 1e-9
        );
    }

    #[test]
    fn inverse_cdf_roundtrip() {
        for &p in &[1e-6, 0.01, 0.3, 0.5, 0.8, 0.9999] {
            assert_relative_eq!(normal_cdf(normal_cdf_inverse(p)), p, epsilon = 1e-10, max_relative = 1e-9);
        }
        assert!(normal_cdf_inverse(1.5).is_nan());
    }
}
