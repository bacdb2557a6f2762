//! Chi-square distributions (translates `ql/math/distributions/chisquaredistribution.hpp`).
//!
//! The central distribution wraps `statrs`' `ChiSquared`. The non-central
//! one is evaluated as a Poisson mixture of central distributions,
//!
//! ```text
//! F(x; k, λ) = Σⱼ e^{-λ/2} (λ/2)ʲ / j! · P(χ²_{k+2j} ≤ x)
//! ```
//!
//! summed over a window around the mode of the Poisson weights.

use ql_core::{
    errors::{Error, Result},
    Real,
};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::gamma::ln_gamma;
use std::cell::RefCell;

use crate::solvers1d::brent;

/// Cumulative distribution of a central chi-square with `df` degrees of freedom.
pub fn chi_square_cdf(df: Real, x: Real) -> Result<Real> {
    if x <= 0.0 {
        return Ok(0.0);
    }
    let dist = ChiSquared::new(df)
        .map_err(|e| Error::InvalidArgument(format!("chi-square with df = {df}: {e}")))?;
    Ok(dist.cdf(x))
}

/// Non-central chi-square distribution with `df` degrees of freedom and
/// non-centrality `ncp`.
///
/// Corresponds to `QuantLib::NonCentralCumulativeChiSquareDistribution` and
/// its inverse.
#[derive(Debug, Clone, Copy)]
pub struct NonCentralChiSquareDistribution {
    df: Real,
    ncp: Real,
}

impl NonCentralChiSquareDistribution {
    /// # Errors
    /// `df` must be positive and `ncp` non-negative, both finite.
    pub fn new(df: Real, ncp: Real) -> Result<Self> {
        ql_core::ensure!(df > 0.0 && df.is_finite(), "degrees of freedom must be positive, got {df}");
        ql_core::ensure!(ncp >= 0.0 && ncp.is_finite(), "non-centrality must be non-negative, got {ncp}");
        Ok(Self { df, ncp })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> Real {
        self.df
    }

    /// Non-centrality parameter.
    pub fn ncp(&self) -> Real {
        self.ncp
    }

    /// Mean `k + λ`.
    pub fn mean(&self) -> Real {
        self.df + self.ncp
    }

    /// `P(X ≤ x)`.
    pub fn cdf(&self, x: Real) -> Result<Real> {
        if x <= 0.0 {
            return Ok(0.0);
        }
        let half = 0.5 * self.ncp;
        if half == 0.0 {
            return chi_square_cdf(self.df, x);
        }

        let mode = half.floor();
        let spread = 10.0 * mode.sqrt() + 10.0;
        let lo = (mode - spread).max(0.0) as usize;
        let hi = (mode + spread) as usize;

        let mut sum = 0.0;
        for j in lo..=hi {
            let jf = j as Real;
            let weight = (-half + jf * half.ln() - ln_gamma(jf + 1.0)).exp();
            if weight == 0.0 {
                continue;
            }
            sum += weight * chi_square_cdf(self.df + 2.0 * jf, x)?;
        }
        Ok(sum.clamp(0.0, 1.0))
    }

    /// Quantile: the `x` with `P(X ≤ x) = p`, for `p` in `[0, 1)`.
    pub fn inverse_cdf(&self, p: Real) -> Result<Real> {
        ql_core::ensure!((0.0..1.0).contains(&p), "probability must be in [0, 1), got {p}");
        if p == 0.0 {
            return Ok(0.0);
        }

        let mut upper = self.mean().max(1.0);
        let mut expansions = 0;
        while self.cdf(upper)? < p {
            upper *= 2.0;
            expansions += 1;
            if expansions > 100 {
                return Err(Error::MaxIterationsExceeded {
                    method: "NonCentralChiSquareDistribution::inverse_cdf",
                    iterations: expansions,
                });
            }
        }

        let failure = RefCell::new(None);
        let root = brent(
            |x| match self.cdf(x) {
                Ok(c) => c - p,
                Err(e) => {
                    failure.borrow_mut().get_or_insert(e);
                    Real::NAN
                }
            },
            0.0,
            upper,
            1e-12 * upper.max(1.0),
        );
        match failure.into_inner() {
            Some(e) => Err(e),
            None => root,
        }
    }
}
