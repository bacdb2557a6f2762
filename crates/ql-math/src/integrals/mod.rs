//! Numerical integration (translates `ql/math/integrals/`).
//!
//! The adaptive Gauss-Lobatto rule of Gander & Gautschi is the integrator
//! used by the meshers and inner-value calculators; fixed Gaussian rules
//! (Hermite, Laguerre) live in [`gaussianquadratures`].

pub mod gaussianquadratures;

pub use gaussianquadratures::{GaussHermiteIntegration, GaussLaguerreIntegration, GaussianQuadrature};

use ql_core::{
    errors::{Error, Result},
    Real,
};

/// A numerical integrator.
///
/// Corresponds to the abstract `QuantLib::Integrator` class.
pub trait Integrator {
    /// Integrate `f` on `[a, b]`.
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real>;
}

// ── Gauss-Lobatto ─────────────────────────────────────────────────────────────

const ALPHA: Real = 0.816_496_580_927_726_0; // sqrt(2/3)
const BETA: Real = 0.447_213_595_499_957_9; // 1/sqrt(5)
const X1: Real = 0.942_882_415_695_479_719_06;
const X2: Real = 0.641_853_342_345_781_305_78;
const X3: Real = 0.236_383_199_662_149_880_28;

/// Adaptive Gauss-Lobatto integration with a hard evaluation budget.
///
/// Each interval is estimated by a 4-point Gauss-Lobatto rule and its
/// 7-point Kronrod extension; intervals whose two estimates differ by less
/// than the termination tolerance are accepted, the rest are split into six.
/// Pending intervals are kept on an explicit stack together with the
/// evaluation count.
///
/// Corresponds to `QuantLib::GaussLobattoIntegral`.
#[derive(Debug, Clone)]
pub struct GaussLobattoIntegral {
    absolute_accuracy: Real,
    relative_accuracy: Option<Real>,
    max_evaluations: usize,
    use_convergence_estimate: bool,
}

impl GaussLobattoIntegral {
    /// Create a new integrator.
    pub fn new(absolute_accuracy: Real, max_evaluations: usize) -> Self {
        Self {
            absolute_accuracy,
            relative_accuracy: None,
            max_evaluations,
            use_convergence_estimate: true,
        }
    }

    /// Also stop once the relative accuracy `rel` is reached.
    pub fn with_relative_accuracy(mut self, rel: Real) -> Self {
        self.relative_accuracy = Some(rel);
        self
    }

    /// Disable the convergence-rate correction of the tolerance.
    pub fn without_convergence_estimate(mut self) -> Self {
        self.use_convergence_estimate = false;
        self
    }

    /// Maximum number of function evaluations.
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    /// Termination tolerance from a 13-point Kronrod estimate over `[a, b]`.
    fn termination_tolerance<F: Fn(Real) -> Real>(&self, f: &F, a: Real, b: Real) -> Result<Real> {
        let rel_tol = self.relative_accuracy.unwrap_or(0.0).max(f64::EPSILON);

        let m = 0.5 * (a + b);
        let h = 0.5 * (b - a);
        let y1 = f(a);
        let y3 = f(m - ALPHA * h);
        let y5 = f(m - BETA * h);
        let y7 = f(m);
        let y9 = f(m + BETA * h);
        let y11 = f(m + ALPHA * h);
        let y13 = f(b);

        let f1 = f(m - X1 * h);
        let f2 = f(m + X1 * h);
        let f3 = f(m - X2 * h);
        let f4 = f(m + X2 * h);
        let f5 = f(m - X3 * h);
        let f6 = f(m + X3 * h);

        let acc = h
            * (0.015_827_191_973_480_183_1 * (y1 + y13)
                + 0.094_273_840_218_850_045_5 * (f1 + f2)
                + 0.155_071_987_336_585_396_3 * (y3 + y11)
                + 0.188_821_573_960_182_454_4 * (f3 + f4)
                + 0.199_773_405_226_858_526_8 * (y5 + y9)
                + 0.224_926_465_333_339_527_0 * (f5 + f6)
                + 0.242_611_071_901_407_733_8 * y7);

        if acc == 0.0
            && [f1, f2, f3, f4, f5, f6].iter().any(|v| *v != 0.0)
        {
            return Err(Error::Runtime(
                "GaussLobattoIntegral: can not calculate absolute accuracy from relative accuracy"
                    .into(),
            ));
        }

        let mut r = 1.0;
        if self.use_convergence_estimate {
            let integral2 = (h / 6.0) * (y1 + y13 + 5.0 * (y5 + y9));
            let integral1 = (h / 1470.0)
                * (77.0 * (y1 + y13) + 432.0 * (y3 + y11) + 625.0 * (y5 + y9) + 672.0 * y7);
            if (integral2 - acc).abs() != 0.0 {
                r = (integral1 - acc).abs() / (integral2 - acc).abs();
            }
            if r == 0.0 || r > 1.0 {
                r = 1.0;
            }
        }

        Ok(match self.relative_accuracy {
            Some(_) => self.absolute_accuracy.min(acc * rel_tol) / (r * f64::EPSILON),
            None => self.absolute_accuracy / (r * f64::EPSILON),
        })
    }
}

impl Integrator for GaussLobattoIntegral {
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real> {
        if a == b {
            return Ok(0.0);
        }
        if b < a {
            return self.integrate(f, b, a).map(|v| -v);
        }
        let tolerance = self.termination_tolerance(&f, a, b)?;
        let mut evaluations = 13 + 2;

        let mut total = 0.0;
        let mut pending = vec![(a, b, f(a), f(b))];
        while let Some((a, b, fa, fb)) = pending.pop() {
            if evaluations >= self.max_evaluations {
                return Err(Error::MaxIterationsExceeded {
                    method: "GaussLobattoIntegral",
                    iterations: self.max_evaluations,
                });
            }

            let h = 0.5 * (b - a);
            let m = 0.5 * (a + b);
            let mll = m - ALPHA * h;
            let ml = m - BETA * h;
            let mr = m + BETA * h;
            let mrr = m + ALPHA * h;

            let fmll = f(mll);
            let fml = f(ml);
            let fm = f(m);
            let fmr = f(mr);
            let fmrr = f(mrr);
            evaluations += 5;

            let integral2 = (h / 6.0) * (fa + fb + 5.0 * (fml + fmr));
            let integral1 = (h / 1470.0)
                * (77.0 * (fa + fb) + 432.0 * (fmll + fmrr) + 625.0 * (fml + fmr) + 672.0 * fm);

            let dist = tolerance + (integral1 - integral2);
            if dist == tolerance || mll <= a || b <= mrr {
                if !(m > a && b > m) {
                    return Err(Error::Runtime(
                        "Interval contains no more machine number".into(),
                    ));
                }
                total += integral1;
            } else {
                pending.push((mrr, b, fmrr, fb));
                pending.push((mr, mrr, fmr, fmrr));
                pending.push((m, mr, fm, fmr));
                pending.push((ml, m, fml, fm));
                pending.push((mll, ml, fmll, fml));
                pending.push((a, mll, fa, fmll));
            }
        }
        Ok(total)
    }
}
