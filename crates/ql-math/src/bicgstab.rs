//! Biconjugate gradient stabilized solver
//! (translates `ql/math/matrixutilities/bicgstab.hpp`).
//!
//! Solves `A x = b` given only the action of `A` and of a preconditioner
//! `M ≈ A⁻¹` on a vector.

use ql_core::{
    errors::{Error, Result},
    Real,
};

use crate::array::Array;

/// Outcome of a BiCGStab run.
#[derive(Debug, Clone)]
pub struct BiCGStabResult {
    /// Iterations performed.
    pub iterations: usize,
    /// Final residual `‖b − A x‖ / ‖b‖`.
    pub error: Real,
    /// The solution.
    pub x: Array,
}

/// Preconditioned BiCGStab with a fixed iteration budget and relative
/// residual tolerance.
///
/// Corresponds to `QuantLib::BiCGstab`.
#[derive(Debug, Clone, Copy)]
pub struct BiCGStab {
    max_iterations: usize,
    rel_tolerance: Real,
}

impl BiCGStab {
    /// Create a solver.
    pub fn new(max_iterations: usize, rel_tolerance: Real) -> Self {
        Self {
            max_iterations,
            rel_tolerance,
        }
    }

    /// Solve `A x = b` starting from `x0` (zero when `None`).
    ///
    /// # Errors
    /// [`Error::MaxIterationsExceeded`] when the budget runs out, a runtime
    /// error when the iteration breaks down before reaching the tolerance,
    /// and any error raised by `a` or `m`.
    pub fn solve<A, M>(&self, a: A, m: M, b: &Array, x0: Option<&Array>) -> Result<BiCGStabResult>
    where
        A: Fn(&Array) -> Result<Array>,
        M: Fn(&Array) -> Result<Array>,
    {
        let b_norm = b.norm();
        if b_norm == 0.0 {
            return Ok(BiCGStabResult {
                iterations: 0,
                error: 0.0,
                x: b.clone(),
            });
        }

        let mut x = x0.cloned().unwrap_or_else(|| Array::zeros(b.size()));
        let mut r = b - &a(&x)?;
        let r_tld = r.clone();

        let mut p = Array::zeros(b.size());
        let mut v = Array::zeros(b.size());

        let mut omega: Real = 1.0;
        let mut rho_tld: Real = 1.0;
        let mut alpha: Real = 0.0;
        let mut error = r.norm() / b_norm;

        let mut i = 0;
        while i < self.max_iterations && error >= self.rel_tolerance {
            let rho = r_tld.dot(&r);
            if rho == 0.0 || omega == 0.0 {
                break;
            }

            if i > 0 {
                let beta = (rho / rho_tld) * (alpha / omega);
                let mut q = &p - &(omega * &v);
                q *= beta;
                p = &r + &q;
            } else {
                p = r.clone();
            }

            let p_tld = m(&p)?;
            v = a(&p_tld)?;

            alpha = rho / r_tld.dot(&v);
            let s = &r - &(alpha * &v);
            if s.norm() < self.rel_tolerance * b_norm {
                x.axpy(alpha, &p_tld);
                error = s.norm() / b_norm;
                break;
            }

            let s_tld = m(&s)?;
            let t = a(&s_tld)?;
            omega = t.dot(&s) / t.dot(&t);
            x.axpy(alpha, &p_tld);
            x.axpy(omega, &s_tld);
            r = &s - &(omega * &t);
            error = r.norm() / b_norm;
            rho_tld = rho;
            i += 1;
        }

        if i >= self.max_iterations {
            return Err(Error::MaxIterationsExceeded {
                method: "BiCGStab",
                iterations: self.max_iterations,
            });
        }
        if !(error < self.rel_tolerance) {
            return Err(Error::SolverDivergence(format!(
                "BiCGStab could not converge: residual {error:e}"
            )));
        }

        Ok(BiCGStabResult {
            iterations: i,
            error,
            x,
        })
    }
}
