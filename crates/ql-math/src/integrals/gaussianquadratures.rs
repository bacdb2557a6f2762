//! Gaussian quadrature rules (translates `ql/math/integrals/gaussianquadratures.hpp`).
//!
//! Nodes start from the eigenvalues of the Jacobi matrix of the
//! orthogonal-polynomial recurrence (Golub-Welsch) and are polished by Newton
//! steps on the recurrence itself. Each weight is the Christoffel number
//! `1 / Σₖ p̂ₖ(xᵢ)²` of its own node, with `p̂ₖ` the orthonormal polynomials.

use nalgebra::DMatrix;
use ql_core::Real;
use std::f64::consts::PI;

/// A Gauss quadrature rule defined by nodes and weights.
///
/// Corresponds to `QuantLib::GaussianQuadrature`.
#[derive(Debug, Clone)]
pub struct GaussianQuadrature {
    x: Vec<Real>,
    w: Vec<Real>,
}

impl GaussianQuadrature {
    /// Quadrature nodes, in increasing order.
    pub fn x(&self) -> &[Real] {
        &self.x
    }

    /// Quadrature weights.
    pub fn w(&self) -> &[Real] {
        &self.w
    }

    /// Number of quadrature points.
    pub fn order(&self) -> usize {
        self.x.len()
    }

    /// Evaluate ∫ f(x) w(x) dx ≈ Σ wᵢ f(xᵢ).
    pub fn integrate<F: Fn(Real) -> Real>(&self, f: F) -> Real {
        self.x.iter().zip(self.w.iter()).map(|(&xi, &wi)| wi * f(xi)).sum()
    }
}

/// Gauss-Hermite quadrature (physicists' convention: weight e^{-x²}).
///
/// Corresponds to `QuantLib::GaussHermiteIntegration`.
pub struct GaussHermiteIntegration;

impl GaussHermiteIntegration {
    /// Build a Gauss-Hermite quadrature of given `order`.
    pub fn new(order: usize) -> GaussianQuadrature {
        let alpha = vec![0.0; order];
        let beta: Vec<Real> = (1..order).map(|i| i as Real / 2.0).collect();
        golub_welsch(&alpha, &beta, PI.sqrt())
    }
}

/// Gauss-Laguerre quadrature (weight x^s e^{-x} on [0, ∞)).
///
/// Corresponds to `QuantLib::GaussLaguerreIntegration`.
pub struct GaussLaguerreIntegration;

impl GaussLaguerreIntegration {
    /// Build a generalized Gauss-Laguerre quadrature; `s = 0` gives the
    /// plain `e^{-x}` weight.
    pub fn new(order: usize, s: Real) -> GaussianQuadrature {
        let alpha: Vec<Real> = (0..order).map(|i| 2.0 * i as Real + 1.0 + s).collect();
        let beta: Vec<Real> = (1..order).map(|i| i as Real * (i as Real + s)).collect();
        golub_welsch(&alpha, &beta, statrs::function::gamma::gamma(s + 1.0))
    }
}

/// `alpha` is the diagonal of the Jacobi matrix, `beta` the squared
/// off-diagonal (length `alpha.len() - 1`), `mu0` the total weight mass.
fn golub_welsch(alpha: &[Real], beta: &[Real], mu0: Real) -> GaussianQuadrature {
    let n = alpha.len();
    if n == 0 {
        return GaussianQuadrature {
            x: vec![],
            w: vec![],
        };
    }

    let mut jacobi = DMatrix::<Real>::zeros(n, n);
    for i in 0..n {
        jacobi[(i, i)] = alpha[i];
    }
    for (i, b) in beta.iter().enumerate() {
        let off = b.abs().sqrt();
        jacobi[(i, i + 1)] = off;
        jacobi[(i + 1, i)] = off;
    }

    let mut nodes: Vec<(Real, Real)> = jacobi
        .symmetric_eigenvalues()
        .iter()
        .map(|&guess| {
            let x = polish_root(alpha, beta, mu0, guess);
            let (christoffel, _, _) = recurrence(alpha, beta, mu0, x);
            (x, 1.0 / christoffel)
        })
        .collect();
    nodes.sort_by(|a, b| a.0.total_cmp(&b.0));

    GaussianQuadrature {
        x: nodes.iter().map(|p| p.0).collect(),
        w: nodes.iter().map(|p| p.1).collect(),
    }
}

/// Newton iterations on the degree-`n` polynomial, starting from `x`.
fn polish_root(alpha: &[Real], beta: &[Real], mu0: Real, mut x: Real) -> Real {
    for _ in 0..8 {
        let (_, p, dp) = recurrence(alpha, beta, mu0, x);
        let step = p / dp;
        if !step.is_finite() {
            break;
        }
        x -= step;
        if step.abs() <= 1e-15 * x.abs().max(1.0) {
            break;
        }
    }
    x
}

/// Runs the orthonormal three-term recurrence at `x`.
///
/// Returns `Σₖ₌₀ⁿ⁻¹ p̂ₖ(x)²`, a multiple of the degree-`n` polynomial at `x`
/// and its derivative.
fn recurrence(alpha: &[Real], beta: &[Real], mu0: Real, x: Real) -> (Real, Real, Real) {
    let n = alpha.len();
    let (mut p_prev, mut p) = (0.0, 1.0 / mu0.sqrt());
    let (mut dp_prev, mut dp) = (0.0, 0.0);
    let mut sum = p * p;
    for k in 0..n {
        let b_prev = if k == 0 { 0.0 } else { beta[k - 1].abs().sqrt() };
        let b_next = if k + 1 < n { beta[k].abs().sqrt() } else { 1.0 };
        let p_next = ((x - alpha[k]) * p - b_prev * p_prev) / b_next;
        let dp_next = (p + (x - alpha[k]) * dp - b_prev * dp_prev) / b_next;
        p_prev = p;
        p = p_next;
        dp_prev = dp;
        dp = dp_next;
        if k + 1 < n {
            sum += p * p;
        }
    }
    (sum, p, dp)
}
