//! Time-stepping schemes (translates `ql/methods/finitedifferences/schemes/`).
//!
//! Every scheme advances the values one step of size `dt` backwards, from
//! `t` to `t − dt`, for a generator `L` given as a
//! [`FdmLinearOpComposite`]. The ADI schemes treat each axis implicitly
//! through [`FdmLinearOpComposite::solve_splitting`] and the coupled
//! remainder explicitly.

mod craig_sneyd_scheme;
mod crank_nicolson_scheme;
mod douglas_scheme;
mod explicit_euler_scheme;
mod hundsdorfer_scheme;
mod implicit_euler_scheme;
mod modified_craig_sneyd_scheme;

pub use craig_sneyd_scheme::CraigSneydScheme;
pub use crank_nicolson_scheme::CrankNicolsonScheme;
pub use douglas_scheme::DouglasScheme;
pub use explicit_euler_scheme::ExplicitEulerScheme;
pub use hundsdorfer_scheme::HundsdorferScheme;
pub use implicit_euler_scheme::ImplicitEulerScheme;
pub use modified_craig_sneyd_scheme::ModifiedCraigSneydScheme;

use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::Array;
use std::fmt;

/// The family of a time-stepping scheme.
///
/// Corresponds to `QuantLib::FdmSchemeDesc::FdmSchemeType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmSchemeType {
    /// Hundsdorfer-Verwer ADI.
    Hundsdorfer,
    /// Douglas ADI.
    Douglas,
    /// Craig-Sneyd ADI.
    CraigSneyd,
    /// Modified Craig-Sneyd ADI.
    ModifiedCraigSneyd,
    /// Fully implicit Euler.
    ImplicitEuler,
    /// Explicit Euler.
    ExplicitEuler,
    /// θ-weighted explicit/implicit Euler.
    CrankNicolson,
}

impl fmt::Display for FdmSchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FdmSchemeType::Hundsdorfer => "Hundsdorfer",
            FdmSchemeType::Douglas => "Douglas",
            FdmSchemeType::CraigSneyd => "CraigSneyd",
            FdmSchemeType::ModifiedCraigSneyd => "ModifiedCraigSneyd",
            FdmSchemeType::ImplicitEuler => "ImplicitEuler",
            FdmSchemeType::ExplicitEuler => "ExplicitEuler",
            FdmSchemeType::CrankNicolson => "CrankNicolson",
        };
        f.write_str(name)
    }
}

/// A scheme family together with its weights.
///
/// Corresponds to `QuantLib::FdmSchemeDesc`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdmSchemeDesc {
    /// The scheme family.
    pub scheme_type: FdmSchemeType,
    /// Weight of the implicit axis sweeps.
    pub theta: Real,
    /// Weight of the explicit correction of the coupled terms.
    pub mu: Real,
}

impl FdmSchemeDesc {
    /// Build a descriptor from its parts.
    pub fn new(scheme_type: FdmSchemeType, theta: Real, mu: Real) -> Self {
        Self { scheme_type, theta, mu }
    }

    /// Douglas with `θ = 1/2`.
    pub fn douglas() -> Self {
        Self::new(FdmSchemeType::Douglas, 0.5, 0.0)
    }

    /// Fully implicit Euler.
    pub fn implicit_euler() -> Self {
        Self::new(FdmSchemeType::ImplicitEuler, 0.0, 0.0)
    }

    /// Explicit Euler.
    pub fn explicit_euler() -> Self {
        Self::new(FdmSchemeType::ExplicitEuler, 0.0, 0.0)
    }

    /// Crank-Nicolson, `θ = 1/2`.
    pub fn crank_nicolson() -> Self {
        Self::new(FdmSchemeType::CrankNicolson, 0.5, 0.0)
    }

    /// Craig-Sneyd with `θ = μ = 1/2`.
    pub fn craig_sneyd() -> Self {
        Self::new(FdmSchemeType::CraigSneyd, 0.5, 0.5)
    }

    /// Modified Craig-Sneyd with `θ = μ = 1/3`.
    pub fn modified_craig_sneyd() -> Self {
        Self::new(FdmSchemeType::ModifiedCraigSneyd, 1.0 / 3.0, 1.0 / 3.0)
    }

    /// Hundsdorfer-Verwer with `θ = 1/2 + √3/6`.
    pub fn hundsdorfer() -> Self {
        Self::new(FdmSchemeType::Hundsdorfer, 0.5 + 3f64.sqrt() / 6.0, 0.5)
    }

    /// Hundsdorfer-Verwer with `θ = 1 − √2/2`.
    pub fn modified_hundsdorfer() -> Self {
        Self::new(FdmSchemeType::Hundsdorfer, 1.0 - 2f64.sqrt() / 2.0, 0.5)
    }
}

impl Default for FdmSchemeDesc {
    fn default() -> Self {
        Self::douglas()
    }
}

/// One backward time step of a PDE `∂u/∂t + L u = 0`.
pub trait FdmScheme: Send {
    /// Advance `a` from `t` to `t − dt`.
    ///
    /// # Errors
    /// No step size set, a step past `t = 0`, or any operator, boundary or
    /// linear-solver failure.
    fn step(&mut self, op: &mut dyn FdmLinearOpComposite, a: &mut Array, t: Time) -> Result<()>;

    /// Set the step size `dt`.
    fn set_step(&mut self, dt: Time);
}

/// Checks the step and moves `op` onto the interval `[t − dt, t]`.
/// Returns the start of the interval and the step size.
pub(crate) fn begin_step(op: &mut dyn FdmLinearOpComposite, dt: Option<Time>, t: Time) -> Result<(Time, Time)> {
    let Some(dt) = dt else {
        ql_core::fail!("no time step size set");
    };
    ensure!(t - dt > -1e-8, "a step towards negative time given: t = {t}, dt = {dt}");
    let from = (t - dt).max(0.0);
    op.set_time(from, t)?;
    Ok((from, dt))
}

/// `y ← (I − θdt·L_i)⁻¹ (y − θdt·L_i base)` for every axis `i` in turn.
pub(crate) fn axis_sweeps(op: &dyn FdmLinearOpComposite, mut y: Array, base: &Array, theta_dt: Real) -> Result<Array> {
    for i in 0..op.size() {
        let rhs = &y - &(op.apply_direction(i, base)? * theta_dt);
        y = op.solve_splitting(i, &rhs, theta_dt)?;
    }
    Ok(y)
}

#[cfg(test)]
pub(crate) mod test_ops {
    //! A constant-coefficient heat operator for scheme tests.

    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesher, FdmMesherComposite, Uniform1dMesher};
    use crate::finite_differences::operators::{
        FdmLinearOpComposite, SecondDerivativeOp, SecondOrderMixedDerivativeOp, TripleBandLinearOp,
    };
    use ql_core::{errors::Result, Real, Time};
    use ql_math::Array;
    use std::sync::Arc;

    /// `L = ½ Σ ∂²/∂x_i² + c·∂²/∂x0∂x1 − r` on a uniform grid.
    #[derive(Debug)]
    pub struct HeatOp {
        pub mesher: Arc<dyn FdmMesher>,
        axes: Vec<TripleBandLinearOp>,
        mixed: Option<SecondOrderMixedDerivativeOp>,
        coupling: Real,
    }

    impl HeatOp {
        pub fn new(dims: &[usize], r: Real, coupling: Real) -> Self {
            let axes_1d: Vec<Arc<dyn Fdm1dMesher>> = dims
                .iter()
                .map(|&n| Arc::new(Uniform1dMesher::new(-1.0, 1.0, n).unwrap()) as Arc<dyn Fdm1dMesher>)
                .collect();
            let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::new(axes_1d).unwrap());
            let n = mesher.layout().size();
            let share = r / dims.len() as Real;
            let axes = (0..dims.len())
                .map(|d| {
                    let dxx = SecondDerivativeOp::new(d, Arc::clone(&mesher)).unwrap().into_inner();
                    dxx.mult(&Array::from_element(n, 0.5))
                        .and_then(|op| op.add(&Array::from_element(n, -share)))
                        .unwrap()
                })
                .collect();
            let mixed = (dims.len() > 1).then(|| SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(&mesher)).unwrap());
            Self {
                mesher,
                axes,
                mixed,
                coupling,
            }
        }
    }

    impl FdmLinearOpComposite for HeatOp {
        fn size(&self) -> usize {
            self.axes.len()
        }

        fn set_time(&mut self, _t1: Time, _t2: Time) -> Result<()> {
            Ok(())
        }

        fn apply(&self, r: &Array) -> Result<Array> {
            let mut out = self.apply_mixed(r)?;
            for axis in &self.axes {
                out += &axis.apply(r)?;
            }
            Ok(out)
        }

        fn apply_mixed(&self, r: &Array) -> Result<Array> {
            match &self.mixed {
                Some(m) => Ok(m.apply(r)? * self.coupling),
                None => Ok(Array::zeros(r.size())),
            }
        }

        fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array> {
            self.axes[direction].apply(r)
        }

        fn solve_splitting(&self, direction: usize, r: &Array, a: Real) -> Result<Array> {
            self.axes[direction].solve_splitting(r, -a, 1.0)
        }

        fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
            let mut x = r.clone();
            for d in 0..self.axes.len() {
                x = self.solve_splitting(d, &x, a)?;
            }
            Ok(x)
        }
    }

    /// `u(x) = Π cos(π x_i / 2)`, which vanishes on the boundary.
    pub fn cosine_mode(mesher: &dyn FdmMesher) -> Array {
        let dims = mesher.layout().dim().len();
        let mut u = Array::from_element(mesher.layout().size(), 1.0);
        for d in 0..dims {
            let x = mesher.locations(d);
            u = u.zip_map(&x, |u, x| u * (std::f64::consts::FRAC_PI_2 * x).cos());
        }
        u
    }
}

#[cfg(test)]
mod tests {
    use super::test_ops::{cosine_mode, HeatOp};
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn named_descriptors() {
        assert_eq!(FdmSchemeDesc::default(), FdmSchemeDesc::douglas());
        assert_eq!(FdmSchemeDesc::craig_sneyd().mu, 0.5);
        assert_abs_diff_eq!(FdmSchemeDesc::hundsdorfer().theta, 0.788675134594813, epsilon = 1e-12);
        assert_abs_diff_eq!(FdmSchemeDesc::modified_hundsdorfer().theta, 0.292893218813452, epsilon = 1e-12);
        assert_eq!(FdmSchemeDesc::modified_craig_sneyd().scheme_type, FdmSchemeType::ModifiedCraigSneyd);
        assert_eq!(FdmSchemeType::CrankNicolson.to_string(), "CrankNicolson");
    }

    fn decay_after(scheme: &mut dyn FdmScheme, dims: &[usize], coupling: Real, steps: usize) -> (Array, Array) {
        let mut op = HeatOp::new(dims, 0.0, coupling);
        let u0 = cosine_mode(op.mesher.as_ref());
        let mut u = u0.clone();
        let dt = 0.5 / steps as Real;
        scheme.set_step(dt);
        for k in 0..steps {
            let t = 0.5 - k as Real * dt;
            scheme.step(&mut op, &mut u, t).unwrap();
        }
        (u0, u)
    }

    /// Every scheme damps the lowest heat mode by `exp(−λ t)` with
    /// `λ = d·π²/8` for `d` axes.
    #[test]
    fn all_schemes_reproduce_heat_decay() {
        let exact_1d = (-0.5 * std::f64::consts::PI.powi(2) / 8.0).exp();
        let exact_2d = exact_1d * exact_1d;
        let bc = Vec::new();
        // explicit Euler needs dt·max|λ| < 2
        let mut schemes: Vec<(Box<dyn FdmScheme>, usize, Real)> = vec![
            (Box::new(ExplicitEulerScheme::new(bc.clone())), 400, 5e-3),
            (Box::new(ImplicitEulerScheme::new(bc.clone())), 20, 2e-2),
            (Box::new(CrankNicolsonScheme::new(0.5, bc.clone())), 20, 5e-3),
            (Box::new(DouglasScheme::new(0.5, bc.clone())), 20, 5e-3),
            (Box::new(CraigSneydScheme::new(0.5, 0.5, bc.clone())), 20, 5e-3),
            (Box::new(ModifiedCraigSneydScheme::new(1.0 / 3.0, 1.0 / 3.0, bc.clone())), 20, 5e-3),
            (Box::new(HundsdorferScheme::new(0.5 + 3f64.sqrt() / 6.0, 0.5, bc.clone())), 20, 5e-3),
        ];
        for (scheme, steps, tol) in schemes.iter_mut() {
            let (u0, u) = decay_after(scheme.as_mut(), &[21, 21], 0.0, *steps);
            let centre = 10 + 21 * 10;
            assert_abs_diff_eq!(u[centre] / u0[centre], exact_2d, epsilon = *tol);
        }
    }

    #[test]
    fn coupled_terms_enter_the_adi_schemes() {
        let bc: crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet = Vec::new();
        let (_, plain) = decay_after(&mut CraigSneydScheme::new(0.5, 0.5, bc.clone()), &[11, 11], 0.0, 10);
        let (_, coupled) = decay_after(&mut CraigSneydScheme::new(0.5, 0.5, bc), &[11, 11], 0.2, 10);
        assert!(coupled.is_finite());
        assert!(plain.iter().zip(coupled.iter()).any(|(p, c)| (p - c).abs() > 1e-6));
    }

    #[test]
    fn step_without_size_or_past_zero_fails() {
        let mut op = HeatOp::new(&[5], 0.0, 0.0);
        let mut u = Array::zeros(5);
        let mut scheme = DouglasScheme::new(0.5, Vec::new());
        assert!(scheme.step(&mut op, &mut u, 1.0).is_err());
        scheme.set_step(0.5);
        assert!(scheme.step(&mut op, &mut u, 0.1).is_err());
    }
}
