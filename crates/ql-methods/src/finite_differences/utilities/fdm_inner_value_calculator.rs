//! Payoff evaluation on grid points
//! (translates `ql/methods/finitedifferences/utilities/fdminnervaluecalculator.hpp`).

use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmLinearOpIterator;
use ql_core::{Real, Time};
use ql_instruments::Payoff;
use ql_math::integrals::{GaussLobattoIntegral, Integrator};
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

/// Maps a grid point to the exercise value of a payoff.
///
/// Corresponds to `QuantLib::FdmInnerValueCalculator`.
pub trait FdmInnerValueCalculator: Send + Sync + Debug {
    /// Payoff at the grid point.
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;

    /// Payoff averaged over the grid cell around the point, used as the
    /// terminal condition to smooth kinks.
    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        self.inner_value(iter, t)
    }
}

/// The payoff of `exp(x)` for the log-spot axis `direction`.
///
/// Cell averages integrate the payoff over
/// `[x − h₋/2, x + h₊/2]` by Gauss-Lobatto quadrature. Boundary points,
/// and any cell whose integration fails, use the point value.
///
/// Corresponds to `QuantLib::FdmLogInnerValue`.
#[derive(Debug)]
pub struct FdmLogInnerValue {
    payoff: Arc<dyn Payoff>,
    mesher: Arc<dyn FdmMesher>,
    direction: usize,
    avg_inner_values: OnceLock<Vec<Real>>,
}

impl FdmLogInnerValue {
    /// Evaluation budget of a single cell average.
    pub const MAX_EVALUATIONS: usize = 256;

    /// Payoff evaluated at `exp(x)` on axis `direction`.
    pub fn new(payoff: Arc<dyn Payoff>, mesher: Arc<dyn FdmMesher>, direction: usize) -> Self {
        Self {
            payoff,
            mesher,
            direction,
            avg_inner_values: OnceLock::new(),
        }
    }

    fn cell_average(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let d = self.direction;
        let last = self.mesher.layout().dim()[d] - 1;
        let coord = iter.coordinates()[d];
        if coord == 0 || coord == last {
            return self.inner_value(iter, t);
        }
        let loc = self.mesher.location(iter, d);
        let a = loc - 0.5 * self.mesher.dminus(iter, d);
        let b = loc + 0.5 * self.mesher.dplus(iter, d);
        let f = |x: Real| self.payoff.value(x.exp());
        let (fa, fb) = (f(a), f(b));
        let acc = if fa != 0.0 || fb != 0.0 { (fa + fb) * 5e-5 } else { 1e-4 };
        GaussLobattoIntegral::new(acc.abs(), Self::MAX_EVALUATIONS)
            .integrate(f, a, b)
            .map_or_else(|_| self.inner_value(iter, t), |integral| integral / (b - a))
    }
}

impl FdmInnerValueCalculator for FdmLogInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        self.payoff.value(self.mesher.location(iter, self.direction).exp())
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let d = self.direction;
        let cached = self.avg_inner_values.get_or_init(|| {
            let n = self.mesher.layout().dim()[d];
            let mut values = vec![None; n];
            for it in self.mesher.layout().iter() {
                let c = it.coordinates()[d];
                if values[c].is_none() {
                    values[c] = Some(self.cell_average(&it, t));
                }
            }
            values.into_iter().map(|v| v.unwrap_or(0.0)).collect()
        });
        cached[iter.coordinates()[d]]
    }
}

/// Zero everywhere.
///
/// Corresponds to `QuantLib::FdmZeroInnerValue`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FdmZeroInnerValue;

impl FdmInnerValueCalculator for FdmZeroInnerValue {
    fn inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> Real {
        0.0
    }
}

/// Payoff of `exp(x + y)` for the two factors of the Kluge model.
///
/// Corresponds to `QuantLib::FdmExtOUJumpModelInnerValue`.
#[derive(Debug)]
pub struct FdmExtOUJumpModelInnerValue {
    payoff: Arc<dyn Payoff>,
    mesher: Arc<dyn FdmMesher>,
}

impl FdmExtOUJumpModelInnerValue {
    /// Payoff on the `(x, y)` grid.
    pub fn new(payoff: Arc<dyn Payoff>, mesher: Arc<dyn FdmMesher>) -> Self {
        Self { payoff, mesher }
    }
}

impl FdmInnerValueCalculator for FdmExtOUJumpModelInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        let x = self.mesher.location(iter, 0);
        let y = self.mesher.location(iter, 1);
        self.payoff.value((x + y).exp())
    }
}

/// Payoff of the running average stored on axis `direction`.
#[derive(Debug)]
pub struct FdmAverageInnerValue {
    payoff: Arc<dyn Payoff>,
    mesher: Arc<dyn FdmMesher>,
    direction: usize,
}

impl FdmAverageInnerValue {
    /// Payoff of the average coordinate on axis `direction`.
    pub fn new(payoff: Arc<dyn Payoff>, mesher: Arc<dyn FdmMesher>, direction: usize) -> Self {
        Self {
            payoff,
            mesher,
            direction,
        }
    }
}

impl FdmInnerValueCalculator for FdmAverageInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        self.payoff.value(self.mesher.location(iter, self.direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite, Uniform1dMesher};
    use approx::assert_abs_diff_eq;
    use ql_instruments::{OptionType, PlainVanillaPayoff};

    fn log_mesher() -> Arc<dyn FdmMesher> {
        Arc::new(FdmMesherComposite::from_1d(Arc::new(Uniform1dMesher::new(4.0, 5.2, 13).unwrap())).unwrap())
    }

    #[test]
    fn log_inner_value_is_payoff_of_spot() {
        let mesher = log_mesher();
        let calc = FdmLogInnerValue::new(Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)), mesher.clone(), 0);
        for iter in mesher.layout().iter() {
            let s = mesher.location(&iter, 0).exp();
            assert_abs_diff_eq!(calc.inner_value(&iter, 1.0), (s - 100.0).max(0.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn cell_average_smooths_the_kink_only() {
        let mesher = log_mesher();
        let calc = FdmLogInnerValue::new(Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)), mesher.clone(), 0);
        let strike_cell = mesher
            .layout()
            .iter()
            .min_by(|a, b| {
                let da = (mesher.location(a, 0) - 100f64.ln()).abs();
                let db = (mesher.location(b, 0) - 100f64.ln()).abs();
                da.total_cmp(&db)
            })
            .unwrap();
        assert!(calc.avg_inner_value(&strike_cell, 1.0) > calc.inner_value(&strike_cell, 1.0));

        let first = mesher.layout().begin();
        assert_eq!(calc.avg_inner_value(&first, 1.0), 0.0);

        let deep: Vec<_> = mesher.layout().iter().collect();
        let x = mesher.location(&deep[11], 0);
        let (a, b) = (x - 0.05, x + 0.05);
        let exact = ((b.exp() - a.exp()) - 100.0 * (b - a)) / (b - a);
        assert_abs_diff_eq!(calc.avg_inner_value(&deep[11], 1.0), exact, epsilon = 1e-6);
    }

    #[test]
    fn jump_model_and_average_calculators() {
        let x: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 1.0, 3).unwrap());
        let y: Arc<dyn Fdm1dMesher> = Arc::new(Uniform1dMesher::new(0.0, 2.0, 3).unwrap());
        let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::new(vec![x, y]).unwrap());
        let payoff: Arc<dyn Payoff> = Arc::new(PlainVanillaPayoff::new(OptionType::Call, 1.0));
        let jump = FdmExtOUJumpModelInnerValue::new(Arc::clone(&payoff), Arc::clone(&mesher));
        let avg = FdmAverageInnerValue::new(payoff, Arc::clone(&mesher), 1);
        let last: Vec<_> = mesher.layout().iter().collect();
        assert_abs_diff_eq!(jump.inner_value(&last[8], 0.0), 3f64.exp() - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(avg.inner_value(&last[8], 0.0), 1.0, epsilon = 1e-12);
        assert_eq!(FdmZeroInnerValue.avg_inner_value(&last[4], 0.0), 0.0);
    }
}
