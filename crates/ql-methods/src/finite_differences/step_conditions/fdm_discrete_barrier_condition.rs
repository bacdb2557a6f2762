use super::{is_stopping_time, StepCondition};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Time};
use ql_instruments::BarrierType;
use ql_math::Array;
use std::sync::Arc;

/// Knock-out at discrete monitoring times on a log-spot axis.
///
/// Grid points past the barrier are replaced by the rebate. Knock-in
/// variants are priced by in-out parity, so only the knock-out side of
/// `barrier_type` matters here.
#[derive(Debug, Clone)]
pub struct FdmDiscreteBarrierCondition {
    mesher: Arc<dyn FdmMesher>,
    barrier_type: BarrierType,
    barrier: Real,
    rebate: Real,
    monitoring_times: Vec<Time>,
    direction: usize,
}

impl FdmDiscreteBarrierCondition {
    /// Monitor `barrier` on axis `direction` at `monitoring_times`.
    pub fn new(
        mesher: Arc<dyn FdmMesher>,
        barrier_type: BarrierType,
        barrier: Real,
        rebate: Real,
        monitoring_times: Vec<Time>,
        direction: usize,
    ) -> Self {
        Self {
            mesher,
            barrier_type: barrier_type.knock_out(),
            barrier,
            rebate,
            monitoring_times,
            direction,
        }
    }
}

impl StepCondition for FdmDiscreteBarrierCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if !is_stopping_time(&self.monitoring_times, t) {
            return Ok(());
        }
        for iter in self.mesher.layout().iter() {
            let spot = self.mesher.location(&iter, self.direction).exp();
            if self.barrier_type.triggered(spot, self.barrier) {
                a[iter.index()] = self.rebate;
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.monitoring_times.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{FdmMesherComposite, Uniform1dMesher};

    #[test]
    fn points_below_a_down_barrier_get_the_rebate() {
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::from_1d(Arc::new(Uniform1dMesher::new(4.0, 5.0, 11).unwrap())).unwrap());
        let cond =
            FdmDiscreteBarrierCondition::new(Arc::clone(&mesher), BarrierType::DownIn, 90.0, 3.0, vec![0.5], 0);
        let mut a = Array::from_element(11, 10.0);
        cond.apply_to(&mut a, 0.4).unwrap();
        assert!(a.iter().all(|&v| v == 10.0));
        cond.apply_to(&mut a, 0.5).unwrap();
        let x = mesher.locations(0);
        for i in 0..11 {
            let expected = if x[i].exp() < 90.0 { 3.0 } else { 10.0 };
            assert_eq!(a[i], expected);
        }
    }
}
