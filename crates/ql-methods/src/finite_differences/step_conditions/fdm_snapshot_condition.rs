use super::StepCondition;
use ql_core::{errors::Result, Time};
use ql_math::Array;
use std::sync::Mutex;

/// Records a copy of the values when the rollback passes `t`.
///
/// Corresponds to `QuantLib::FdmSnapshotCondition`.
#[derive(Debug)]
pub struct FdmSnapshotCondition {
    t: Time,
    values: Mutex<Option<Array>>,
}

impl FdmSnapshotCondition {
    /// Snapshot at time `t`.
    pub fn new(t: Time) -> Self {
        Self {
            t,
            values: Mutex::new(None),
        }
    }

    /// The snapshot time.
    pub fn time(&self) -> Time {
        self.t
    }

    /// The recorded values, once the rollback has passed the snapshot time.
    pub fn values(&self) -> Option<Array> {
        self.values.lock().ok().and_then(|v| v.clone())
    }
}

impl StepCondition for FdmSnapshotCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if t == self.t {
            if let Ok(mut slot) = self.values.lock() {
                *slot = Some(a.clone());
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        vec![self.t]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_only_at_its_time() {
        let snap = FdmSnapshotCondition::new(0.1);
        let mut a = Array::from_element(3, 2.0);
        snap.apply_to(&mut a, 0.2).unwrap();
        assert!(snap.values().is_none());
        snap.apply_to(&mut a, 0.1).unwrap();
        assert_eq!(snap.values().unwrap().as_slice(), &[2.0, 2.0, 2.0]);
        assert_eq!(snap.stopping_times(), vec![0.1]);
    }
}
