//! Discrete cash dividends (translates `ql/cashflows/dividend.hpp`).

use ql_core::{ensure, errors::Result, Real, Time};

/// A fixed cash dividend paid at `time`.
///
/// Corresponds to `QuantLib::FixedDividend`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dividend {
    /// Payment time as a year fraction.
    pub time: Time,
    /// Cash amount.
    pub amount: Real,
}

impl Dividend {
    /// # Errors
    /// A negative or non-finite payment time.
    pub fn new(time: Time, amount: Real) -> Result<Self> {
        ensure!(time >= 0.0 && time.is_finite(), "invalid dividend time {time}");
        Ok(Self { time, amount })
    }
}

/// Dividends ordered by payment time.
pub type DividendSchedule = Vec<Dividend>;

/// Dividends paid strictly before `maturity`, sorted by time.
pub fn dividends_before(schedule: &[Dividend], maturity: Time) -> DividendSchedule {
    let mut divs: DividendSchedule = schedule
        .iter()
        .copied()
        .filter(|d| d.time < maturity && d.time >= 0.0)
        .collect();
    divs.sort_by(|a, b| a.time.total_cmp(&b.time));
    divs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_and_sorts() {
        let schedule = vec![
            Dividend::new(0.9, 1.0).unwrap(),
            Dividend::new(0.3, 2.0).unwrap(),
            Dividend::new(1.4, 3.0).unwrap(),
        ];
        let divs = dividends_before(&schedule, 1.0);
        assert_eq!(divs.len(), 2);
        assert_eq!(divs[0].amount, 2.0);
        assert_eq!(divs[1].time, 0.9);
    }

    #[test]
    fn rejects_negative_time() {
        assert!(Dividend::new(-0.1, 1.0).is_err());
    }
}
