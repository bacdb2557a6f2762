//! Option exercise types.
//!
//! Translates `ql/exercise.hpp`.
//!
//! An `Exercise` defines *when* an option can be exercised. Times are year
//! fractions from the evaluation date; the finite-difference engines turn
//! them into stopping times.

use ql_core::{ensure, errors::Result, Time};
use std::fmt;

/// Type of exercise right.
///
/// Corresponds to `QuantLib::Exercise::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
    /// Can be exercised at specific times.
    Bermudan,
}

/// Exercise specification for an option.
///
/// Corresponds to `QuantLib::Exercise` and its subclasses.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    exercise_type: ExerciseType,
    /// - European: single time (the expiry).
    /// - American: two times (earliest, latest).
    /// - Bermudan: sorted, distinct exercise times.
    times: Vec<Time>,
}

impl Exercise {
    /// Create a European exercise.
    ///
    /// # Errors
    /// A negative or non-finite expiry.
    pub fn european(expiry: Time) -> Result<Self> {
        ensure!(expiry >= 0.0 && expiry.is_finite(), "invalid expiry time {expiry}");
        Ok(Self {
            exercise_type: ExerciseType::European,
            times: vec![expiry],
        })
    }

    /// Create an American exercise (earliest to latest).
    ///
    /// # Errors
    /// `earliest > latest` or a negative time.
    pub fn american(earliest: Time, latest: Time) -> Result<Self> {
        ensure!(earliest >= 0.0, "earliest exercise time must be non-negative, got {earliest}");
        ensure!(
            earliest <= latest && latest.is_finite(),
            "earliest exercise time {earliest} after latest {latest}"
        );
        Ok(Self {
            exercise_type: ExerciseType::American,
            times: vec![earliest, latest],
        })
    }

    /// Create a Bermudan exercise from a set of exercise times.
    ///
    /// # Errors
    /// An empty set, or a negative or non-finite time.
    pub fn bermudan(mut times: Vec<Time>) -> Result<Self> {
        ensure!(!times.is_empty(), "no exercise time given");
        ensure!(
            times.iter().all(|t| *t >= 0.0 && t.is_finite()),
            "exercise times must be finite and non-negative"
        );
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        Ok(Self {
            exercise_type: ExerciseType::Bermudan,
            times,
        })
    }

    /// The last possible exercise time.
    pub fn last_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All exercise times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exercise_type {
            ExerciseType::European => write!(f, "European({})", self.times[0]),
            ExerciseType::American => {
                write!(f, "American({} – {})", self.times[0], self.last_time())
            }
            ExerciseType::Bermudan => {
                write!(f, "Bermudan({} times)", self.times.len())
            }
        }
    }
}
