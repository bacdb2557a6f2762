//! Error types for quantlib-fdm.
//!
//! A single `thiserror`-derived enum covers generic precondition failures
//! (the `ensure!` / `ensure_post!` / `fail!` macros) and the finite-difference
//! taxonomy: configuration errors on grids and layouts, numerical failures
//! during rollback, and time-grid alignment failures.

use thiserror::Error;

/// The top-level error type used throughout the workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// An operation was requested on a null / unset value.
    #[error("null value")]
    NullValue,

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Not implemented.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A mesh or layout is malformed: too few points, non-increasing or
    /// non-finite coordinates.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Two objects that must agree on a dimension do not.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// The dimension required by the receiving object.
        expected: usize,
        /// The dimension that was supplied.
        found: usize,
    },

    /// A stopping time cannot be placed exactly on the time grid.
    #[error("grid alignment: {0}")]
    GridAlignment(String),

    /// The rollback produced a singular system or exploding values.
    #[error("solver divergence: {0}")]
    SolverDivergence(String),

    /// An iterative method ran out of its evaluation / iteration budget.
    #[error("{method}: maximum number of iterations ({iterations}) exceeded")]
    MaxIterationsExceeded {
        /// Name of the iterative method.
        method: &'static str,
        /// The budget that was exhausted.
        iterations: usize,
    },

    /// An exercise, boundary or barrier combination an engine cannot price.
    #[error("unsupported condition: {0}")]
    UnsupportedCondition(String),
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::Error};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> ql_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use ql_core::{fail, errors::Error};
/// fn always_err() -> ql_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

/// Returns `Err(Error::InvalidGrid(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure_grid, errors::Error};
/// fn points(n: usize) -> ql_core::errors::Result<usize> {
///     ensure_grid!(n >= 2, "at least two points required, got {n}");
///     Ok(n)
/// }
/// assert!(matches!(points(1), Err(Error::InvalidGrid(_))));
/// ```
#[macro_export]
macro_rules! ensure_grid {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidGrid(
                format!($($msg)*)
            ));
        }
    };
}
