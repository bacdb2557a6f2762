//! # ql-quotes
//!
//! Versioned market quotes for quantlib-fdm.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `Quote` trait and concrete implementations.
pub mod quote;

pub use quote::{Quote, SimpleQuote};
