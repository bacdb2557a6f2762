//! # quantlib-fdm
//!
//! Finite-difference option pricing in the [QuantLib](https://www.quantlib.org/)
//! architecture: meshers, spatial operators, operator-splitting schemes,
//! step conditions and the pricing engines built on them.
//!
//! This crate is a **façade** that re-exports the underlying workspace
//! crates. Application code should depend on this crate rather than the
//! individual `ql-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use quantlib_fdm::instruments::{OptionType, VanillaOption};
//! use quantlib_fdm::pricingengines::FdBlackScholesVanillaEngine;
//! use quantlib_fdm::processes::black_scholes_merton_process;
//! use quantlib_fdm::quotes::SimpleQuote;
//! use quantlib_fdm::termstructures::{BlackConstantVol, FlatForward};
//! use std::sync::Arc;
//!
//! let process = Arc::new(black_scholes_merton_process(
//!     Arc::new(SimpleQuote::new(100.0)),
//!     Arc::new(FlatForward::new(0.0)),
//!     Arc::new(FlatForward::new(0.05)),
//!     Arc::new(BlackConstantVol::new(0.2)),
//! ));
//! let engine = FdBlackScholesVanillaEngine::new(process).with_grid(100, 200);
//! let option = VanillaOption::american(OptionType::Put, 100.0, 1.0).unwrap();
//! let results = option.price(&engine).unwrap();
//! assert!((results.value - 6.09).abs() < 0.05);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, error definitions and version-stamped caches.
pub use ql_core as core;

/// Arrays, interpolation, quadrature and linear solvers.
pub use ql_math as math;

/// Market quotes.
pub use ql_quotes as quotes;

/// Yield curves and volatility surfaces.
pub use ql_termstructures as termstructures;

/// Stochastic process definitions.
pub use ql_processes as processes;

/// Payoffs, exercises, dividends and option terms.
pub use ql_instruments as instruments;

/// The finite-difference framework.
pub use ql_methods as methods;

/// Pricing engines.
pub use ql_pricingengines as pricingengines;
