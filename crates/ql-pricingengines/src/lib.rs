//! # ql-pricingengines
//!
//! Pricing engines for options on a single equity or commodity: the
//! Black-Scholes-Merton closed form and the finite-difference engines
//! assembled from [`ql_methods::finite_differences`].
//!
//! ## Engines
//!
//! - [`AnalyticEuropeanEngine`]: Black-Scholes-Merton closed form for European options
//! - [`FdBlackScholesVanillaEngine`]: European, American and Bermudan options with cash dividends
//! - [`FdBlackScholesBarrierEngine`]: single barriers, continuously or discretely monitored
//! - [`FdBlackScholesAsianEngine`]: discretely monitored arithmetic averages
//! - [`FdHestonVanillaEngine`]: Heston stochastic volatility
//! - [`FdBatesVanillaEngine`]: Heston with lognormal jumps
//! - [`FdCirVanillaEngine`]: Black-Scholes equity with a CIR short rate
//! - [`FdExtOUJumpVanillaEngine`]: exponential OU with jumps, for power and gas
//! - [`FdHestonHullWhiteVanillaEngine`]: Heston with a Hull-White short rate
//!
//! Every engine implements [`ql_instruments::PricingEngine`] for its
//! argument type and reports failures as [`ql_core::Error`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod fd_setup;

pub mod analytic_european_engine;
pub mod fd_bates_vanilla_engine;
pub mod fd_black_scholes_asian_engine;
pub mod fd_black_scholes_barrier_engine;
pub mod fd_black_scholes_vanilla_engine;
pub mod fd_cir_vanilla_engine;
pub mod fd_ext_ou_jump_vanilla_engine;
pub mod fd_heston_hull_white_vanilla_engine;
pub mod fd_heston_vanilla_engine;

pub use analytic_european_engine::{black_scholes_merton, AnalyticEuropeanEngine};
pub use fd_bates_vanilla_engine::FdBatesVanillaEngine;
pub use fd_black_scholes_asian_engine::FdBlackScholesAsianEngine;
pub use fd_black_scholes_barrier_engine::FdBlackScholesBarrierEngine;
pub use fd_black_scholes_vanilla_engine::FdBlackScholesVanillaEngine;
pub use fd_cir_vanilla_engine::FdCirVanillaEngine;
pub use fd_ext_ou_jump_vanilla_engine::FdExtOUJumpVanillaEngine;
pub use fd_heston_hull_white_vanilla_engine::FdHestonHullWhiteVanillaEngine;
pub use fd_heston_vanilla_engine::{FdHestonVanillaEngine, MEAN_VARIANCE_DELTA, MEAN_VARIANCE_GAMMA};
