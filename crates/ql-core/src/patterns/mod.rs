//! Patterns sub-module: version stamps and the lazy cache built on them.

pub mod lazy_object;
pub mod observable;
