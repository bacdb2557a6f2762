//! `Quote` trait and `SimpleQuote` implementation.
//!
//! Translates `ql/quote.hpp` and `ql/quotes/simplequote.hpp`. Quotes carry a
//! version stamp instead of an observer list: every `set_value` bumps it, and
//! anything priced off the quote compares stamps at query time.

use ql_core::{
    errors::{Error, Result},
    Real, VersionCounter, Versioned,
};
use std::sync::RwLock;

/// A market-observable value.
///
/// Corresponds to `QuantLib::Quote`.
pub trait Quote: Versioned + std::fmt::Debug + Send + Sync {
    /// Return the current value.
    ///
    /// Returns `None` if the quote is not currently valid / set.
    fn value(&self) -> Option<Real>;

    /// Return `true` if the quote is currently valid.
    fn is_valid(&self) -> bool {
        self.value().is_some()
    }

    /// The current value, or [`Error::NullValue`] if the quote is unset.
    fn try_value(&self) -> Result<Real> {
        self.value().ok_or(Error::NullValue)
    }
}

/// A market quote that can be re-set through a shared reference.
///
/// Corresponds to `QuantLib::SimpleQuote`.
#[derive(Debug)]
pub struct SimpleQuote {
    value: RwLock<Option<Real>>,
    version: VersionCounter,
}

impl SimpleQuote {
    /// Create a new quote with the given value.
    pub fn new(value: Real) -> Self {
        Self {
            value: RwLock::new(Some(value)),
            version: VersionCounter::new(),
        }
    }

    /// Create an empty (invalid) quote.
    pub fn empty() -> Self {
        Self {
            value: RwLock::new(None),
            version: VersionCounter::new(),
        }
    }

    /// Set a new value. The version advances only if the value changed.
    pub fn set_value(&self, value: Real) {
        let mut slot = self.value.write().unwrap_or_else(|e| e.into_inner());
        if *slot != Some(value) {
            *slot = Some(value);
            self.version.bump();
        }
    }

    /// Clear the value, making the quote invalid.
    pub fn reset(&self) {
        let mut slot = self.value.write().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            *slot = None;
            self.version.bump();
        }
    }
}

impl Versioned for SimpleQuote {
    fn version(&self) -> u64 {
        self.version.get()
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> Option<Real> {
        *self.value.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn simple_quote() {
        let q = SimpleQuote::new(1.05);
        assert!(q.is_valid());
        assert_eq!(q.value(), Some(1.05));
        assert_eq!(q.version(), 0);
    }

    #[test]
    fn empty_quote() {
        let q = SimpleQuote::empty();
        assert!(!q.is_valid());
        assert_eq!(q.try_value(), Err(Error::NullValue));
    }

    #[test]
    fn set_value_bumps_version_only_on_change() {
        let q = Arc::new(SimpleQuote::new(100.0));
        let shared: Arc<dyn Quote> = q.clone();
        q.set_value(100.0);
        assert_eq!(shared.version(), 0);
        q.set_value(101.0);
        assert_eq!(shared.version(), 1);
        assert_eq!(shared.value(), Some(101.0));
        q.reset();
        assert_eq!(shared.version(), 2);
        assert!(!shared.is_valid());
    }
}
