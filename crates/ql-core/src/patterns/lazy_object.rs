//! Lazy, version-checked caching of expensive results.
//!
//! `LazyCache` stores a value together with the version stamp of the inputs
//! it was computed from. [`LazyCache::get_or_try_compute`] returns the cached
//! value while the stamp matches and recomputes otherwise. The staleness
//! check happens at query time, explicitly.

use crate::errors::Result;
use std::sync::Mutex;

/// A cached value tagged with the input version it was derived from.
///
/// # Example
/// ```
/// use ql_core::patterns::lazy_object::LazyCache;
///
/// let cache: LazyCache<f64> = LazyCache::new();
/// let mut calls = 0;
/// let v = cache.get_or_try_compute(7, || { calls += 1; Ok(42.0) }).unwrap();
/// assert_eq!(v, 42.0);
/// let v = cache.get_or_try_compute(7, || { calls += 1; Ok(0.0) }).unwrap();
/// assert_eq!(v, 42.0);
/// assert_eq!(calls, 1);
/// ```
#[derive(Debug)]
pub struct LazyCache<T: Clone> {
    slot: Mutex<Option<(u64, T)>>,
}

impl<T: Clone> LazyCache<T> {
    /// An empty cache.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value if it was computed for `stamp`, otherwise
    /// run `compute`, store its result and return it.
    ///
    /// A failed computation leaves the previous entry untouched.
    pub fn get_or_try_compute<F>(&self, stamp: u64, compute: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((cached_stamp, value)) = slot.as_ref() {
            if *cached_stamp == stamp {
                return Ok(value.clone());
            }
        }
        let value = compute()?;
        *slot = Some((stamp, value.clone()));
        Ok(value)
    }

    /// `true` if a value computed for `stamp` is cached.
    pub fn is_fresh(&self, stamp: u64) -> bool {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        matches!(slot.as_ref(), Some((s, _)) if *s == stamp)
    }

    /// Drop the cached value.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

impl<T: Clone> Default for LazyCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
