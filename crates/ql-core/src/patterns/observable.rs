//! Version stamps for market data.
//!
//! Observable inputs (quotes, curves, processes) expose a monotone version
//! number. A derived object remembers the version it was computed from and
//! recomputes when the number it reads at query time differs. Nothing is
//! pushed between objects, so there are no registration lists and no
//! notification cycles.

use std::sync::atomic::{AtomicU64, Ordering};

/// An object whose state can change between pricing calls.
///
/// The returned number must never decrease and must change whenever the
/// observable state changes. Composite objects usually return the sum of
/// their inputs' versions, which preserves both properties.
pub trait Versioned {
    /// Current version stamp.
    fn version(&self) -> u64 {
        0
    }
}

/// A thread-safe monotone counter embedded in mutable market data.
#[derive(Debug, Default)]
pub struct VersionCounter {
    value: AtomicU64,
}

impl VersionCounter {
    /// A counter starting at version zero.
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Current version.
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Advance the version and return the new value.
    pub fn bump(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl Clone for VersionCounter {
    fn clone(&self) -> Self {
        Self {
            value: AtomicU64::new(self.get()),
        }
    }
}

impl Versioned for VersionCounter {
    fn version(&self) -> u64 {
        self.get()
    }
}

impl<T: Versioned + ?Sized> Versioned for std::sync::Arc<T> {
    fn version(&self) -> u64 {
        (**self).version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn bump_is_monotone() {
        let c = VersionCounter::new();
        assert_eq!(c.get(), 0);
        assert_eq!(c.bump(), 1);
        assert_eq!(c.bump(), 2);
        assert_eq!(c.version(), 2);
    }

    #[test]
    fn arc_forwards_version() {
        let c = Arc::new(VersionCounter::new());
        c.bump();
        assert_eq!(Versioned::version(&c), 1);
    }

    #[test]
    fn clone_snapshots_value() {
        let c = VersionCounter::new();
        c.bump();
        let d = c.clone();
        c.bump();
        assert_eq!(d.get(), 1);
        assert_eq!(c.get(), 2);
    }
}
