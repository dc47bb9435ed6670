//! One-shot latch

use std::sync::atomic::{AtomicBool, Ordering};

/// Fires at most once.
///
/// `try_fire` is a compare-and-set; exactly one caller ever observes `true`.
#[derive(Debug, Default)]
pub struct OneShotLatch {
    fired: AtomicBool,
}

impl OneShotLatch {
    /// Create an unset latch
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Set the latch. Returns `true` only for the call that set it.
    #[inline]
    pub fn try_fire(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether the latch has been set
    #[inline]
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
