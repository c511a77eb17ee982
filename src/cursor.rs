use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering};

/// A cache-line-isolated atomic ticket counter.
///
/// One `Cursor` sits on each side of the queue (`head` for the consumer,
/// `tail` for producers); the padding keeps the two sides from false-sharing
/// a cache line under producer/consumer churn.
#[derive(Debug, Default)]
pub(crate) struct Cursor {
    value: CachePadded<AtomicU64>,
}

impl Cursor {
    pub(crate) fn new(val: u64) -> Self {
        Self {
            value: CachePadded::new(AtomicU64::new(val)),
        }
    }

    #[inline]
    pub(crate) fn relaxed(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn store_relaxed(&self, val: u64) {
        self.value.store(val, Ordering::Relaxed);
    }

    /// Claims ticket `current` by advancing the cursor to `current + 1`.
    ///
    /// Uses a weak exchange, so it may fail spuriously even when the cursor
    /// still holds `current`; callers retry in a loop either way. On failure
    /// the freshly observed value is returned.
    #[inline]
    pub(crate) fn claim(&self, current: u64) -> Result<u64, u64> {
        self.value.compare_exchange_weak(
            current,
            current.wrapping_add(1),
            Ordering::AcqRel,
            Ordering::Relaxed,
        )
    }
}
