//! Back-pressure strategies applied when a partition queue is full.
//!
//! The queue itself never waits; a refused enqueue hands the item back
//! immediately. What happens next is decided here, on the publishing thread:
//! drop the event, sleep-and-retry forever, or spin with an upper time bound.
//! The strategy set is closed, so the hot path is a plain `match` rather
//! than dynamic dispatch.

use crate::queue::MpscQueue;
use std::thread;
use std::time::{Duration, Instant};

/// What to do when an event arrives at a full partition queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackPressureStrategy {
    /// Discard the incoming event and report failure.
    #[default]
    DropNewest,

    /// Sleep between retries until the enqueue succeeds. Never gives up.
    Block,

    /// Busy-spin until the enqueue succeeds or the timeout elapses.
    Spin,

    /// Spin, yielding the thread every `yield_threshold` failed attempts,
    /// until the enqueue succeeds or the timeout elapses.
    YieldingSpin,
}

/// Strategy plus its tuning knobs, fixed at bus construction.
#[derive(Debug, Clone)]
pub struct BackPressureConfig {
    pub strategy: BackPressureStrategy,

    /// Sleep between retries for [`BackPressureStrategy::Block`].
    pub block_sleep: Duration,

    /// Give-up bound for the spinning strategies.
    pub spin_timeout: Duration,

    /// Failed attempts between yields for
    /// [`BackPressureStrategy::YieldingSpin`].
    pub yield_threshold: u32,
}

impl Default for BackPressureConfig {
    fn default() -> Self {
        Self {
            strategy: BackPressureStrategy::DropNewest,
            block_sleep: Duration::from_micros(10),
            spin_timeout: Duration::from_millis(1000),
            yield_threshold: 1000,
        }
    }
}

/// Applies the configured strategy to a single enqueue.
///
/// `true` means the item was enqueued exactly once; `false` means it was not
/// enqueued at all (dropped, or the spin timed out).
#[derive(Debug)]
pub(crate) struct BackPressureHandler {
    config: BackPressureConfig,
}

impl BackPressureHandler {
    pub(crate) fn new(config: BackPressureConfig) -> Self {
        Self { config }
    }

    pub(crate) fn try_enqueue<T>(&self, queue: &MpscQueue<T>, item: T) -> bool {
        match self.config.strategy {
            BackPressureStrategy::DropNewest => queue.enqueue(item).is_ok(),
            BackPressureStrategy::Block => self.enqueue_blocking(queue, item),
            BackPressureStrategy::Spin => self.enqueue_spinning(queue, item),
            BackPressureStrategy::YieldingSpin => self.enqueue_yielding(queue, item),
        }
    }

    fn enqueue_blocking<T>(&self, queue: &MpscQueue<T>, mut item: T) -> bool {
        loop {
            match queue.enqueue(item) {
                Ok(()) => return true,
                Err(back) => {
                    item = back;
                    thread::sleep(self.config.block_sleep);
                }
            }
        }
    }

    fn enqueue_spinning<T>(&self, queue: &MpscQueue<T>, mut item: T) -> bool {
        let start = Instant::now();
        loop {
            match queue.enqueue(item) {
                Ok(()) => return true,
                Err(back) => {
                    if start.elapsed() > self.config.spin_timeout {
                        return false;
                    }
                    item = back;
                }
            }
        }
    }

    fn enqueue_yielding<T>(&self, queue: &MpscQueue<T>, mut item: T) -> bool {
        let start = Instant::now();
        let mut spin_count = 0u32;
        loop {
            match queue.enqueue(item) {
                Ok(()) => return true,
                Err(back) => {
                    if start.elapsed() > self.config.spin_timeout {
                        return false;
                    }
                    item = back;
                    spin_count += 1;
                    if spin_count >= self.config.yield_threshold {
                        thread::yield_now();
                        spin_count = 0;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn handler(strategy: BackPressureStrategy) -> BackPressureHandler {
        BackPressureHandler::new(BackPressureConfig {
            strategy,
            ..Default::default()
        })
    }

    fn full_queue() -> MpscQueue<u32> {
        let queue = MpscQueue::new(2);
        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();
        queue
    }

    #[test]
    fn test_drop_newest_discards_on_full() {
        let queue = full_queue();
        let handler = handler(BackPressureStrategy::DropNewest);

        assert!(!handler.try_enqueue(&queue, 3));

        // The queue contents are untouched.
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_drop_newest_enqueues_when_space_exists() {
        let queue = MpscQueue::new(2);
        let handler = handler(BackPressureStrategy::DropNewest);

        assert!(handler.try_enqueue(&queue, 7));
        assert_eq!(queue.dequeue(), Some(7));
    }

    #[test]
    fn test_spin_times_out_on_full_queue() {
        let queue = full_queue();
        let handler = BackPressureHandler::new(BackPressureConfig {
            strategy: BackPressureStrategy::Spin,
            spin_timeout: Duration::from_millis(10),
            ..Default::default()
        });

        let start = Instant::now();
        assert!(!handler.try_enqueue(&queue, 3));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_yielding_spin_times_out_on_full_queue() {
        let queue = full_queue();
        let handler = BackPressureHandler::new(BackPressureConfig {
            strategy: BackPressureStrategy::YieldingSpin,
            spin_timeout: Duration::from_millis(10),
            // Small threshold so the test actually exercises the yield arm.
            yield_threshold: 2,
            ..Default::default()
        });

        assert!(!handler.try_enqueue(&queue, 3));
    }

    #[test]
    fn test_yielding_spin_succeeds_when_space_exists() {
        let queue = MpscQueue::new(2);
        let handler = handler(BackPressureStrategy::YieldingSpin);

        assert!(handler.try_enqueue(&queue, 11));
        assert_eq!(queue.dequeue(), Some(11));
    }

    #[test]
    fn test_block_waits_for_space_and_succeeds() {
        let queue = Arc::new(full_queue());
        let handler = handler(BackPressureStrategy::Block);

        // Free one slot from another thread after a short stall.
        let drainer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                queue.dequeue()
            })
        };

        assert!(handler.try_enqueue(&queue, 3));
        assert_eq!(drainer.join().unwrap(), Some(1));

        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
        assert_eq!(queue.dequeue(), None);
    }
}
