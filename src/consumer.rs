//! Consumer handles and fair batch polling.

use crate::event::Event;
use crate::queue::MpscQueue;
use std::sync::Arc;

/// A consumer within a consumer group.
///
/// Holds the read side of the partition queues assigned to it at bus
/// construction; the set never changes afterwards. Polling takes `&mut self`,
/// which statically enforces the one-reader-per-queue rule: a `Consumer` can
/// move to any thread, but only one thread at a time can drain it.
#[derive(Debug)]
pub struct Consumer {
    consumer_id: String,
    queues: Vec<Arc<MpscQueue<Event>>>,
}

impl Consumer {
    pub(crate) fn new(consumer_id: String, queues: Vec<Arc<MpscQueue<Event>>>) -> Self {
        Self {
            consumer_id,
            queues,
        }
    }

    /// The consumer's id string, `"<group_id>/<index>"`.
    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    /// Number of partition queues assigned to this consumer. Zero when the
    /// group has more consumers than partitions; such a consumer always polls
    /// empty.
    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Drains up to `max_events` events across the assigned queues.
    ///
    /// The budget is divided fairly: with `Q` queues, each queue may
    /// contribute `max_events / Q` events and the first `max_events % Q`
    /// queues one extra. Draining stops per queue at the first empty poll,
    /// and events are appended queue by queue, so the result is ordered
    /// partition-then-FIFO: everything taken from the first queue, then the
    /// second, and so on. Consecutive calls may interleave partitions
    /// differently; order within one partition always holds.
    pub fn poll_batch(&mut self, max_events: usize) -> Vec<Event> {
        if self.queues.is_empty() || max_events == 0 {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(max_events);
        let base = max_events / self.queues.len();
        let remainder = max_events % self.queues.len();

        for (q_idx, queue) in self.queues.iter().enumerate() {
            let budget = base + usize::from(q_idx < remainder);
            for _ in 0..budget {
                match queue.dequeue() {
                    Some(event) => events.push(event),
                    None => break,
                }
            }
        }
        events
    }
}
