//! Consumer groups: per-group partition queues and their assignment.
//!
//! Each group subscribed to a topic owns a private queue per partition, so
//! groups never contend with each other; the bus duplicates every event into
//! each subscribed group. A group is built in two phases: consumers register
//! while it is still building, then `finalize` creates the queues and splits
//! them round-robin across the registered consumers. Only a finalized group
//! delivers events.

use crate::back_pressure::BackPressureHandler;
use crate::error::{BusError, BusResult};
use crate::event::Event;
use crate::queue::MpscQueue;
use std::sync::Arc;

/// Capacity of each partition queue. Power of two, as the queue requires.
pub(crate) const PARTITION_QUEUE_CAPACITY: usize = 16384;

#[derive(Debug)]
pub(crate) struct ConsumerGroup {
    group_id: String,

    /// Partition count of the topic this group consumes from.
    partition_count: u32,

    /// One queue per partition, created at finalize. The group keeps the
    /// write side alive; consumers share the read side of their subset.
    partition_queues: Vec<Arc<MpscQueue<Event>>>,

    /// Number of consumers registered so far.
    registered: u32,

    finalized: bool,
}

impl ConsumerGroup {
    pub(crate) fn new(group_id: impl Into<String>, partition_count: u32) -> Self {
        Self {
            group_id: group_id.into(),
            partition_count,
            partition_queues: Vec::new(),
            registered: 0,
            finalized: false,
        }
    }

    /// Registers the next consumer and returns its index and id string
    /// (`"<group_id>/<index>"`, indices in registration order).
    pub(crate) fn register_consumer(&mut self) -> BusResult<(u32, String)> {
        if self.finalized {
            return Err(BusError::AlreadyFinalized {
                group_id: self.group_id.clone(),
            });
        }
        let index = self.registered;
        self.registered += 1;
        Ok((index, format!("{}/{}", self.group_id, index)))
    }

    /// Creates the partition queues and assigns them round-robin across the
    /// registered consumers: queue `p` goes to consumer `p % K`.
    ///
    /// With K <= P every consumer ends up within one queue of its peers; with
    /// K > P the consumers at index >= P receive no queues and will always
    /// poll empty. Returns the per-consumer queue lists, in consumer index
    /// order, for the bus to hand to the consumer handles.
    pub(crate) fn finalize(&mut self) -> BusResult<Vec<Vec<Arc<MpscQueue<Event>>>>> {
        if self.finalized {
            return Err(BusError::AlreadyFinalized {
                group_id: self.group_id.clone(),
            });
        }
        if self.registered == 0 {
            return Err(BusError::NoConsumers {
                group_id: self.group_id.clone(),
            });
        }

        let consumers = self.registered as usize;
        let mut assignments: Vec<Vec<Arc<MpscQueue<Event>>>> =
            (0..consumers).map(|_| Vec::new()).collect();

        for p in 0..self.partition_count as usize {
            let queue = Arc::new(MpscQueue::new(PARTITION_QUEUE_CAPACITY));
            self.partition_queues.push(Arc::clone(&queue));
            assignments[p % consumers].push(queue);
        }

        self.finalized = true;
        Ok(assignments)
    }

    /// Delivers one event to the queue of `partition_index`, applying the
    /// back-pressure strategy. Returns whether the event was enqueued.
    pub(crate) fn deliver(
        &self,
        event: Event,
        partition_index: usize,
        back_pressure: &BackPressureHandler,
    ) -> bool {
        debug_assert!(self.finalized, "deliver on a group that was never finalized");
        back_pressure.try_enqueue(&self.partition_queues[partition_index], event)
    }
}
