use std::time::{Duration, Instant};

/// A single message flowing through the bus.
///
/// Publishers construct events with [`Event::new`], which stamps the creation
/// time; the bus assigns `id` when the event is published. Payloads are opaque
/// bytes and ownership transfers to the bus on publish.
#[derive(Debug, Clone)]
pub struct Event {
    /// Name of the topic this event is published to.
    pub topic: String,

    /// Opaque payload bytes.
    pub payload: Vec<u8>,

    /// Monotonic per-topic id, assigned by the bus at publish time.
    pub id: u64,

    /// Creation time, stamped by the publisher.
    pub timestamp: Instant,
}

impl Event {
    /// Creates an event for `topic` carrying `payload`, stamped with the
    /// current time. The id stays 0 until the bus assigns one on publish.
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            id: 0,
            timestamp: Instant::now(),
        }
    }

    /// Time elapsed since the event was constructed. Consumers can use this
    /// to measure end-to-end delivery latency.
    pub fn age(&self) -> Duration {
        self.timestamp.elapsed()
    }
}
