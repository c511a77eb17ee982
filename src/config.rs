//! Topology configuration consumed once by [`EventBus::new`].
//!
//! The whole topology (topics, partition counts, consumer groups) is declared
//! up front; after construction the bus is sealed and none of it can change.
//!
//! [`EventBus::new`]: crate::EventBus::new

/// A topic and its fixed partition count.
#[derive(Debug, Clone)]
pub struct TopicConfig {
    pub name: String,
    pub partitions: u32,
}

/// A consumer group subscribed to exactly one topic.
#[derive(Debug, Clone)]
pub struct ConsumerGroupConfig {
    pub group_id: String,
    pub topic: String,
    pub consumers: u32,
}

/// Full bus topology, built either from literal vectors or with the chained
/// [`topic`](BusConfig::topic) / [`consumer_group`](BusConfig::consumer_group)
/// helpers.
#[derive(Debug, Clone, Default)]
pub struct BusConfig {
    pub topics: Vec<TopicConfig>,
    pub consumer_groups: Vec<ConsumerGroupConfig>,
}

impl BusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a topic with `partitions` partitions.
    pub fn topic(mut self, name: impl Into<String>, partitions: u32) -> Self {
        self.topics.push(TopicConfig {
            name: name.into(),
            partitions,
        });
        self
    }

    /// Declares a consumer group of `consumers` consumers on `topic`.
    pub fn consumer_group(
        mut self,
        group_id: impl Into<String>,
        topic: impl Into<String>,
        consumers: u32,
    ) -> Self {
        self.consumer_groups.push(ConsumerGroupConfig {
            group_id: group_id.into(),
            topic: topic.into(),
            consumers,
        });
        self
    }
}
