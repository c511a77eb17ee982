//! Defines `EventBus`, the sealed topology and the publish path.
//!
//! The bus owns everything: topics, the consumer groups subscribed to them,
//! and the consumer handles until the application claims them. The whole
//! topology comes from a [`BusConfig`] and is frozen once construction
//! returns, which is what makes the publish path safe to share across any
//! number of producer threads without a lock: the maps are only ever read,
//! and the per-topic id counters are atomic.

use crate::back_pressure::{BackPressureConfig, BackPressureHandler};
use crate::config::BusConfig;
use crate::consumer::Consumer;
use crate::consumer_group::ConsumerGroup;
use crate::error::{BusError, BusResult};
use crate::event::Event;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct Topic {
    partition_count: u32,

    /// Next event id for this topic. Relaxed fetch_add is enough: the id
    /// only feeds partition selection and diagnostics, never synchronization.
    next_id: AtomicU64,
}

/// The partitioned publish-subscribe bus.
///
/// Publishing is `&self` and safe from any number of threads. Consumers are
/// claimed once with [`take_consumers`](EventBus::take_consumers) and driven
/// by caller threads; the bus spawns none of its own.
#[derive(Debug)]
pub struct EventBus {
    topics: HashMap<String, Topic>,

    /// Subscribed groups per topic, in registration order. A key is present
    /// only with at least one group.
    groups_by_topic: HashMap<String, Vec<ConsumerGroup>>,

    /// Consumer handles per group, parked here until the application takes
    /// them.
    consumers_by_group: HashMap<String, Vec<Consumer>>,

    back_pressure: BackPressureHandler,
}

impl EventBus {
    /// Builds the bus from `config` and seals it.
    ///
    /// Topics are created first, then each consumer group is created,
    /// populated with its consumers and finalized. Fails on a duplicate
    /// topic or group id, a group referencing an unknown topic, or a zero
    /// partition or consumer count.
    pub fn new(config: BusConfig, back_pressure: BackPressureConfig) -> BusResult<Self> {
        let mut bus = Self {
            topics: HashMap::new(),
            groups_by_topic: HashMap::new(),
            consumers_by_group: HashMap::new(),
            back_pressure: BackPressureHandler::new(back_pressure),
        };

        for topic in &config.topics {
            bus.create_topic(&topic.name, topic.partitions)?;
        }
        for group in &config.consumer_groups {
            bus.create_consumer_group(&group.group_id, &group.topic, group.consumers)?;
        }
        Ok(bus)
    }

    /// Publishes one event, fanning it out to every group subscribed to its
    /// topic.
    ///
    /// With no `partition_key` the partition is the event id modulo the
    /// partition count, which walks the partitions round-robin; with a key,
    /// its hash picks the partition, so equal keys always land together.
    ///
    /// Returns `Ok(true)` when every subscribed group accepted the event,
    /// `Ok(false)` when at least one group's queue refused it under the
    /// back-pressure strategy, or when no group is subscribed at all (the
    /// event is dropped silently). Publishing to a topic that was never
    /// declared is a contract violation and fails with
    /// [`BusError::UnknownTopic`].
    pub fn publish(&self, mut event: Event, partition_key: Option<&str>) -> BusResult<bool> {
        let topic = self
            .topics
            .get(&event.topic)
            .ok_or_else(|| BusError::UnknownTopic {
                topic: event.topic.clone(),
            })?;

        let Some(groups) = self.groups_by_topic.get(&event.topic) else {
            return Ok(false);
        };

        event.id = topic.next_id.fetch_add(1, Ordering::Relaxed);
        let partition_index = partition_index(event.id, topic.partition_count, partition_key);

        // Fan out in registration order. Every group gets its own copy of
        // the event; the last delivery takes the original.
        let mut all_accepted = true;
        if let Some((last, rest)) = groups.split_last() {
            for group in rest {
                all_accepted &=
                    group.deliver(event.clone(), partition_index, &self.back_pressure);
            }
            all_accepted &= last.deliver(event, partition_index, &self.back_pressure);
        }
        Ok(all_accepted)
    }

    /// Hands out the consumers of `group_id` for the application to drive.
    ///
    /// Consumers are returned in registration order (consumer index 0
    /// first). Each group's consumers can be taken once; an unknown group or
    /// a repeated take yields an empty vector.
    pub fn take_consumers(&mut self, group_id: &str) -> Vec<Consumer> {
        self.consumers_by_group
            .get_mut(group_id)
            .map(mem::take)
            .unwrap_or_default()
    }

    /// Partition count of `topic`, if it exists.
    pub fn partition_count(&self, topic: &str) -> Option<u32> {
        self.topics.get(topic).map(|t| t.partition_count)
    }

    /// Ids of all consumer groups on the bus, in no particular order.
    pub fn group_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.consumers_by_group.keys().map(String::as_str)
    }

    fn create_topic(&mut self, name: &str, partitions: u32) -> BusResult<()> {
        if partitions == 0 {
            return Err(BusError::ZeroPartitions {
                topic: name.to_string(),
            });
        }
        if self.topics.contains_key(name) {
            return Err(BusError::DuplicateTopic {
                topic: name.to_string(),
            });
        }
        self.topics.insert(
            name.to_string(),
            Topic {
                partition_count: partitions,
                next_id: AtomicU64::new(0),
            },
        );
        Ok(())
    }

    fn create_consumer_group(
        &mut self,
        group_id: &str,
        topic: &str,
        consumers: u32,
    ) -> BusResult<()> {
        if consumers == 0 {
            return Err(BusError::ZeroConsumers {
                group_id: group_id.to_string(),
            });
        }
        let Some(topic_entry) = self.topics.get(topic) else {
            return Err(BusError::UnknownGroupTopic {
                group_id: group_id.to_string(),
                topic: topic.to_string(),
            });
        };
        if self.consumers_by_group.contains_key(group_id) {
            return Err(BusError::DuplicateGroup {
                group_id: group_id.to_string(),
            });
        }

        let mut group = ConsumerGroup::new(group_id, topic_entry.partition_count);
        let mut consumer_ids = Vec::with_capacity(consumers as usize);
        for _ in 0..consumers {
            let (_, consumer_id) = group.register_consumer()?;
            consumer_ids.push(consumer_id);
        }
        let assignments = group.finalize()?;

        let handles = consumer_ids
            .into_iter()
            .zip(assignments)
            .map(|(consumer_id, queues)| Consumer::new(consumer_id, queues))
            .collect();
        self.consumers_by_group
            .insert(group_id.to_string(), handles);
        self.groups_by_topic
            .entry(topic.to_string())
            .or_default()
            .push(group);
        Ok(())
    }
}

/// Maps an event onto one partition of its topic.
///
/// Keyless events walk the partitions round-robin through their id. Keyed
/// events hash the key with `DefaultHasher`, which is deterministic within a
/// process, so one key always selects the same partition for the lifetime of
/// the bus.
fn partition_index(event_id: u64, partition_count: u32, partition_key: Option<&str>) -> usize {
    match partition_key {
        None => (event_id % u64::from(partition_count)) as usize,
        Some(key) => {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            (hasher.finish() % u64::from(partition_count)) as usize
        }
    }
}
