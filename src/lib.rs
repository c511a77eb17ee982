//! # eddy
//!
//! `eddy` is an in-process, partitioned publish-subscribe event bus for
//! multi-threaded workloads on a single machine. Publishers send events to
//! named topics; the bus routes each event to one partition of the topic and
//! fans it out to every consumer group subscribed there, each group draining
//! its own private partition queues.
//!
//! ## Core features
//!
//! * **Lock-free partition queues:** every partition is a bounded
//!   multi-producer single-consumer ring of sequenced slots, coordinated by
//!   atomic cursors instead of locks.
//! * **Consumer groups:** each group owns an independent queue per partition,
//!   so groups never contend with each other and every group sees every
//!   event. Partitions are split round-robin among the group's consumers.
//! * **Configurable back-pressure:** a full queue can drop the incoming
//!   event, block the publisher, or spin with a timeout.
//! * **Sealed topology:** topics, groups and consumers are declared once in a
//!   [`BusConfig`]; after [`EventBus::new`] returns, nothing about the
//!   topology can change, which keeps the publish path free of locks.
//! * **No runtime:** the bus spawns no threads and never suspends. Publishers
//!   and consumers are caller-supplied threads; consumers drain their
//!   partitions by polling in batches.
//!
//! ## How to use
//!
//! Declare the topology, take the consumers, and publish:
//!
//! ```
//! use eddy::{BackPressureConfig, BusConfig, Event, EventBus};
//!
//! let config = BusConfig::new()
//!     .topic("orders", 4)
//!     .consumer_group("billing", "orders", 2);
//!
//! let mut bus = EventBus::new(config, BackPressureConfig::default()).unwrap();
//! let mut consumers = bus.take_consumers("billing");
//!
//! // Equal keys always land in the same partition.
//! bus.publish(Event::new("orders", "o-1001"), Some("customer-42")).unwrap();
//! bus.publish(Event::new("orders", "o-1002"), Some("customer-42")).unwrap();
//!
//! let drained: usize = consumers
//!     .iter_mut()
//!     .map(|consumer| consumer.poll_batch(16).len())
//!     .sum();
//! assert_eq!(drained, 2);
//! ```

mod back_pressure;
mod bus;
mod config;
mod consumer;
mod consumer_group;
mod cursor;
mod error;
mod event;
mod queue;

pub use back_pressure::{BackPressureConfig, BackPressureStrategy};
pub use bus::EventBus;
pub use config::{BusConfig, ConsumerGroupConfig, TopicConfig};
pub use consumer::Consumer;
pub use error::{BusError, BusResult};
pub use event::Event;
