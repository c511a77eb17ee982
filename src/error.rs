//! Bus error types.

/// Errors surfaced at bus construction, plus the one runtime contract
/// violation (publishing to a topic that was never declared).
///
/// A full partition queue is not an error; `publish` reports it through its
/// boolean result and the configured back-pressure strategy decides how hard
/// to try before giving up.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("topic already exists: {topic}")]
    DuplicateTopic { topic: String },

    #[error("topic {topic} must have at least one partition")]
    ZeroPartitions { topic: String },

    #[error("topic {topic} does not exist for consumer group {group_id}")]
    UnknownGroupTopic { group_id: String, topic: String },

    #[error("consumer group already exists: {group_id}")]
    DuplicateGroup { group_id: String },

    #[error("consumer group {group_id} must have at least one consumer")]
    ZeroConsumers { group_id: String },

    #[error("cannot publish to unknown topic: {topic}")]
    UnknownTopic { topic: String },

    #[error("consumer group {group_id} is already finalized")]
    AlreadyFinalized { group_id: String },

    #[error("no consumers registered for consumer group {group_id}")]
    NoConsumers { group_id: String },
}

/// Result alias for bus operations.
pub type BusResult<T> = Result<T, BusError>;
