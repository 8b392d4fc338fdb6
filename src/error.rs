//! Error types for the topic registry.

use crate::types::{SubscriptionId, Topic};
use thiserror::Error;

/// Main error type for registry operations.
#[derive(Debug, Error)]
pub enum PubSubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("No subscription {id} on topic {topic:?}")]
    InvalidHandle { topic: Topic, id: SubscriptionId },

    #[error("Subscriber {id} on topic {topic:?} failed: {reason}")]
    SubscriberFailure {
        topic: Topic,
        id: SubscriptionId,
        reason: String,
    },

    #[error("Global registry already initialized")]
    AlreadyInitialized,
}

impl From<serde_json::Error> for PubSubError {
    fn from(e: serde_json::Error) -> Self {
        PubSubError::Config(e.to_string())
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, PubSubError>;
