//! # Bus Errors
//!
//! Read-side failures reported by `poll`. Write-side operations
//! (`subscribe`, `unsubscribe`, `publish`) never fail: against a closed or
//! absent topic they are dropped silently.

use thiserror::Error;

/// Errors returned to a polling subscriber.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The topic was never published to or subscribed against.
    #[error("no topic found: {topic}")]
    NoTopicFound { topic: String },

    /// The subscriber is not registered on the topic.
    #[error("no subscription found: {subscriber}")]
    NoSubscriptionFound { subscriber: String },

    /// Retention discarded messages a live subscriber still needed.
    ///
    /// Never produced while the collector respects the minimum cursor.
    #[error(
        "sequence system has an inconsistent state: subscriber {subscriber} \
         is {backlog} behind but only {retained} messages are retained"
    )]
    SequenceInconsistentState {
        subscriber: String,
        backlog: u64,
        retained: usize,
    },
}

impl BusError {
    /// Whether this error signals an internal defect rather than misuse.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::SequenceInconsistentState { .. })
    }
}

/// Result alias for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
