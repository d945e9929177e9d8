//! # Topic Commands
//!
//! Units of work queued to a topic worker. Read-side commands carry a
//! one-shot reply channel; write-side commands are fire-and-forget.

use crate::errors::Result;
use crate::state::{TopicState, TopicStats};
use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::trace;

/// Reply channel for a poll.
pub(crate) type PollReply = oneshot::Sender<Result<Vec<Bytes>>>;

/// An operation applied by the topic worker.
#[derive(Debug)]
pub(crate) enum TopicCommand {
    /// Register a subscriber at the current sequence.
    Subscribe { name: String },

    /// Remove a subscriber.
    Unsubscribe { name: String },

    /// Append a message.
    Publish { payload: Bytes },

    /// Read a subscriber's backlog.
    Poll { name: String, reply: PollReply },

    /// Run the retention collector now.
    Cleanup { reply: oneshot::Sender<usize> },

    /// Snapshot topic counters.
    Stats { reply: oneshot::Sender<TopicStats> },
}

impl TopicCommand {
    /// Short label for logs.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Subscribe { .. } => "subscribe",
            Self::Unsubscribe { .. } => "unsubscribe",
            Self::Publish { .. } => "publish",
            Self::Poll { .. } => "poll",
            Self::Cleanup { .. } => "cleanup",
            Self::Stats { .. } => "stats",
        }
    }

    /// Execute against the topic state.
    ///
    /// A dropped reply receiver means the caller gave up waiting; the
    /// operation still takes effect.
    pub(crate) fn apply(self, state: &mut TopicState) {
        match self {
            Self::Subscribe { name } => state.subscribe(&name),
            Self::Unsubscribe { name } => state.unsubscribe(&name),
            Self::Publish { payload } => state.publish(payload),
            Self::Poll { name, reply } => {
                let result = state.poll(&name);
                if reply.send(result).is_err() {
                    trace!(subscriber = %name, "Poll caller went away before reply");
                }
            }
            Self::Cleanup { reply } => {
                let _ = reply.send(state.collect_garbage());
            }
            Self::Stats { reply } => {
                let _ = reply.send(state.stats());
            }
        }
    }
}
