//! # Topic State
//!
//! The Sequence Log and Cursor Table of one topic, with every operation the
//! executor applies to them. Nothing here is synchronized: the owning
//! worker task is the only caller.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | `sequence == head + retained` | `SequenceLog::append` / `trim_front` |
//! | `cursor <= sequence` for every subscriber | cursors are only ever set to the current sequence |
//! | retained window covers `[min cursor, sequence]` | `collect_garbage()` keeps `sequence - min_cursor` messages |
//! | unknown subscribers are never created implicitly | `poll()` rejects, `CursorTable::advance` refuses |

use crate::cursor::CursorTable;
use crate::errors::{BusError, Result};
use crate::log::SequenceLog;
use bytes::Bytes;
use tracing::{debug, error, trace};

/// Point-in-time view of a topic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicStats {
    /// Messages ever published.
    pub sequence: u64,
    /// Messages currently stored.
    pub retained: usize,
    /// Registered subscribers.
    pub subscribers: usize,
    /// Smallest subscriber cursor, if any subscriber exists.
    pub min_cursor: Option<u64>,
}

/// Mutable state owned by a topic worker.
#[derive(Debug, Default)]
pub struct TopicState {
    log: SequenceLog,
    cursors: CursorTable,
}

impl TopicState {
    /// Create an empty topic state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with no backlog. Re-subscribing keeps the cursor.
    pub fn subscribe(&mut self, name: &str) {
        let sequence = self.log.sequence();
        if self.cursors.subscribe(name, sequence) {
            debug!(subscriber = name, sequence, "Subscriber registered");
        }
    }

    /// Remove `name` if present.
    pub fn unsubscribe(&mut self, name: &str) {
        if self.cursors.unsubscribe(name) {
            debug!(subscriber = name, "Subscriber removed");
        }
    }

    /// Append `payload` to the log.
    pub fn publish(&mut self, payload: Bytes) {
        let sequence = self.log.append(payload);
        trace!(sequence, "Message appended");
    }

    /// Return every message `name` has not consumed yet and advance its cursor.
    ///
    /// # Errors
    ///
    /// - `BusError::NoSubscriptionFound` - `name` is not subscribed
    /// - `BusError::SequenceInconsistentState` - needed messages were trimmed
    pub fn poll(&mut self, name: &str) -> Result<Vec<Bytes>> {
        let cursor = self
            .cursors
            .get(name)
            .ok_or_else(|| BusError::NoSubscriptionFound {
                subscriber: name.to_owned(),
            })?;

        let sequence = self.log.sequence();
        let backlog = sequence - cursor;
        if backlog == 0 {
            return Ok(Vec::new());
        }

        let Some(messages) = self.log.tail(backlog) else {
            let retained = self.log.retained();
            error!(
                subscriber = name,
                cursor,
                sequence,
                retained,
                "Retained window no longer covers subscriber backlog"
            );
            return Err(BusError::SequenceInconsistentState {
                subscriber: name.to_owned(),
                backlog,
                retained,
            });
        };

        self.cursors.advance(name, sequence);
        trace!(subscriber = name, delivered = messages.len(), sequence, "Poll served");
        Ok(messages)
    }

    /// Trim every message all subscribers have consumed.
    ///
    /// With no subscribers nothing needs retaining and the log empties.
    /// Returns the number of messages discarded.
    pub fn collect_garbage(&mut self) -> usize {
        let sequence = self.log.sequence();
        let min_cursor = self.cursors.min_cursor().unwrap_or(sequence);
        let needed = sequence - min_cursor;

        let retained = self.log.retained() as u64;
        if retained <= needed {
            return 0;
        }

        let trimmed = self.log.trim_front((retained - needed) as usize);
        debug!(
            trimmed,
            retained = self.log.retained(),
            min_cursor,
            sequence,
            "Retention collector trimmed log"
        );
        trimmed
    }

    /// Snapshot counters for diagnostics.
    #[must_use]
    pub fn stats(&self) -> TopicStats {
        TopicStats {
            sequence: self.log.sequence(),
            retained: self.log.retained(),
            subscribers: self.cursors.len(),
            min_cursor: self.cursors.min_cursor(),
        }
    }
}
