//! # Sequence Log
//!
//! Dense, append-only message log for one topic.
//!
//! Messages do not carry their own sequence numbers. The newest retained
//! message is numbered `sequence`, the one before it `sequence - 1`, and so
//! on, so a subscriber `backlog` messages behind reads the last `backlog`
//! entries.
//!
//! ```text
//!   head = sequence - retained
//!   │
//!   ▼
//!   ┌──────┬──────┬──────┬──────┐
//!   │ h+1  │ h+2  │ ...  │ seq  │
//!   └──────┴──────┴──────┴──────┘
//!   ◄── trim_front    append ──►
//! ```

use bytes::Bytes;
use std::collections::VecDeque;

/// Ordered payloads plus the topic's publish counter.
#[derive(Debug, Default)]
pub struct SequenceLog {
    /// Messages ever appended.
    sequence: u64,
    /// Retained suffix of the published messages.
    messages: VecDeque<Bytes>,
}

impl SequenceLog {
    /// Floor below which trimmed capacity is kept rather than released.
    const MIN_CAPACITY: usize = 64;

    /// Create an empty log at sequence 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload and bump the sequence by one.
    pub fn append(&mut self, payload: Bytes) -> u64 {
        self.messages.push_back(payload);
        self.sequence += 1;
        self.sequence
    }

    /// Number of messages ever appended.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Number of messages still stored.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.messages.len()
    }

    /// Check if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sequence number just before the oldest retained message.
    #[must_use]
    pub fn head(&self) -> u64 {
        self.sequence - self.messages.len() as u64
    }

    /// Copy out the newest `count` messages in publish order.
    ///
    /// Returns `None` when fewer than `count` messages are retained.
    #[must_use]
    pub fn tail(&self, count: u64) -> Option<Vec<Bytes>> {
        let count = usize::try_from(count).ok()?;
        let offset = self.messages.len().checked_sub(count)?;
        Some(self.messages.range(offset..).cloned().collect())
    }

    /// Drop up to `count` messages from the front, returning how many went.
    pub fn trim_front(&mut self, count: usize) -> usize {
        let count = count.min(self.messages.len());
        if count == 0 {
            return 0;
        }

        self.messages.drain(..count);
        if self.messages.capacity() > 2 * self.messages.len().max(Self::MIN_CAPACITY) {
            self.messages.shrink_to_fit();
        }
        count
    }
}
