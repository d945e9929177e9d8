//! # Subscriber Cursor Table
//!
//! Maps subscriber name to the last sequence number it fully consumed.

use std::collections::HashMap;

/// Cursors for every subscriber of one topic.
#[derive(Debug, Default)]
pub struct CursorTable {
    cursors: HashMap<String, u64>,
}

impl CursorTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` at `sequence` unless already present.
    ///
    /// Returns `true` if the subscriber was added. An existing cursor is
    /// left untouched.
    pub fn subscribe(&mut self, name: &str, sequence: u64) -> bool {
        if self.cursors.contains_key(name) {
            return false;
        }
        self.cursors.insert(name.to_owned(), sequence);
        true
    }

    /// Remove `name`, returning `true` if it was present.
    pub fn unsubscribe(&mut self, name: &str) -> bool {
        self.cursors.remove(name).is_some()
    }

    /// Cursor for `name`, if subscribed.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u64> {
        self.cursors.get(name).copied()
    }

    /// Move `name` forward to `sequence`.
    ///
    /// Unknown subscribers are never created here.
    pub fn advance(&mut self, name: &str, sequence: u64) -> bool {
        match self.cursors.get_mut(name) {
            Some(cursor) => {
                *cursor = sequence;
                true
            }
            None => false,
        }
    }

    /// Smallest cursor across all subscribers.
    #[must_use]
    pub fn min_cursor(&self) -> Option<u64> {
        self.cursors.values().copied().min()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// Check if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}
