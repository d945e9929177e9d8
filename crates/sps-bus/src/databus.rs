//! # Databus
//!
//! Registry mapping topic names to `Topic` handles. Topics are created on
//! first publish or subscribe and live until `close()`.

use crate::config::{BusConfig, ConfigError};
use crate::errors::{BusError, Result};
use crate::state::TopicStats;
use crate::topic::Topic;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Trait for publishing to and polling from named topics.
///
/// This is the surface publishers and subscribers program against.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Register `subscriber` on `topic`, creating the topic if needed.
    async fn subscribe(&self, topic: &str, subscriber: &str);

    /// Remove `subscriber` from `topic`. Unknown topics are ignored.
    async fn unsubscribe(&self, topic: &str, subscriber: &str);

    /// Append `payload` to `topic`, creating the topic if needed.
    async fn publish(&self, topic: &str, payload: Bytes);

    /// Fetch every message `subscriber` has not consumed on `topic`.
    async fn poll(&self, topic: &str, subscriber: &str) -> Result<Vec<Bytes>>;
}

/// Thread-safe topic registry.
pub struct Databus {
    /// Live topics by name.
    topics: RwLock<HashMap<String, Arc<Topic>>>,
    /// Settings applied to every new topic.
    config: BusConfig,
}

impl Databus {
    /// Create a databus with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            config: BusConfig::default(),
        }
    }

    /// Create a databus with custom settings.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is unusable.
    pub fn with_config(config: BusConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            topics: RwLock::new(HashMap::new()),
            config,
        })
    }

    /// Settings applied to new topics.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Number of live topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.read().len()
    }

    /// Check if no topic exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.read().is_empty()
    }

    /// Names of live topics, sorted.
    #[must_use]
    pub fn topic_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.topics.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Look up a topic without creating it.
    #[must_use]
    pub fn topic(&self, name: &str) -> Option<Arc<Topic>> {
        self.topics.read().get(name).cloned()
    }

    /// Look up a topic, creating it on first reference.
    ///
    /// # Panics
    ///
    /// Creating a topic must happen within a Tokio runtime.
    pub fn topic_or_create(&self, name: &str) -> Arc<Topic> {
        if let Some(topic) = self.topic(name) {
            return topic;
        }

        let mut topics = self.topics.write();
        // Another caller may have created it between the two locks.
        let topic = topics
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(Topic::spawn(name, &self.config)));
        Arc::clone(topic)
    }

    /// Run the retention collector on `topic` now. Returns messages trimmed.
    pub async fn cleanup(&self, topic: &str) -> usize {
        match self.topic(topic) {
            Some(t) => t.cleanup().await,
            None => 0,
        }
    }

    /// Snapshot counters of `topic`, if it exists and is open.
    pub async fn stats(&self, topic: &str) -> Option<TopicStats> {
        self.topic(topic)?.stats().await
    }

    /// Close every topic, draining their queues, and forget them.
    ///
    /// The databus stays usable: later operations create fresh topics.
    pub async fn close(&self) {
        let topics: Vec<Arc<Topic>> = {
            let mut guard = self.topics.write();
            guard.drain().map(|(_, topic)| topic).collect()
        };

        let count = topics.len();
        for topic in topics {
            topic.close().await;
        }

        info!(topics = count, "Databus closed");
    }
}

impl Default for Databus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for Databus {
    async fn subscribe(&self, topic: &str, subscriber: &str) {
        self.topic_or_create(topic).subscribe(subscriber).await;
    }

    async fn unsubscribe(&self, topic: &str, subscriber: &str) {
        match self.topic(topic) {
            Some(t) => t.unsubscribe(subscriber).await,
            None => debug!(topic, subscriber, "Unsubscribe from unknown topic ignored"),
        }
    }

    async fn publish(&self, topic: &str, payload: Bytes) {
        self.topic_or_create(topic).publish(payload).await;
    }

    async fn poll(&self, topic: &str, subscriber: &str) -> Result<Vec<Bytes>> {
        let t = self.topic(topic).ok_or_else(|| BusError::NoTopicFound {
            topic: topic.to_owned(),
        })?;
        t.poll(subscriber).await
    }
}
