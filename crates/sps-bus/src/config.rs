//! # Bus Configuration
//!
//! Tunables shared by every topic a `Databus` creates.

use std::time::Duration;
use thiserror::Error;

/// Errors from configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A topic queue must admit at least one command.
    #[error("queue capacity must be greater than zero")]
    ZeroQueueCapacity,

    /// The retention ticker needs a non-zero period.
    #[error("retention interval must be greater than zero")]
    ZeroRetentionInterval,

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Per-topic executor settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusConfig {
    /// Commands buffered per topic before submitters wait.
    pub queue_capacity: usize,
    /// Period between retention collector runs.
    pub retention_interval: Duration,
}

impl BusConfig {
    /// Default queue depth per topic.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

    /// Default retention period.
    pub const DEFAULT_RETENTION_INTERVAL: Duration = Duration::from_secs(60);

    /// Environment key overriding `queue_capacity`.
    pub const ENV_QUEUE_CAPACITY: &'static str = "SPS_QUEUE_CAPACITY";

    /// Environment key overriding `retention_interval`, in milliseconds.
    pub const ENV_RETENTION_INTERVAL_MS: &'static str = "SPS_RETENTION_INTERVAL_MS";

    /// Creates a small config for testing.
    pub fn for_testing() -> Self {
        Self {
            queue_capacity: 16,
            retention_interval: Duration::from_millis(50),
        }
    }

    /// Load from environment variables, keeping defaults for unset keys.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if a set variable is not a valid integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::ENV_QUEUE_CAPACITY) {
            config.queue_capacity = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: Self::ENV_QUEUE_CAPACITY,
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup(Self::ENV_RETENTION_INTERVAL_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: Self::ENV_RETENTION_INTERVAL_MS,
                value: raw.clone(),
            })?;
            config.retention_interval = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the tokio primitives cannot accept.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ZeroQueueCapacity`
    /// - `ConfigError::ZeroRetentionInterval`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.retention_interval.is_zero() {
            return Err(ConfigError::ZeroRetentionInterval);
        }
        Ok(())
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            retention_interval: Self::DEFAULT_RETENTION_INTERVAL,
        }
    }
}
