//! Driver configuration.

use sps_bus::{BusConfig, ConfigError};
use std::time::Duration;

/// Settings for the demo topology.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Settings passed to the databus.
    pub bus: BusConfig,
    /// Publishers on the primary topic.
    pub publishers: usize,
    /// Subscribers on each topic.
    pub subscribers: usize,
    /// Delay between two messages of one publisher.
    pub publish_interval: Duration,
    /// Base poll period; subscriber `k` polls every `(k + 1) * poll_interval`.
    pub poll_interval: Duration,
}

impl NodeConfig {
    pub const ENV_PUBLISHERS: &'static str = "SPS_PUBLISHERS";
    pub const ENV_SUBSCRIBERS: &'static str = "SPS_SUBSCRIBERS";
    pub const ENV_PUBLISH_INTERVAL_MS: &'static str = "SPS_PUBLISH_INTERVAL_MS";
    pub const ENV_POLL_INTERVAL_MS: &'static str = "SPS_POLL_INTERVAL_MS";

    /// Creates a fast, small topology for testing.
    pub fn for_testing() -> Self {
        Self {
            bus: BusConfig::for_testing(),
            publishers: 3,
            subscribers: 2,
            publish_interval: Duration::from_millis(1),
            poll_interval: Duration::from_millis(5),
        }
    }

    /// Load from environment variables on top of the defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` for any malformed override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            bus: BusConfig::from_env()?,
            ..Self::default()
        };

        if let Some(n) = parse_env(Self::ENV_PUBLISHERS)? {
            config.publishers = n as usize;
        }
        if let Some(n) = parse_env(Self::ENV_SUBSCRIBERS)? {
            config.subscribers = n as usize;
        }
        if let Some(ms) = parse_env(Self::ENV_PUBLISH_INTERVAL_MS)? {
            config.publish_interval = non_zero_millis(Self::ENV_PUBLISH_INTERVAL_MS, ms)?;
        }
        if let Some(ms) = parse_env(Self::ENV_POLL_INTERVAL_MS)? {
            config.poll_interval = non_zero_millis(Self::ENV_POLL_INTERVAL_MS, ms)?;
        }

        Ok(config)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            publishers: 12,
            subscribers: 2,
            publish_interval: Duration::from_millis(1),
            poll_interval: Duration::from_millis(10),
        }
    }
}

fn parse_env(key: &'static str) -> Result<Option<u64>, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    let parsed = raw.trim().parse::<u64>();
    match parsed {
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

// Tokio intervals panic on a zero period.
fn non_zero_millis(key: &'static str, ms: u64) -> Result<Duration, ConfigError> {
    if ms == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: ms.to_string(),
        });
    }
    Ok(Duration::from_millis(ms))
}
