//! # Integration Tests
//!
//! Exercise `Databus` only through `MessageBus` and its public helpers.

mod concurrency;
mod retention;

use sps_bus::{BusConfig, Bytes, Databus};
use std::time::Duration;

/// Databus whose retention only runs when asked.
pub fn manual_retention_bus() -> Databus {
    Databus::with_config(BusConfig {
        queue_capacity: 32,
        retention_interval: Duration::from_secs(3600),
    })
    .unwrap_or_default()
}

/// Payload `"<prefix>-<i>"`.
pub fn payload(prefix: &str, i: usize) -> Bytes {
    Bytes::from(format!("{prefix}-{i}"))
}
