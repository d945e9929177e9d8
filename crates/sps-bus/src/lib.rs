//! # SPS Bus - In-Memory Publish/Subscribe Buffer
//!
//! Publishers append byte messages to named topics; each subscriber keeps
//! its own cursor and polls for whatever it has not read yet.
//!
//! ## Architecture
//!
//! ```text
//!  publish()/subscribe()/poll()
//!            │
//!            ▼
//!   ┌─────────────────┐  name → Arc<Topic>   (RwLock, lazy creation)
//!   │     Databus     │
//!   └────────┬────────┘
//!            │ TopicCommand
//!            ▼
//!   ┌─────────────────┐  bounded mpsc queue, one worker task per topic
//!   │  Topic worker   │◄── retention ticker
//!   └────────┬────────┘
//!            ▼
//!   SequenceLog + CursorTable   (touched by the worker only)
//! ```
//!
//! ## Guarantees
//!
//! - Operations on one topic are applied one at a time, in arrival order.
//! - A subscriber receives every message published after it subscribed,
//!   exactly once, in publish order.
//! - Retention never discards a message some subscriber has not polled.
//! - Closing drains everything already queued before the worker exits.
//!
//! ## Example
//!
//! ```
//! use sps_bus::{Bytes, Databus, MessageBus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> sps_bus::Result<()> {
//! let bus = Databus::new();
//! bus.subscribe("orders", "billing").await;
//! bus.publish("orders", "order #1".into()).await;
//!
//! let unread = bus.poll("orders", "billing").await?;
//! assert_eq!(unread, vec![Bytes::from("order #1")]);
//!
//! bus.close().await;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod command;
pub mod config;
pub mod cursor;
pub mod databus;
pub mod errors;
pub mod log;
pub mod state;
pub mod topic;

// Re-export main types
pub use config::{BusConfig, ConfigError};
pub use cursor::CursorTable;
pub use databus::{Databus, MessageBus};
pub use errors::{BusError, Result};
pub use log::SequenceLog;
pub use state::{TopicState, TopicStats};
pub use topic::Topic;

/// Payload type carried by the bus.
pub use bytes::Bytes;
