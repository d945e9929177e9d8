//! # SPS Node
//!
//! Demo driver for the in-memory bus: timed publishers and pollers on two
//! topics, running until shutdown.
//!
//! ## Topology
//!
//! ```text
//! pub1, pub2 (×N), pub4 ──→ top1 ──→ sub1, sub2, ...
//! pub3                  ──→ top2 ──→ sub1, sub2, ...
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (from env)
//! 2. Create the databus
//! 3. Spawn publishers and subscribers
//! 4. Wait for Ctrl+C
//! 5. Stop tasks, close the databus

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod runtime;

pub use config::NodeConfig;
pub use runtime::{NodeRuntime, NodeStats, PRIMARY_TOPIC, SECONDARY_TOPIC};
