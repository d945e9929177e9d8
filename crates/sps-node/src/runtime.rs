//! Publisher and subscriber tasks driving a shared databus.

use crate::config::NodeConfig;
use sps_bus::{Bytes, ConfigError, Databus, MessageBus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

/// Primary topic, shared by most publishers.
pub const PRIMARY_TOPIC: &str = "top1";

/// Secondary topic with a single publisher.
pub const SECONDARY_TOPIC: &str = "top2";

/// Message counters collected by the driver tasks.
#[derive(Debug, Default)]
pub struct NodeStats {
    /// Messages handed to the bus.
    pub published: AtomicU64,
    /// Messages returned by polls.
    pub received: AtomicU64,
    /// Polls that returned an error.
    pub poll_errors: AtomicU64,
}

/// Runs the demo topology until shut down.
pub struct NodeRuntime {
    /// Shared bus.
    bus: Arc<Databus>,
    /// Topology settings.
    config: NodeConfig,
    /// Counters.
    stats: Arc<NodeStats>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    /// Spawned publisher and subscriber tasks.
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    /// Create a runtime with its own databus.
    ///
    /// # Errors
    ///
    /// Returns the bus configuration error, if any.
    pub fn new(config: NodeConfig) -> Result<Self, ConfigError> {
        let bus = Arc::new(Databus::with_config(config.bus.clone())?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            bus,
            config,
            stats: Arc::new(NodeStats::default()),
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        })
    }

    /// The shared databus.
    pub fn bus(&self) -> Arc<Databus> {
        Arc::clone(&self.bus)
    }

    /// Live counters.
    pub fn stats(&self) -> Arc<NodeStats> {
        Arc::clone(&self.stats)
    }

    /// Spawn every publisher and subscriber.
    ///
    /// Primary topic: `publishers` tasks alternating between the names
    /// `pub1`/`pub2`, plus `pub4`. Secondary topic: `pub3`. Each topic gets
    /// `subscribers` pollers at increasing periods.
    pub fn start(&mut self) {
        info!(
            publishers = self.config.publishers,
            subscribers = self.config.subscribers,
            "Starting SPS node"
        );

        let mut publishers: Vec<(&str, String)> = (0..self.config.publishers)
            .map(|i| (PRIMARY_TOPIC, format!("pub{}", i % 2 + 1)))
            .collect();
        publishers.push((SECONDARY_TOPIC, "pub3".to_string()));
        publishers.push((PRIMARY_TOPIC, "pub4".to_string()));

        for (topic, name) in publishers {
            let task = self.spawn_publisher(topic, name);
            self.tasks.push(task);
        }

        for topic in [PRIMARY_TOPIC, SECONDARY_TOPIC] {
            for k in 0..self.config.subscribers {
                let period = self.config.poll_interval * (k as u32 + 1);
                let task = self.spawn_subscriber(topic, format!("sub{}", k + 1), period);
                self.tasks.push(task);
            }
        }
    }

    /// Stop all tasks, then close the bus.
    pub async fn shutdown(mut self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "Driver task ended abnormally");
            }
        }

        self.bus.close().await;

        info!(
            published = self.stats.published.load(Ordering::Relaxed),
            received = self.stats.received.load(Ordering::Relaxed),
            poll_errors = self.stats.poll_errors.load(Ordering::Relaxed),
            "Shutdown complete"
        );
    }

    fn spawn_publisher(&self, topic: &'static str, name: String) -> JoinHandle<()> {
        let bus: Arc<dyn MessageBus> = self.bus.clone();
        let stats = Arc::clone(&self.stats);
        let mut shutdown = self.shutdown_rx.clone();
        let period = self.config.publish_interval;

        tokio::spawn(async move {
            let mut ticker = ticker(period);
            for i in 0u64.. {
                tokio::select! {
                    _ = shutdown.changed() => return,
                    _ = ticker.tick() => {
                        let payload = Bytes::from(format!("{name}/#{i}"));
                        bus.publish(topic, payload).await;
                        stats.published.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        })
    }

    fn spawn_subscriber(&self, topic: &'static str, name: String, period: Duration) -> JoinHandle<()> {
        let bus: Arc<dyn MessageBus> = self.bus.clone();
        let stats = Arc::clone(&self.stats);
        let mut shutdown = self.shutdown_rx.clone();

        tokio::spawn(async move {
            bus.subscribe(topic, &name).await;

            let mut ticker = ticker(period);
            loop {
                tokio::select! {
                    _ = shutdown.changed() => return,
                    _ = ticker.tick() => match bus.poll(topic, &name).await {
                        Ok(messages) => {
                            stats.received.fetch_add(messages.len() as u64, Ordering::Relaxed);
                            for msg in messages {
                                info!(
                                    subscriber = %name,
                                    topic,
                                    payload = %String::from_utf8_lossy(&msg),
                                    "Message received"
                                );
                            }
                        }
                        Err(e) => {
                            stats.poll_errors.fetch_add(1, Ordering::Relaxed);
                            warn!(subscriber = %name, topic, error = %e, "Poll failed");
                        }
                    },
                }
            }
        })
    }
}

fn ticker(period: Duration) -> time::Interval {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
