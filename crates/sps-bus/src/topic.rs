//! # Topic Executor
//!
//! Each topic owns one worker task that applies queued commands strictly in
//! arrival order. Callers never lock the log or the cursor table; they only
//! enqueue work.
//!
//! ## Lifecycle
//!
//! ```text
//! [Running] ──close()──→ [Draining] ──queue empty──→ [Closed]
//! ```
//!
//! | Stage | Admission | Worker |
//! |-------|-----------|--------|
//! | Running | bounded queue, submitters wait when full | commands + retention ticks |
//! | Draining | rejected, waiting submitters released | applies already-queued commands |
//! | Closed | rejected | exited, ticker dropped |
//!
//! Operations submitted after `close()` are dropped: writes silently, polls
//! with an empty result.

use crate::command::TopicCommand;
use crate::config::BusConfig;
use crate::errors::Result;
use crate::state::{TopicState, TopicStats};
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, info_span, Instrument};

/// Handle to a single topic and its worker task.
pub struct Topic {
    /// Topic name (for logging).
    name: Arc<str>,
    /// Queue into the worker.
    commands: mpsc::Sender<TopicCommand>,
    /// Set once by `close()`.
    closed: AtomicBool,
    /// Wakes the worker to start draining.
    shutdown: watch::Sender<bool>,
    /// Taken by the first `close()`.
    worker: Mutex<Option<JoinHandle<TopicStats>>>,
}

impl Topic {
    /// Create a topic and spawn its worker.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(name: impl Into<String>, config: &BusConfig) -> Self {
        let name: Arc<str> = Arc::from(name.into());
        let (commands, receiver) = mpsc::channel(config.queue_capacity);
        let (shutdown, shutdown_rx) = watch::channel(false);

        let span = info_span!("topic", topic = %name);
        let worker = tokio::spawn(
            run_worker(receiver, shutdown_rx, config.retention_interval).instrument(span),
        );

        debug!(
            topic = %name,
            queue_capacity = config.queue_capacity,
            retention_interval_ms = config.retention_interval.as_millis() as u64,
            "Topic created"
        );

        Self {
            name,
            commands,
            closed: AtomicBool::new(false),
            shutdown,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Topic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `close()` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Register a subscriber. It only sees messages published after this.
    pub async fn subscribe(&self, name: &str) {
        self.submit(TopicCommand::Subscribe {
            name: name.to_owned(),
        })
        .await;
    }

    /// Remove a subscriber. Unknown names are ignored.
    pub async fn unsubscribe(&self, name: &str) {
        self.submit(TopicCommand::Unsubscribe {
            name: name.to_owned(),
        })
        .await;
    }

    /// Append a message.
    ///
    /// Returns once the message is queued, not applied. It is applied before
    /// anything this caller submits afterwards.
    pub async fn publish(&self, payload: impl Into<Bytes>) {
        self.submit(TopicCommand::Publish {
            payload: payload.into(),
        })
        .await;
    }

    /// Fetch every message `name` has not consumed yet.
    ///
    /// A closed topic yields an empty result and no error.
    ///
    /// # Errors
    ///
    /// - `BusError::NoSubscriptionFound` - `name` is not subscribed
    /// - `BusError::SequenceInconsistentState` - retention broke its invariant
    pub async fn poll(&self, name: &str) -> Result<Vec<Bytes>> {
        let (reply, response) = oneshot::channel();
        let command = TopicCommand::Poll {
            name: name.to_owned(),
            reply,
        };

        if !self.submit(command).await {
            return Ok(Vec::new());
        }

        response.await.unwrap_or_else(|_| Ok(Vec::new()))
    }

    /// Run the retention collector now, returning how many messages it trimmed.
    pub async fn cleanup(&self) -> usize {
        let (reply, response) = oneshot::channel();
        if !self.submit(TopicCommand::Cleanup { reply }).await {
            return 0;
        }
        response.await.unwrap_or(0)
    }

    /// Snapshot topic counters. `None` once closed.
    pub async fn stats(&self) -> Option<TopicStats> {
        let (reply, response) = oneshot::channel();
        if !self.submit(TopicCommand::Stats { reply }).await {
            return None;
        }
        response.await.ok()
    }

    /// Stop admitting work, drain the queue, and wait for the worker to exit.
    ///
    /// Returns the final counters, or `None` if the topic was already closed.
    pub async fn close(&self) -> Option<TopicStats> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return None;
        }

        // The worker may already be gone if it panicked; nothing to wake then.
        let _ = self.shutdown.send(true);

        let handle = self.worker.lock().take()?;
        match handle.await {
            Ok(stats) => {
                info!(
                    topic = %self.name,
                    sequence = stats.sequence,
                    retained = stats.retained,
                    subscribers = stats.subscribers,
                    "Topic closed"
                );
                Some(stats)
            }
            Err(e) => {
                error!(topic = %self.name, error = %e, "Topic worker failed");
                None
            }
        }
    }

    /// Queue a command. Returns `false` if the topic no longer accepts work.
    async fn submit(&self, command: TopicCommand) -> bool {
        if self.is_closed() {
            debug!(topic = %self.name, op = command.kind(), "Dropped operation on closed topic");
            return false;
        }

        match self.commands.send(command).await {
            Ok(()) => true,
            Err(mpsc::error::SendError(command)) => {
                debug!(topic = %self.name, op = command.kind(), "Dropped operation on closed topic");
                false
            }
        }
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Worker loop: the only code that touches a topic's state.
async fn run_worker(
    mut commands: mpsc::Receiver<TopicCommand>,
    mut shutdown: watch::Receiver<bool>,
    retention_interval: Duration,
) -> TopicStats {
    let mut state = TopicState::new();
    let mut ticker = time::interval_at(Instant::now() + retention_interval, retention_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            // Also fires if the handle is dropped without close().
            _ = shutdown.changed() => break,

            command = commands.recv() => match command {
                Some(command) => command.apply(&mut state),
                None => break,
            },

            _ = ticker.tick() => {
                state.collect_garbage();
            }
        }
    }

    // Draining: refuse new work, finish what callers are already waiting on.
    commands.close();
    let mut drained = 0usize;
    while let Some(command) = commands.recv().await {
        command.apply(&mut state);
        drained += 1;
    }

    debug!(drained, "Topic worker stopped");
    state.stats()
}
