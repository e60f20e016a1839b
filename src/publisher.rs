use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval_at, timeout};
use tracing::{debug, error, info, warn};

use crate::counter::CounterStore;
use crate::error::SinkError;
use crate::metrics::{COUNTER_KEYS, SNAPSHOT_FAILURES, SNAPSHOT_LATENCY, SNAPSHOT_WRITES};
use crate::sink::Sink;

/// Periodically copies the counter store into the sink.
///
/// The sink has a single writer: ticks run inline in one task, so writes never
/// overlap, and ticks missed while a slow write is in flight are dropped.
pub struct SnapshotPublisher {
    counters: Arc<CounterStore>,
    sink: Arc<dyn Sink>,
    interval: Duration,
}

impl SnapshotPublisher {
    pub fn new(counters: Arc<CounterStore>, sink: Arc<dyn Sink>, interval: Duration) -> Self {
        Self {
            counters,
            sink,
            interval,
        }
    }

    // Write one snapshot, returning the number of tallies persisted
    pub async fn publish(&self) -> Result<usize, SinkError> {
        let started = Instant::now();

        let snapshot = self.counters.snapshot();
        COUNTER_KEYS.set(snapshot.len() as f64);

        let bytes = snapshot.to_json_bytes()?;
        self.sink.write(&bytes).await?;

        SNAPSHOT_WRITES.inc();
        SNAPSHOT_LATENCY.observe(started.elapsed().as_secs_f64());
        Ok(snapshot.len())
    }

    async fn tick(&self) {
        match self.publish().await {
            Ok(tallies) => debug!(tallies, "snapshot published"),
            Err(e) => {
                SNAPSHOT_FAILURES.inc();
                error!(error = %e, "snapshot publish failed, skipping tick");
            }
        }
    }

    /// Run the loop on the current runtime until the handle is stopped or dropped.
    ///
    /// The first write happens one interval after spawning. Shutdown abandons
    /// an in-flight write, then one last snapshot is attempted, bounded by the
    /// interval, before the task exits.
    pub fn spawn(self) -> PublisherHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.interval;
            let mut ticker = interval_at(start, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!("Snapshot publisher started (interval: {:?})", self.interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // A stuck write must not hold off shutdown
                        tokio::select! {
                            _ = self.tick() => {}
                            _ = &mut shutdown_rx => break,
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }

            if timeout(self.interval, self.tick()).await.is_err() {
                SNAPSHOT_FAILURES.inc();
                warn!("final snapshot timed out after {:?}", self.interval);
            }
            info!("Snapshot publisher stopped");
        });

        PublisherHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

// Owned by whoever spawned the publisher; stopping waits for the final flush
pub struct PublisherHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PublisherHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            error!(error = %e, "snapshot publisher task failed");
        }
    }
}
