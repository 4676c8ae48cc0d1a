// Single-consumer aggregation task (port of the Java MessageProcessor).
// Drains the ingest queue in FIFO order and forwards each report to the
// store. Validation happens before enqueue, so nothing here can fail; only a
// stop request or a closed channel ends the loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::models::QueuedReport;
use crate::store::StatStore;

/// An ingest queue element: a stamped report, or a request to stop the
/// aggregator. Stop is an explicit variant rather than a reserved timestamp
/// value, but keeps the same FIFO/termination contract: everything queued
/// ahead of it is applied first, everything behind it is dropped.
#[derive(Debug)]
pub enum QueueMessage {
    Report(QueuedReport),
    Stop,
}

/// Shared pipeline counters. `queue_depth` counts reports enqueued but not
/// yet applied to the store; `processed_total` counts applied reports.
/// Advisory only (tests and logging), not part of correctness semantics.
#[derive(Debug, Default)]
pub struct PipelineStats {
    pub queue_depth: AtomicUsize,
    pub processed_total: AtomicU64,
}

impl PipelineStats {
    pub fn queue_is_empty(&self) -> bool {
        self.queue_depth.load(Ordering::Acquire) == 0
    }

    pub fn processed(&self) -> u64 {
        self.processed_total.load(Ordering::Relaxed)
    }
}

/// Spawns the aggregator task. Returns a join handle; the task exits on a
/// `Stop` message or when every sender is dropped.
pub fn spawn(
    rx: mpsc::UnboundedReceiver<QueueMessage>,
    store: Arc<StatStore>,
    stats: Arc<PipelineStats>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(rx, store, stats).await;
    })
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<QueueMessage>,
    store: Arc<StatStore>,
    stats: Arc<PipelineStats>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            QueueMessage::Report(queued) => {
                store.accumulate(&queued);
                // Depth drops only after the record is visible in the store,
                // so an empty queue means all accepted reports are queryable.
                stats.queue_depth.fetch_sub(1, Ordering::Release);
                stats.processed_total.fetch_add(1, Ordering::Relaxed);
            }
            QueueMessage::Stop => {
                info!(
                    processed_total = stats.processed(),
                    "stop request received, aggregator exiting"
                );
                return;
            }
        }
    }
    debug!(
        processed_total = stats.processed(),
        "ingest channel closed, aggregator exiting"
    );
}
