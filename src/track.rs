// Public facade (port of the Java ServerTrack). Validates and stamps inbound
// reports, owns the queue + aggregator pair, and answers the two
// sliding-window queries from the store. Queries bypass the queue, so a
// report is not guaranteed to be visible immediately after `report` returns;
// `is_queue_empty` lets tests and the CLI synchronize on ingestion.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use crate::aggregator::{self, PipelineStats, QueueMessage};
use crate::models::{QueuedReport, StatusReport, TimeSeries};
use crate::store::{Granularity, StatStore};

/// Bounded wait for the old aggregator to exit during `reset`.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// One store + queue + aggregator generation. Replaced wholesale on reset.
struct Pipeline {
    store: Arc<StatStore>,
    tx: mpsc::UnboundedSender<QueueMessage>,
    stats: Arc<PipelineStats>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Pipeline {
    fn start() -> Self {
        let store = Arc::new(StatStore::new());
        let stats = Arc::new(PipelineStats::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = aggregator::spawn(rx, store.clone(), stats.clone());
        Pipeline {
            store,
            tx,
            stats,
            handle: Some(handle),
        }
    }

    /// Requests stop and waits up to `timeout` for the task to exit. On
    /// expiry the caller proceeds anyway; the old task may still be draining
    /// against a store that is about to be discarded.
    async fn stop(&mut self, timeout: Duration) {
        let _ = self.tx.send(QueueMessage::Stop);
        let Some(handle) = self.handle.take() else {
            return;
        };
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "aggregator task failed during stop"),
            Err(_) => warn!(
                timeout_secs = timeout.as_secs(),
                "aggregator did not stop within timeout, continuing"
            ),
        }
    }
}

/// The load-tracking engine. Constructing it starts the background
/// aggregator, so it must be created inside a Tokio runtime.
pub struct ServerTrack {
    pipeline: RwLock<Pipeline>,
    shutdown_timeout: Duration,
}

impl ServerTrack {
    pub fn new() -> Self {
        Self::with_shutdown_timeout(DEFAULT_SHUTDOWN_TIMEOUT)
    }

    pub fn with_shutdown_timeout(shutdown_timeout: Duration) -> Self {
        ServerTrack {
            pipeline: RwLock::new(Pipeline::start()),
            shutdown_timeout,
        }
    }

    /// A report is valid when the server name is non-empty and both loads
    /// are strictly positive. Loads of exactly 0 are rejected, matching the
    /// original contract; whether idle (zero-load) reports should be
    /// accepted is pending product sign-off.
    fn validate(server_name: &str, cpu_load: f64, mem_load: f64) -> bool {
        !server_name.is_empty() && cpu_load > 0.0 && mem_load > 0.0
    }

    /// Validates, stamps with the current time, and enqueues. Returns false
    /// (with no side effect) when validation fails or the engine has been
    /// shut down. Never blocks on the aggregator.
    pub async fn report(&self, server_name: &str, cpu_load: f64, mem_load: f64) -> bool {
        self.report_at(server_name, cpu_load, mem_load, chrono::Utc::now().timestamp())
            .await
    }

    /// Like `report`, but with a caller-supplied timestamp. This is how
    /// deterministic tests control bucket placement, and how the CSV reader
    /// ingests historical records.
    pub async fn report_at(
        &self,
        server_name: &str,
        cpu_load: f64,
        mem_load: f64,
        timestamp_utc: i64,
    ) -> bool {
        if !Self::validate(server_name, cpu_load, mem_load) {
            return false;
        }
        let queued = QueuedReport {
            report: StatusReport {
                server_name: server_name.to_owned(),
                cpu_load,
                mem_load,
            },
            timestamp_utc,
        };
        let pipeline = self.pipeline.read().await;
        pipeline.stats.queue_depth.fetch_add(1, Ordering::Release);
        if pipeline.tx.send(QueueMessage::Report(queued)).is_err() {
            // Aggregator already stopped (shutdown). Undo the depth bump.
            pipeline.stats.queue_depth.fetch_sub(1, Ordering::Release);
            return false;
        }
        true
    }

    /// Per-minute averages for the trailing 60 minutes, most recent first.
    pub async fn last_60_minutes(&self, server_name: &str) -> TimeSeries {
        self.last_60_minutes_as_of(server_name, chrono::Utc::now().timestamp())
            .await
    }

    /// `last_60_minutes` with an explicit "now", for deterministic tests.
    pub async fn last_60_minutes_as_of(&self, server_name: &str, now_utc: i64) -> TimeSeries {
        let pipeline = self.pipeline.read().await;
        pipeline.store.window(
            Granularity::Minute,
            server_name,
            now_utc,
            Granularity::Minute.window_len(),
        )
    }

    /// Per-hour averages for the trailing 24 hours, most recent first.
    pub async fn last_24_hours(&self, server_name: &str) -> TimeSeries {
        self.last_24_hours_as_of(server_name, chrono::Utc::now().timestamp())
            .await
    }

    /// `last_24_hours` with an explicit "now", for deterministic tests.
    pub async fn last_24_hours_as_of(&self, server_name: &str, now_utc: i64) -> TimeSeries {
        let pipeline = self.pipeline.read().await;
        pipeline.store.window(
            Granularity::Hour,
            server_name,
            now_utc,
            Granularity::Hour.window_len(),
        )
    }

    /// Stops the current aggregator (bounded wait) and installs a fresh
    /// empty store, queue, and aggregator. Returns the engine to a known
    /// empty state; also usable operationally to reclaim bucket memory.
    pub async fn reset(&self) {
        let mut pipeline = self.pipeline.write().await;
        info!("resetting: stopping current aggregator");
        pipeline.stop(self.shutdown_timeout).await;
        *pipeline = Pipeline::start();
    }

    /// Requests shutdown and waits for the aggregator to exit. FIFO order
    /// means every report accepted before this call is applied first.
    /// Subsequent `report` calls return false.
    pub async fn shutdown(&self) {
        let mut pipeline = self.pipeline.write().await;
        let _ = pipeline.tx.send(QueueMessage::Stop);
        if let Some(handle) = pipeline.handle.take()
            && let Err(e) = handle.await
        {
            warn!(error = %e, "aggregator task failed during shutdown");
        }
    }

    /// True when every accepted report has been applied to the store.
    pub async fn is_queue_empty(&self) -> bool {
        self.pipeline.read().await.stats.queue_is_empty()
    }

    /// Reports applied since construction or the last reset.
    pub async fn processed_count(&self) -> u64 {
        self.pipeline.read().await.stats.processed()
    }
}

impl Default for ServerTrack {
    fn default() -> Self {
        Self::new()
    }
}
