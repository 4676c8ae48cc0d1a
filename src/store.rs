// Bucketed load statistics (port of the Java StatStorage).
// Minute and hour data live in two separate concurrent maps keyed by server
// name; per server, a concurrent map from bucket-start timestamp to running
// sums. Inserts come from a single aggregator task; queries may run from any
// task at any time, so updates publish a fresh record instead of mutating the
// stored one in place.

use crate::models::{LoadRecord, QueuedReport, TimeSeries, TimeSeriesPoint};
use dashmap::DashMap;

/// Bucket length family: reports are truncated to minute buckets for the
/// 60-minute query and hour buckets for the 24-hour query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Minute,
    Hour,
}

impl Granularity {
    /// Bucket length in seconds.
    pub const fn bucket_secs(self) -> i64 {
        match self {
            Granularity::Minute => 60,
            Granularity::Hour => 3600,
        }
    }

    /// Number of buckets in this granularity's query window.
    pub const fn window_len(self) -> usize {
        match self {
            Granularity::Minute => 60,
            Granularity::Hour => 24,
        }
    }

    /// Start timestamp of the bucket containing `timestamp_utc`.
    pub const fn bucket_key(self, timestamp_utc: i64) -> i64 {
        (timestamp_utc / self.bucket_secs()) * self.bucket_secs()
    }
}

type BucketMap = DashMap<String, DashMap<i64, LoadRecord>>;

/// In-memory stat storage. Buckets are created lazily and never deleted, so
/// memory grows with distinct servers x distinct time buckets.
#[derive(Debug, Default)]
pub struct StatStore {
    minute: BucketMap,
    hour: BucketMap,
}

impl StatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one stamped report into both the minute and hour maps.
    pub fn accumulate(&self, queued: &QueuedReport) {
        self.add_to(Granularity::Minute, queued);
        self.add_to(Granularity::Hour, queued);
    }

    fn add_to(&self, granularity: Granularity, queued: &QueuedReport) {
        let bucket = granularity.bucket_key(queued.timestamp_utc);
        let server_buckets = self
            .map_for(granularity)
            .entry(queued.report.server_name.clone())
            .or_default();
        let mut record = server_buckets.entry(bucket).or_default();
        // Copy-then-replace: a concurrent reader of this bucket observes the
        // old record or the new one, never a partially updated sum.
        let updated = record.updated(queued.report.cpu_load, queued.report.mem_load);
        *record = updated;
    }

    /// Assembles the trailing window ending at the bucket containing
    /// `now_utc`: `window_len` points, most recent first, one per bucket,
    /// empty buckets averaged as zero. Unknown servers yield an all-zero
    /// window of the same shape.
    pub fn window(
        &self,
        granularity: Granularity,
        server_name: &str,
        now_utc: i64,
        window_len: usize,
    ) -> TimeSeries {
        let latest = granularity.bucket_key(now_utc);
        let step = granularity.bucket_secs();
        let server_buckets = self.map_for(granularity).get(server_name);

        let points = (0..window_len)
            .map(|i| {
                let timestamp_utc = latest - i as i64 * step;
                let record = server_buckets
                    .as_ref()
                    .and_then(|buckets| buckets.get(&timestamp_utc).map(|r| *r))
                    .unwrap_or_default();
                let average = record.average();
                TimeSeriesPoint {
                    timestamp_utc,
                    cpu_load: average.cpu,
                    mem_load: average.mem,
                }
            })
            .collect();

        TimeSeries {
            server_name: server_name.to_owned(),
            points,
        }
    }

    fn map_for(&self, granularity: Granularity) -> &BucketMap {
        match granularity {
            Granularity::Minute => &self.minute,
            Granularity::Hour => &self.hour,
        }
    }
}
