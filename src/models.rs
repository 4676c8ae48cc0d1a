// Domain models (ported from the Java ServerTrack entities/client types)

use std::fmt;

use serde::{Deserialize, Serialize};

/// One load report for a named server, as submitted by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub server_name: String,
    pub cpu_load: f64,
    pub mem_load: f64,
}

/// A report stamped with its ingest timestamp (UTC seconds since epoch).
/// The stamp is applied at the public entry point, before the report is queued.
#[derive(Debug, Clone)]
pub struct QueuedReport {
    pub report: StatusReport,
    pub timestamp_utc: i64,
}

/// Per-bucket accumulator: sample count plus running load sums.
/// Keeping sums instead of averages means ingest needs no division and the
/// average can be derived at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadRecord {
    pub count: i64,
    pub cpu_sum: f64,
    pub mem_sum: f64,
}

impl LoadRecord {
    /// Returns a copy of this record with one report folded in. The original
    /// is left untouched; the caller publishes the returned value so that a
    /// concurrent reader sees either the old record or the new one, never a
    /// half-applied update.
    pub fn updated(&self, cpu_load: f64, mem_load: f64) -> LoadRecord {
        LoadRecord {
            count: self.count + 1,
            cpu_sum: self.cpu_sum + cpu_load,
            mem_sum: self.mem_sum + mem_load,
        }
    }

    /// Average loads over the bucket. An empty record averages to zero loads
    /// rather than dividing by zero; this is also what empty buckets report.
    pub fn average(&self) -> LoadAverage {
        if self.count == 0 {
            return LoadAverage {
                count: 0,
                cpu: 0.0,
                mem: 0.0,
            };
        }
        LoadAverage {
            count: self.count,
            cpu: self.cpu_sum / self.count as f64,
            mem: self.mem_sum / self.count as f64,
        }
    }
}

/// Derived per-bucket averages. Never stored; computed on read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    pub count: i64,
    pub cpu: f64,
    pub mem: f64,
}

/// One externally visible point: bucket start time plus averaged loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub timestamp_utc: i64,
    pub cpu_load: f64,
    pub mem_load: f64,
}

/// A fixed-length window of averaged points for one server, most recent
/// first, with empty buckets zero-filled rather than omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    pub server_name: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "server={}", self.server_name)?;
        for point in &self.points {
            writeln!(
                f,
                "  ts={} cpu={:.4} mem={:.4}",
                point.timestamp_utc, point.cpu_load, point.mem_load
            )?;
        }
        Ok(())
    }
}
