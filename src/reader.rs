// CSV ingest (port of the Java ServerStatusMonitor file reader).
// One record per line: `timestamp,serverName,cpuLoad,memLoad`. A negative
// timestamp means that many seconds ago, relative to now. Blank lines are
// skipped; malformed lines are logged and skipped without stopping ingest.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::models::StatusReport;
use crate::track::ServerTrack;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected 4 comma-separated fields, got {0}")]
    FieldCount(usize),
    #[error("invalid timestamp: {0}")]
    Timestamp(#[source] std::num::ParseIntError),
    #[error("invalid load value: {0}")]
    Load(#[source] std::num::ParseFloatError),
}

/// Parses one CSV line into a timestamp and report. `now_utc` anchors
/// negative (relative) timestamps.
pub fn parse_line(line: &str, now_utc: i64) -> Result<(i64, StatusReport), ParseError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(ParseError::FieldCount(fields.len()));
    }
    let mut timestamp_utc: i64 = fields[0].parse().map_err(ParseError::Timestamp)?;
    if timestamp_utc < 0 {
        timestamp_utc += now_utc;
    }
    let cpu_load: f64 = fields[2].parse().map_err(ParseError::Load)?;
    let mem_load: f64 = fields[3].parse().map_err(ParseError::Load)?;
    Ok((
        timestamp_utc,
        StatusReport {
            server_name: fields[1].to_owned(),
            cpu_load,
            mem_load,
        },
    ))
}

/// Outcome of one file ingest: accepted/rejected line counts and the
/// distinct server names seen, in name order.
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub accepted: u64,
    pub rejected: u64,
    pub servers: BTreeSet<String>,
}

/// Streams a CSV file into the engine via `report_at`. Rejections (parse
/// failures or validation failures) are counted and logged, never fatal;
/// only an unreadable file is an error.
pub async fn ingest_file(path: &Path, track: &ServerTrack) -> anyhow::Result<IngestSummary> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("cannot open input file {}: {}", path.display(), e))?;
    let mut summary = IngestSummary::default();

    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let now_utc = chrono::Utc::now().timestamp();
        match parse_line(&line, now_utc) {
            Ok((timestamp_utc, report)) => {
                let accepted = track
                    .report_at(
                        &report.server_name,
                        report.cpu_load,
                        report.mem_load,
                        timestamp_utc,
                    )
                    .await;
                if accepted {
                    summary.accepted += 1;
                    summary.servers.insert(report.server_name);
                } else {
                    summary.rejected += 1;
                    warn!(line = %line, "report rejected by validation, skipping");
                }
            }
            Err(e) => {
                summary.rejected += 1;
                warn!(error = %e, line = %line, "malformed line, skipping");
            }
        }
    }

    Ok(summary)
}
