use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use servertrack::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let mut input_path = PathBuf::from(&app_config.ingest.input_path);
    let mut json_output = false;
    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json_output = true;
        } else {
            input_path = PathBuf::from(arg);
        }
    }

    tracing::info!(
        version = version::VERSION,
        input = %input_path.display(),
        "starting {}",
        version::NAME
    );

    let track = track::ServerTrack::with_shutdown_timeout(Duration::from_secs(
        app_config.aggregator.shutdown_timeout_secs,
    ));

    let start = std::time::Instant::now();
    let summary = reader::ingest_file(&input_path, &track).await?;

    // Queries read the store directly, so wait for the queue to drain before
    // printing; results would otherwise lag in-flight reports.
    let poll = Duration::from_millis(app_config.ingest.queue_poll_ms);
    while !track.is_queue_empty().await {
        tokio::time::sleep(poll).await;
    }

    let elapsed = start.elapsed();
    tracing::info!(
        accepted = summary.accepted,
        rejected = summary.rejected,
        servers = summary.servers.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "ingest complete"
    );

    for server in &summary.servers {
        let by_minute = track.last_60_minutes(server).await;
        let by_hour = track.last_24_hours(server).await;
        if json_output {
            println!("{}", serde_json::to_string(&by_minute)?);
            println!("{}", serde_json::to_string(&by_hour)?);
        } else {
            tracing::info!("last 60 minutes by minute:\n{}", by_minute);
            tracing::info!("last 24 hours by hour:\n{}", by_hour);
        }
    }

    track.shutdown().await;
    Ok(())
}
