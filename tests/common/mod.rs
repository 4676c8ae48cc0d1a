// Shared test helpers

use std::time::Duration;

use servertrack::track::ServerTrack;

/// Waits for every accepted report to reach the store. Panics rather than
/// hanging if the queue does not drain within two seconds.
pub async fn wait_for_ingest(track: &ServerTrack) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !track.is_queue_empty().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "ingest queue did not drain within 2s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
