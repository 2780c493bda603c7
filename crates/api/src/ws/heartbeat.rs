use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

/// Seconds between heartbeat rounds.
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// A connection that has not answered three rounds of pings is dead.
const STALE_AFTER_SECS: i64 = 3 * HEARTBEAT_INTERVAL_SECS as i64;

/// Spawn the heartbeat loop: each round evicts connections that have gone
/// silent, then pings the rest. Their Pong frames count as activity.
///
/// Runs until the returned handle is aborted at shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let evicted = ws_manager
                .evict_stale(chrono::Duration::seconds(STALE_AFTER_SECS))
                .await;
            let count = ws_manager.connection_count().await;
            tracing::debug!(count, evicted = evicted.len(), "WebSocket heartbeat");
            ws_manager.ping_all().await;
        }
    })
}
