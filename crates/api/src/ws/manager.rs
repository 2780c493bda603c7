//! Registry of notification sockets and their topic subscriptions.

use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use viewpress_core::types::Timestamp;

use crate::ws::protocol::KNOWN_TOPICS;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// One open notification socket.
pub struct WsConnection {
    sender: WsSender,
    connected_at: Timestamp,
    /// Last inbound frame (including Pong), used to find dead peers.
    last_seen: Timestamp,
    topics: HashSet<String>,
}

/// Tracks open sockets and routes topic messages to their subscribers.
///
/// Designed to be wrapped in `Arc` and shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection, subscribed to every known topic.
    ///
    /// Returns the receiver the socket's sender task drains.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let now = Utc::now();
        let conn = WsConnection {
            sender: tx,
            connected_at: now,
            last_seen: now,
            topics: KNOWN_TOPICS.iter().map(|t| t.to_string()).collect(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Record inbound activity on `conn_id`.
    pub async fn touch(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.get_mut(conn_id) {
            conn.last_seen = Utc::now();
        }
    }

    /// Add `topic` to the connection's subscriptions. Returns `false` for
    /// an unknown connection.
    pub async fn subscribe(&self, conn_id: &str, topic: &str) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.topics.insert(topic.to_string());
                true
            }
            None => false,
        }
    }

    /// Drop `topic` from the connection's subscriptions. Returns `false`
    /// for an unknown connection.
    pub async fn unsubscribe(&self, conn_id: &str, topic: &str) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.topics.remove(topic);
                true
            }
            None => false,
        }
    }

    /// Send a message on one connection.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        self.connections
            .read()
            .await
            .get(conn_id)
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }

    /// Push `message` to every connection subscribed to `topic`.
    ///
    /// Returns how many connections accepted it. Closed channels are
    /// skipped; their receive loop removes them.
    pub async fn publish(&self, topic: &str, message: Message) -> usize {
        let conns = self.connections.read().await;
        conns
            .values()
            .filter(|conn| conn.topics.contains(topic))
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Close and forget connections with no inbound frame for `max_idle`.
    ///
    /// Returns the evicted connection ids.
    pub async fn evict_stale(&self, max_idle: chrono::Duration) -> Vec<String> {
        let cutoff = Utc::now() - max_idle;
        let mut conns = self.connections.write().await;
        let stale: Vec<String> = conns
            .iter()
            .filter(|(_, conn)| conn.last_seen < cutoff)
            .map(|(id, _)| id.clone())
            .collect();

        for conn_id in &stale {
            if let Some(conn) = conns.remove(conn_id) {
                let _ = conn.sender.send(Message::Close(None));
                tracing::info!(
                    conn_id = %conn_id,
                    connected_secs = (Utc::now() - conn.connected_at).num_seconds(),
                    idle_secs = (Utc::now() - conn.last_seen).num_seconds(),
                    "Evicted stale WebSocket connection",
                );
            }
        }
        stale
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }

    #[cfg(test)]
    pub(crate) async fn backdate(&self, conn_id: &str, by: chrono::Duration) {
        if let Some(conn) = self.connections.write().await.get_mut(conn_id) {
            conn.last_seen -= by;
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
