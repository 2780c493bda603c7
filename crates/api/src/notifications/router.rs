//! Event-to-WebSocket routing.
//!
//! [`NotificationRouter`] consumes [`TopicEvent`]s from the event bus and
//! publishes each to the sockets subscribed to its topic as
//! `{"topic": ..., "data": {"WorkitemId", "Status", "ExtraInfo"}}`.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;
use viewpress_events::TopicEvent;

use crate::ws::WsManager;

/// Routes bus events to WebSocket clients.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](viewpress_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<TopicEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    async fn route_event(&self, event: &TopicEvent) {
        let msg = render(event);
        let delivered = self
            .ws_manager
            .publish(&event.topic, Message::Text(msg.to_string().into()))
            .await;

        tracing::debug!(
            workitem_id = %event.event.workitem_id,
            status = %event.event.status,
            topic = %event.topic,
            delivered,
            "Status notification pushed",
        );
    }
}

/// Wire form of a notification.
pub fn render(event: &TopicEvent) -> serde_json::Value {
    serde_json::json!({
        "topic": event.topic,
        "data": event.event.to_payload(),
    })
}
