//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for work item [`StatusEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.
//! Delivery is best-effort: there is no replay for late subscribers and
//! no acknowledgement from receivers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use viewpress_core::job_events::{FIELD_EXTRA_INFO, FIELD_STATUS, FIELD_WORKITEM_ID};
use viewpress_core::types::WorkItemId;
use viewpress_core::workitem::{WorkItem, WorkItemStatus};

// ---------------------------------------------------------------------------
// StatusEvent
// ---------------------------------------------------------------------------

/// A status change of one work item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEvent {
    pub workitem_id: WorkItemId,
    pub status: WorkItemStatus,
    /// Retrieval location on completion.
    pub extra_info: Option<String>,
    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(workitem_id: impl Into<WorkItemId>, status: WorkItemStatus) -> Self {
        Self {
            workitem_id: workitem_id.into(),
            status,
            extra_info: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the retrieval location.
    pub fn with_extra_info(mut self, extra_info: Option<String>) -> Self {
        self.extra_info = extra_info;
        self
    }

    /// Build the event describing a finalized work item.
    pub fn from_workitem(item: &WorkItem) -> Self {
        Self::new(item.id.clone(), item.status).with_extra_info(item.extra_info.clone())
    }

    /// Wire payload pushed to browser clients.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            FIELD_WORKITEM_ID: self.workitem_id,
            FIELD_STATUS: self.status.as_str(),
            FIELD_EXTRA_INFO: self.extra_info,
        })
    }
}

/// A [`StatusEvent`] together with the topic it was published on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicEvent {
    pub topic: String,
    pub event: StatusEvent,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`TopicEvent`].
///
/// # Usage
///
/// ```rust
/// use viewpress_core::workitem::WorkItemStatus;
/// use viewpress_events::bus::{EventBus, StatusEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish("Workitem-Notification", StatusEvent::new("wi-1", WorkItemStatus::Failed));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<TopicEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event on `topic` to all current subscribers.
    ///
    /// Returns how many subscribers the event was handed to. With no
    /// subscribers the event is silently dropped.
    pub fn publish(&self, topic: &str, event: StatusEvent) -> usize {
        tracing::debug!(
            topic,
            workitem_id = %event.workitem_id,
            status = %event.status,
            "Publishing status event",
        );
        // A SendError only means there are zero receivers.
        self.sender
            .send(TopicEvent {
                topic: topic.to_string(),
                event,
            })
            .unwrap_or(0)
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<TopicEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TOPIC: &str = "Workitem-Notification";

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = StatusEvent::new("wi-42", WorkItemStatus::Completed)
            .with_extra_info(Some("https://bucket/result.pdf".into()));

        assert_eq!(bus.publish(TOPIC, event), 1);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.topic, TOPIC);
        assert_eq!(received.event.workitem_id, "wi-42");
        assert_eq!(received.event.status, WorkItemStatus::Completed);
        assert_eq!(
            received.event.extra_info.as_deref(),
            Some("https://bucket/result.pdf")
        );
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(TOPIC, StatusEvent::new("wi-1", WorkItemStatus::Failed));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event.workitem_id, "wi-1");
        assert_eq!(e2.event.workitem_id, "wi-1");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        assert_eq!(
            bus.publish(TOPIC, StatusEvent::new("orphan", WorkItemStatus::Cancelled)),
            0
        );
    }

    #[tokio::test]
    async fn late_subscribers_do_not_see_earlier_events() {
        let bus = EventBus::default();
        let _early = bus.subscribe();
        bus.publish(TOPIC, StatusEvent::new("wi-1", WorkItemStatus::Failed));

        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn payload_uses_notification_field_names() {
        let event = StatusEvent::new("wi-7", WorkItemStatus::Completed)
            .with_extra_info(Some("out-url".into()));
        let payload = event.to_payload();

        assert_eq!(payload["WorkitemId"], "wi-7");
        assert_eq!(payload["Status"], "Completed");
        assert_eq!(payload["ExtraInfo"], "out-url");
    }

    #[test]
    fn event_from_finalized_workitem() {
        let item = WorkItem::new("wi-9", "in", "out", WorkItemStatus::Running)
            .finalize(WorkItemStatus::Completed);
        let event = StatusEvent::from_workitem(&item);

        assert_eq!(event.status, WorkItemStatus::Completed);
        assert_eq!(event.extra_info.as_deref(), Some("out"));
    }
}
