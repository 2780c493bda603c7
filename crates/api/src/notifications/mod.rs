//! Notification routing infrastructure.
//!
//! The [`NotificationRouter`] subscribes to the event bus and pushes work
//! item status changes to every connected WebSocket client.

pub mod router;

pub use router::NotificationRouter;
