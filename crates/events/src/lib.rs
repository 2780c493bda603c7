//! viewpress notification fan-out.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`StatusEvent`]: a work item status change, published on a named
//!   topic and wrapped in a [`TopicEvent`] envelope.

pub mod bus;

pub use bus::{EventBus, StatusEvent, TopicEvent};
