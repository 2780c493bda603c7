use std::sync::Arc;

use viewpress_automation::WorkItemManager;
use viewpress_events::EventBus;

use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Work item submission, polling, callback and cancellation.
    pub workitems: Arc<WorkItemManager>,
    /// Status event fan-out; health reports its subscriber count.
    pub event_bus: Arc<EventBus>,
}
