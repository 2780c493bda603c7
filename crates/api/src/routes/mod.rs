pub mod callback;
pub mod health;
pub mod workitems;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                 WebSocket (status notifications)
///
/// /workitems                          submit (POST)
/// /workitems/{id}                     poll (GET), cancel (DELETE)
///
/// /callback/designautomation          remote completion callback (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/workitems", workitems::router())
        .nest("/callback", callback::router())
}
