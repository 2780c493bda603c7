use axum::routing::post;
use axum::Router;

use crate::handlers::callback;
use crate::state::AppState;

/// Routes mounted at `/callback`. Called by the remote service, not by
/// browsers.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/designautomation",
        post(callback::designautomation_callback),
    )
}
