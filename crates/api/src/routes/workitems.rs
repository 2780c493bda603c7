//! Route definitions for the `/workitems` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workitems;
use crate::state::AppState;

/// Routes mounted at `/workitems`.
///
/// ```text
/// POST   /                -> submit_workitem
/// GET    /{id}            -> get_workitem
/// DELETE /{id}            -> cancel_workitem
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(workitems::submit_workitem))
        .route(
            "/{id}",
            get(workitems::get_workitem).delete(workitems::cancel_workitem),
        )
}
