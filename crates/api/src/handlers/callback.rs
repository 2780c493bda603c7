//! Completion callback posted by the remote compute service.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// POST /api/v1/callback/designautomation
///
/// Always answers 202 before looking at the body. Reconciliation runs on
/// the manager's tracked background set, so shutdown waits for it.
pub async fn designautomation_callback(
    State(state): State<AppState>,
    body: Bytes,
) -> StatusCode {
    tracing::debug!(bytes = body.len(), "Work item callback accepted");
    state.workitems.spawn_callback(body);

    StatusCode::ACCEPTED
}
