use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use viewpress_automation::WorkItemError;
use viewpress_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`WorkItemError`].
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `viewpress_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A work item lifecycle error from the manager.
    #[error(transparent)]
    WorkItem(#[from] WorkItemError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) | CoreError::ConfigParse(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            // --- Work item lifecycle ---
            AppError::WorkItem(err) => classify_workitem_error(err),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a [`WorkItemError`] into an HTTP status, error code, and message.
///
/// Remote-side failures map to 502 since the fault lies with the upstream
/// compute service, not with this server or the client.
fn classify_workitem_error(err: &WorkItemError) -> (StatusCode, &'static str, String) {
    match err {
        WorkItemError::InvalidInput(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        WorkItemError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("WorkItem with id {id} not found"),
        ),
        WorkItemError::SubmissionFailed(msg) => {
            tracing::warn!(error = %msg, "Work item submission rejected upstream");
            (StatusCode::BAD_GATEWAY, "SUBMISSION_FAILED", msg.clone())
        }
        WorkItemError::RemoteTransient(msg) => {
            tracing::warn!(error = %msg, "Remote service unavailable");
            (StatusCode::BAD_GATEWAY, "REMOTE_UNAVAILABLE", msg.clone())
        }
        WorkItemError::Duplicate(id) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("WorkItem with id {id} is already tracked"),
        ),
    }
}
