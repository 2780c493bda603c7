//! Handlers for the `/workitems` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;
use viewpress_core::types::WorkItemId;
use viewpress_core::view_selection::ViewSelectionConfig;
use viewpress_core::workitem::WorkItemStatus;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /workitems`.
#[derive(Debug, Deserialize, Validate)]
pub struct ExportRequest {
    /// Signed location of the input document.
    #[validate(length(min = 1, message = "input_ref must not be empty"))]
    pub input_ref: String,
    /// Signed location the merged artifact is uploaded to.
    #[validate(length(min = 1, message = "output_ref must not be empty"))]
    pub output_ref: String,
    /// View type flags. Parsed leniently; anything unusable means
    /// "export every type".
    #[serde(default)]
    pub views: Option<serde_json::Value>,
}

/// Work item state as returned to clients.
#[derive(Debug, Serialize)]
pub struct WorkItemResponse {
    pub workitem_id: WorkItemId,
    pub status: WorkItemStatus,
    pub extra_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
}

/// POST /api/v1/workitems
///
/// Submit an export job to the remote service. Returns 201 once the
/// service accepted it and the job is tracked.
pub async fn submit_workitem(
    State(state): State<AppState>,
    Json(input): Json<ExportRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let selection = ViewSelectionConfig::from_optional_value(input.views.as_ref());
    let submitted = state
        .workitems
        .submit(&input.input_ref, &input.output_ref, &selection)
        .await?;

    let body = WorkItemResponse {
        workitem_id: submitted.workitem_id,
        status: submitted.status,
        extra_info: None,
        report_url: None,
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: body })))
}

/// GET /api/v1/workitems/{id}
///
/// Ask the remote service for the job's status. A terminal answer also
/// finalizes the job and notifies subscribers.
pub async fn get_workitem(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let report = state.workitems.poll(&id).await?;

    Ok(Json(DataResponse {
        data: WorkItemResponse {
            workitem_id: report.workitem_id,
            status: report.status,
            extra_info: report.extra_info,
            report_url: report.report_url,
        },
    }))
}

/// DELETE /api/v1/workitems/{id}
///
/// Cancel a tracked job. Returns 204; subscribers are told `Cancelled`
/// before the remote service has confirmed anything.
pub async fn cancel_workitem(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.workitems.cancel(&id).await?;

    tracing::info!(workitem_id = %id, "Work item cancelled by client");

    Ok(StatusCode::NO_CONTENT)
}
